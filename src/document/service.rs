//! Services advertised by a DID document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::OneMany;

/// Services express ways of communicating with the DID subject or associated entities. Services
/// are passed to the network as they are, so any additional properties are preserved.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    /// Identifier of the service. A DID URL or a fragment.
    pub id: String,

    /// Type of service, such as `LinkedDomains` or `DIDCommMessaging`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<OneMany<String>>,

    /// One or more URIs, maps or sets of maps used to reach the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_endpoint: Option<Value>,

    /// Additional, service-specific properties.
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl Service {
    /// A service with the given id, type and endpoint.
    #[must_use]
    pub fn new(id: impl Into<String>, type_: &str, endpoint: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            type_: Some(type_.into()),
            service_endpoint: Some(endpoint.into()),
            additional: Map::new(),
        }
    }
}
