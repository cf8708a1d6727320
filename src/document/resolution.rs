//! DID resolution envelope: the document plus the metadata a Sidetree resolver reports about it.
//!
//! See [DID resolution](https://www.w3.org/TR/did-core/#did-resolution).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;
use crate::error::Err;
use crate::{tracerr, Result};

/// The result of resolving a DID.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resolution {
    /// JSON-LD context of the envelope.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// The resolved DID document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document: Option<Document>,

    /// Metadata about the resolved document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_document_metadata: Option<DocumentMetadata>,
}

impl Resolution {
    /// Parse a resolution envelope from JSON bytes.
    ///
    /// # Errors
    ///
    /// * `Err::DeserializationError` if the bytes are not a resolution envelope.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice(bytes) {
            Ok(res) => Ok(res),
            Err(e) => tracerr!(Err::DeserializationError, "malformed did resolution: {e}"),
        }
    }

    /// The resolved document.
    ///
    /// # Errors
    ///
    /// * `Err::NotFound` if the envelope has no document.
    pub fn document(&self) -> Result<&Document> {
        match &self.did_document {
            Some(doc) => Ok(doc),
            None => tracerr!(Err::NotFound, "resolution has no didDocument"),
        }
    }

    /// Sidetree method metadata, if the resolver reported any.
    #[must_use]
    pub fn method(&self) -> Option<&MethodMetadata> {
        self.did_document_metadata.as_ref()?.method.as_ref()
    }
}

/// Metadata about a resolved DID document.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMetadata {
    /// The canonical DID for the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_id: Option<String>,

    /// Other DIDs that are equivalent to the resolved DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equivalent_id: Option<Vec<String>>,

    /// Set when the DID has been deactivated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,

    /// Sidetree method metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodMetadata>,

    /// Any other metadata properties.
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

/// Sidetree method metadata.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MethodMetadata {
    /// Whether the DID has been anchored.
    pub published: bool,

    /// Commitment for the next recovery (or deactivation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_commitment: Option<String>,

    /// Commitment for the next update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_commitment: Option<String>,

    /// Anchor origin recorded for the DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_origin: Option<String>,

    /// Any other method metadata properties.
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}
