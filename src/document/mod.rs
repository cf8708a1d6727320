//! DID Document and its component data structures.
//!
//! On the wire a verification relationship entry is either the id of a method listed in
//! `verificationMethod` or an embedded method object. In memory every entry is resolved to a
//! [`Verification`] carrying the method itself, so consumers never chase references.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod resolution;
pub mod service;
pub mod verification;

pub use resolution::{DocumentMetadata, MethodMetadata, Resolution};
pub use service::Service;
pub use verification::{KeyPurpose, Relationship, Verification, VerificationMethod};

use crate::core::Kind;
use crate::document::verification::fragment;
use crate::error::Err;
use crate::{tracerr, Error, Result};

/// A DID is associated with a DID document that can be serialized into a representation of the
/// DID. See <https://www.w3.org/TR/did-core/>.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "RawDocument", into = "RawDocument")]
pub struct Document {
    /// The JSON-LD context: a string, or a list of strings and maps.
    pub context: Option<Value>,

    /// The DID the document describes. Empty for a document that has not been created yet.
    pub id: String,

    /// Verification methods available to the relationships below.
    pub verification_method: Vec<VerificationMethod>,

    /// Methods used to authenticate the DID subject.
    pub authentication: Vec<Verification>,

    /// Methods used to express claims, such as issuing credentials.
    pub assertion_method: Vec<Verification>,

    /// Methods used to generate encryption material.
    pub key_agreement: Vec<Verification>,

    /// Methods used to invoke a cryptographic capability.
    pub capability_invocation: Vec<Verification>,

    /// Methods used to delegate a cryptographic capability.
    pub capability_delegation: Vec<Verification>,

    /// Services advertised for the DID subject.
    pub service: Vec<Service>,

    /// Properties not modelled above (`controller`, `alsoKnownAs`, ...).
    pub additional: Map<String, Value>,
}

impl Document {
    /// An empty document for `id`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Every verification relationship entry of the document, in relationship order.
    pub fn verifications(&self) -> impl Iterator<Item = &Verification> {
        self.authentication
            .iter()
            .chain(&self.assertion_method)
            .chain(&self.key_agreement)
            .chain(&self.capability_invocation)
            .chain(&self.capability_delegation)
    }

    /// Remote contexts (URLs) referenced by the document's `@context`.
    #[must_use]
    pub fn context_urls(&self) -> Vec<&str> {
        match &self.context {
            Some(Value::String(url)) => vec![url.as_str()],
            Some(Value::Array(ctx)) => ctx.iter().filter_map(Value::as_str).collect(),
            _ => vec![],
        }
    }
}

#[derive(Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
struct RawDocument {
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    context: Option<Value>,
    id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    verification_method: Vec<VerificationMethod>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    authentication: Vec<Kind<VerificationMethod>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    assertion_method: Vec<Kind<VerificationMethod>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    key_agreement: Vec<Kind<VerificationMethod>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    capability_invocation: Vec<Kind<VerificationMethod>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    capability_delegation: Vec<Kind<VerificationMethod>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    service: Vec<Service>,
    #[serde(flatten)]
    additional: Map<String, Value>,
}

impl TryFrom<RawDocument> for Document {
    type Error = Error;

    fn try_from(raw: RawDocument) -> Result<Self> {
        let methods = &raw.verification_method;
        let bind = |entries: Vec<Kind<VerificationMethod>>, rel: Relationship| {
            entries
                .into_iter()
                .map(|entry| -> Result<Verification> {
                    match entry {
                        Kind::Object(vm) => Ok(Verification::embedded(vm, rel)),
                        Kind::String(id) => {
                            Ok(Verification::referenced(lookup(methods, &id)?, rel))
                        }
                    }
                })
                .collect::<Result<Vec<_>>>()
        };

        Ok(Self {
            authentication: bind(raw.authentication, Relationship::Authentication)?,
            assertion_method: bind(raw.assertion_method, Relationship::AssertionMethod)?,
            key_agreement: bind(raw.key_agreement, Relationship::KeyAgreement)?,
            capability_invocation: bind(
                raw.capability_invocation,
                Relationship::CapabilityInvocation,
            )?,
            capability_delegation: bind(
                raw.capability_delegation,
                Relationship::CapabilityDelegation,
            )?,
            context: raw.context,
            id: raw.id,
            verification_method: raw.verification_method,
            service: raw.service,
            additional: raw.additional,
        })
    }
}

impl From<Document> for RawDocument {
    fn from(doc: Document) -> Self {
        let unbind = |entries: Vec<Verification>| -> Vec<Kind<VerificationMethod>> {
            entries
                .into_iter()
                .map(|v| {
                    if v.embedded {
                        Kind::Object(v.method)
                    } else {
                        Kind::String(v.method.id)
                    }
                })
                .collect()
        };

        Self {
            context: doc.context,
            id: doc.id,
            verification_method: doc.verification_method,
            authentication: unbind(doc.authentication),
            assertion_method: unbind(doc.assertion_method),
            key_agreement: unbind(doc.key_agreement),
            capability_invocation: unbind(doc.capability_invocation),
            capability_delegation: unbind(doc.capability_delegation),
            service: doc.service,
            additional: doc.additional,
        }
    }
}

// Find the method a relationship entry refers to. Relative ids match on their fragment.
fn lookup(methods: &[VerificationMethod], id: &str) -> Result<VerificationMethod> {
    let relative = |s: &str| !s.contains(':');
    let found = methods.iter().find(|vm| {
        vm.id == id
            || ((relative(id) || relative(&vm.id)) && fragment(&vm.id) == fragment(id))
    });
    match found {
        Some(vm) => Ok(vm.clone()),
        None => tracerr!(Err::InvalidInput, "verification method {id} not found in document"),
    }
}
