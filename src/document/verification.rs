//! Verification methods and the relationships that bind them to a DID subject.

use multibase::Base;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keys::Jwk;
use crate::Result;

/// A DID document can express verification methods, such as cryptographic public keys, which can
/// be used to authenticate or authorize interactions with the DID subject or associated parties.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationMethod {
    /// Identifier for the verification method. A DID URL, or a fragment relative to the
    /// containing document.
    pub id: String,

    /// The type of verification method, as registered in the
    /// [DID Specification Registries](https://www.w3.org/TR/did-spec-registries/).
    #[serde(rename = "type")]
    pub type_: String,

    /// Identifier for the controller of the verification method. A DID.
    pub controller: String,

    /// The public key material as a JWK, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,

    /// The raw public key material, base58 (bitcoin alphabet) encoded, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,

    /// The public key material as a multibase string, if applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,

    /// Any other properties of the method (`publicKeyPem`, `publicKeyHex`, ...).
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl VerificationMethod {
    /// Create a verification method carrying a JWK.
    #[must_use]
    pub fn from_jwk(
        id: impl Into<String>, type_: impl Into<String>, controller: impl Into<String>, jwk: Jwk,
    ) -> Self {
        Self {
            id: id.into(),
            type_: type_.into(),
            controller: controller.into(),
            public_key_jwk: Some(jwk),
            ..Self::default()
        }
    }

    /// Create a verification method carrying raw key bytes. The bytes are stored base58 encoded.
    #[must_use]
    pub fn from_bytes(
        id: impl Into<String>, type_: impl Into<String>, controller: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Self {
            id: id.into(),
            type_: type_.into(),
            controller: controller.into(),
            public_key_base58: Some(Base::Base58Btc.encode(bytes)),
            ..Self::default()
        }
    }

    /// The raw key bytes from `publicKeyBase58` or, failing that, `publicKeyMultibase`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value is not valid base58 or multibase.
    pub fn key_bytes(&self) -> Result<Option<Vec<u8>>> {
        if let Some(b58) = &self.public_key_base58 {
            return Ok(Some(Base::Base58Btc.decode(b58)?));
        }
        if let Some(multi) = &self.public_key_multibase {
            let (_, bytes) = multibase::decode(multi)?;
            return Ok(Some(bytes));
        }
        Ok(None)
    }

    /// The fragment part of the method id (`did:x:y#key-1` -> `key-1`).
    #[must_use]
    pub fn fragment(&self) -> &str {
        fragment(&self.id)
    }
}

/// Return the fragment of a DID URL or the whole string when there is none.
pub(crate) fn fragment(id: &str) -> &str {
    id.rsplit_once('#').map_or(id, |(_, frag)| frag)
}

/// The kind of relationship a verification method has with the DID subject.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Relationship {
    /// A method listed without a specific purpose.
    #[default]
    General,
    /// Authenticate the DID subject.
    Authentication,
    /// Express claims, such as issuing verifiable credentials.
    AssertionMethod,
    /// Generate encryption material for confidential messages.
    KeyAgreement,
    /// Delegate a cryptographic capability to another party.
    CapabilityDelegation,
    /// Invoke a cryptographic capability.
    CapabilityInvocation,
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::Authentication => write!(f, "authentication"),
            Self::AssertionMethod => write!(f, "assertionMethod"),
            Self::KeyAgreement => write!(f, "keyAgreement"),
            Self::CapabilityDelegation => write!(f, "capabilityDelegation"),
            Self::CapabilityInvocation => write!(f, "capabilityInvocation"),
        }
    }
}

/// Sidetree key purpose.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyPurpose {
    /// `authentication`
    Authentication,
    /// `assertionMethod`
    AssertionMethod,
    /// `keyAgreement`
    KeyAgreement,
    /// `capabilityDelegation`
    CapabilityDelegation,
    /// `capabilityInvocation`
    CapabilityInvocation,
}

const PURPOSES: [(Relationship, KeyPurpose); 5] = [
    (Relationship::Authentication, KeyPurpose::Authentication),
    (Relationship::AssertionMethod, KeyPurpose::AssertionMethod),
    (Relationship::KeyAgreement, KeyPurpose::KeyAgreement),
    (Relationship::CapabilityDelegation, KeyPurpose::CapabilityDelegation),
    (Relationship::CapabilityInvocation, KeyPurpose::CapabilityInvocation),
];

impl Relationship {
    /// The Sidetree key purpose for the relationship, or `None` when the relationship cannot be
    /// expressed as a key purpose.
    #[must_use]
    pub fn purpose(self) -> Option<KeyPurpose> {
        PURPOSES.iter().find(|(rel, _)| *rel == self).map(|(_, purpose)| *purpose)
    }
}

/// Binds a verification method to the DID subject for one relationship, either by reference to a
/// method in the document's `verificationMethod` set or by embedding the method.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Verification {
    /// The bound verification method.
    pub method: VerificationMethod,

    /// The relationship the method is bound for.
    pub relationship: Relationship,

    /// Serialize the method inline rather than as a reference.
    pub embedded: bool,
}

impl Verification {
    /// Bind `method` by reference.
    #[must_use]
    pub const fn referenced(method: VerificationMethod, relationship: Relationship) -> Self {
        Self {
            method,
            relationship,
            embedded: false,
        }
    }

    /// Bind `method` by embedding it.
    #[must_use]
    pub const fn embedded(method: VerificationMethod, relationship: Relationship) -> Self {
        Self {
            method,
            relationship,
            embedded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_table() {
        assert_eq!(Relationship::Authentication.purpose(), Some(KeyPurpose::Authentication));
        assert_eq!(Relationship::KeyAgreement.purpose(), Some(KeyPurpose::KeyAgreement));
        assert_eq!(
            Relationship::CapabilityInvocation.purpose(),
            Some(KeyPurpose::CapabilityInvocation)
        );
        assert_eq!(Relationship::General.purpose(), None);
    }

    #[test]
    fn base58_round_trip() {
        let vm =
            VerificationMethod::from_bytes("id2", "Ed25519VerificationKey2018", "", &[5u8; 32]);
        assert_eq!(vm.key_bytes().expect("should decode"), Some(vec![5u8; 32]));
    }

    #[test]
    fn base58_from_json() {
        let vm: VerificationMethod = serde_json::from_value(serde_json::json!({
            "id": "did:example:123456789abcdefghi#keys-1",
            "type": "Secp256k1VerificationKey2018",
            "controller": "did:example:123456789abcdefghi",
            "publicKeyBase58": "H3C2AVvLMv6gmMNam3uVAjZpfkcJCwDwnZn6z3wXmqPV"
        }))
        .expect("should deserialize");

        assert_eq!(vm.fragment(), "keys-1");
        assert_eq!(vm.key_bytes().expect("should decode").map(|b| b.len()), Some(32));
    }

    #[test]
    fn keeps_unknown_properties() {
        let vm: VerificationMethod = serde_json::from_value(serde_json::json!({
            "id": "#key2",
            "type": "RsaVerificationKey2018",
            "controller": "did:example:123",
            "publicKeyPem": "-----BEGIN PUBLIC KEY-----"
        }))
        .expect("should deserialize");

        assert!(vm.key_bytes().expect("should not fail").is_none());
        assert!(vm.additional.contains_key("publicKeyPem"));
    }
}
