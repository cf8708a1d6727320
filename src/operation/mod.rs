//! # Operation Requests
//!
//! Builders that validate a DID document and call options and produce fully specified create,
//! update, recover and deactivate requests for the protocol client. Commitments to the next
//! update and recovery keys are derived here; the client only renders and submits.

use multibase::Base;
use serde::{Deserialize, Serialize};

use crate::document::{Document, KeyPurpose, VerificationMethod};
use crate::error::Err;
use crate::keys::Jwk;
use crate::{tracerr, Result};

mod create;
mod deactivate;
mod recover;
mod update;

pub use create::CreateRequest;
pub use deactivate::DeactivateRequest;
pub use recover::{NextKeys, RecoverRequest};
pub use update::UpdateRequest;

/// A public key as carried in Sidetree document patches.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyEntry {
    /// Key id, relative to the DID (the fragment of the verification method id).
    pub id: String,

    /// Verification method type.
    #[serde(rename = "type")]
    pub type_: String,

    /// Purposes the key is bound to.
    pub purposes: Vec<KeyPurpose>,

    /// Key material as a JWK.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,

    /// Raw key material, base58 encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,
}

/// Map the verification relationships of `doc` to Sidetree public keys.
///
/// A method bound under several relationships yields one key with all of its purposes. Every
/// method listed in `verificationMethod` must be bound by at least one relationship.
///
/// # Errors
///
/// * `Err::InvalidInput` if a relationship has no key purpose, a bound method has no key
///   material, or a listed method is not bound.
pub fn public_keys(doc: &Document) -> Result<Vec<PublicKeyEntry>> {
    let mut keys: Vec<PublicKeyEntry> = vec![];

    for verification in doc.verifications() {
        let Some(purpose) = verification.relationship.purpose() else {
            tracerr!(
                Err::InvalidInput,
                "vm relationship {} not supported",
                verification.relationship
            );
        };

        let id = verification.method.fragment();
        if let Some(key) = keys.iter_mut().find(|k| k.id == id) {
            if !key.purposes.contains(&purpose) {
                key.purposes.push(purpose);
            }
            continue;
        }
        keys.push(entry(&verification.method, purpose)?);
    }

    for vm in &doc.verification_method {
        if !keys.iter().any(|k| k.id == vm.fragment()) {
            tracerr!(Err::InvalidInput, "verificationMethod not supported");
        }
    }

    Ok(keys)
}

fn entry(vm: &VerificationMethod, purpose: KeyPurpose) -> Result<PublicKeyEntry> {
    let mut key = PublicKeyEntry {
        id: vm.fragment().to_string(),
        type_: vm.type_.clone(),
        purposes: vec![purpose],
        ..PublicKeyEntry::default()
    };

    if let Some(jwk) = &vm.public_key_jwk {
        key.public_key_jwk = Some(jwk.clone());
        if key.type_.is_empty() {
            key.type_ = "JsonWebKey2020".to_string();
        }
    } else if let Some(bytes) = vm.key_bytes()? {
        key.public_key_base58 = Some(Base::Base58Btc.encode(bytes));
        if key.type_.is_empty() {
            key.type_ = "Ed25519VerificationKey2018".to_string();
        }
    } else {
        tracerr!(Err::InvalidInput, "verificationMethod needs either JSONWebKey or Base58 key");
    }

    Ok(key)
}
