//! Key custody. The registry never holds private keys itself: the next-round public keys used
//! for commitments and the signing keys used to authorize operations are requested from a
//! [`KeyRetriever`] supplied by the caller.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::keys::signer::Signer;
use crate::keys::Jwk;
use crate::Result;

/// Type of DID operation.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationType {
    /// Create a new DID.
    #[default]
    Create,
    /// Update an existing DID.
    Update,
    /// Deactivate a DID.
    Deactivate,
    /// Recover a DID.
    Recover,
}

/// Display implementation for DID operation type.
impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Deactivate => write!(f, "deactivate"),
            Self::Recover => write!(f, "recover"),
        }
    }
}

/// Provider of key material for write operations.
///
/// Any error returned by an implementation aborts the enclosing operation and is surfaced to
/// the caller unchanged.
pub trait KeyRetriever: Send + Sync {
    /// Signer handed to the protocol client to authorize update, recover and deactivate
    /// operations.
    type Signer: Signer;

    /// Public key whose commitment will authorize the next recovery (or deactivation) of `did`.
    fn next_recovery_public_key(&self, did: &str) -> impl Future<Output = Result<Jwk>> + Send;

    /// Public key whose commitment will authorize the next update of `did`.
    fn next_update_public_key(&self, did: &str) -> impl Future<Output = Result<Jwk>> + Send;

    /// The key matching the current commitment of `did` for the given operation type.
    fn signing_key(
        &self, did: &str, op: OperationType,
    ) -> impl Future<Output = Result<Self::Signer>> + Send;
}
