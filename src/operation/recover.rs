use crate::config::SidetreeConfig;
use crate::document::{Document, Service};
use crate::hash::hash_commitment;
use crate::keys::signer::Signer;
use crate::keys::Jwk;
use crate::operation::{public_keys, PublicKeyEntry};
use crate::Result;

/// A validated recover operation. Recovery replaces the whole document and rotates both the
/// update and the recovery commitments.
#[derive(Clone, Debug)]
pub struct RecoverRequest<S: Signer> {
    /// Public keys of the recovered document.
    pub public_keys: Vec<PublicKeyEntry>,

    /// Services of the recovered document.
    pub services: Vec<Service>,

    /// Commitment to the key that will authorize the next update.
    pub update_commitment: String,

    /// Commitment to the key that will authorize the next recovery.
    pub recovery_commitment: String,

    /// Anchor origin recorded for the DID.
    pub anchor_origin: String,

    /// Holder of the key matching the current recovery commitment.
    pub signer: S,

    /// Where to submit the operation.
    pub operation_endpoints: Vec<String>,

    /// Multihash code for hashes in the rendered operation.
    pub multihash_code: u64,
}

/// Next-round public keys of a recovery.
#[derive(Clone, Debug)]
pub struct NextKeys {
    /// Key whose commitment authorizes the next update.
    pub update: Jwk,

    /// Key whose commitment authorizes the next recovery.
    pub recovery: Jwk,
}

impl<S: Signer> RecoverRequest<S> {
    /// Build a recovery replacing the DID's document with `doc`.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidInput` if the document's verification methods cannot be mapped.
    /// * `Err::UnsupportedAlgorithm` if the configured multihash code is not supported.
    pub fn new(
        doc: &Document, anchor_origin: &str, next: &NextKeys, signer: S, config: &SidetreeConfig,
    ) -> Result<Self> {
        let code = config.multihash_algorithm;
        Ok(Self {
            public_keys: public_keys(doc)?,
            services: doc.service.clone(),
            update_commitment: hash_commitment(&next.update, code)?,
            recovery_commitment: hash_commitment(&next.recovery, code)?,
            anchor_origin: anchor_origin.to_string(),
            signer,
            operation_endpoints: vec![],
            multihash_code: code,
        })
    }

    /// Submit the operation to `endpoints`.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.operation_endpoints = endpoints;
        self
    }
}
