use crate::config::SidetreeConfig;
use crate::document::{Document, Service};
use crate::hash::hash_commitment;
use crate::operation::{public_keys, PublicKeyEntry};
use crate::options::{OptionKey, Options};
use crate::Result;

/// A validated create operation.
#[derive(Clone, Debug)]
pub struct CreateRequest {
    /// Public keys of the new document.
    pub public_keys: Vec<PublicKeyEntry>,

    /// Services of the new document.
    pub services: Vec<Service>,

    /// Commitment to the key that will authorize the first update.
    pub update_commitment: String,

    /// Commitment to the key that will authorize the first recovery.
    pub recovery_commitment: String,

    /// Anchor origin recorded for the new DID.
    pub anchor_origin: String,

    /// Where to submit the operation.
    pub operation_endpoints: Vec<String>,

    /// Multihash code for hashes in the rendered operation.
    pub multihash_code: u64,
}

impl CreateRequest {
    /// Validate `doc` and `opts` for a create operation.
    ///
    /// Requires the `UpdatePublicKey`, `RecoveryPublicKey` and `AnchorOrigin` options, checked
    /// in that order.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` for a missing or mistyped required option.
    /// * `Err::InvalidInput` if the document's verification methods cannot be mapped.
    /// * `Err::UnsupportedAlgorithm` if the configured multihash code is not supported.
    pub fn new(doc: &Document, opts: &Options, config: &SidetreeConfig) -> Result<Self> {
        let update_key = opts.required_public_key(&OptionKey::UpdatePublicKey)?;
        let recovery_key = opts.required_public_key(&OptionKey::RecoveryPublicKey)?;
        let anchor_origin = opts.required_string(&OptionKey::AnchorOrigin)?.to_string();

        let code = config.multihash_algorithm;
        Ok(Self {
            public_keys: public_keys(doc)?,
            services: doc.service.clone(),
            update_commitment: hash_commitment(&update_key, code)?,
            recovery_commitment: hash_commitment(&recovery_key, code)?,
            anchor_origin,
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
