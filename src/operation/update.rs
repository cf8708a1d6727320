use crate::config::SidetreeConfig;
use crate::document::verification::fragment;
use crate::document::{Document, Service};
use crate::hash::hash_commitment;
use crate::keys::signer::Signer;
use crate::keys::Jwk;
use crate::operation::{public_keys, PublicKeyEntry};
use crate::Result;

/// A validated update operation. The document's keys and services are replaced: everything in
/// the current document is removed and everything in the new document is added.
#[derive(Clone, Debug)]
pub struct UpdateRequest<S: Signer> {
    /// Ids of the current document's public keys.
    pub remove_public_keys: Vec<String>,

    /// Public keys of the new document.
    pub add_public_keys: Vec<PublicKeyEntry>,

    /// Ids of the current document's services.
    pub remove_services: Vec<String>,

    /// Services of the new document.
    pub add_services: Vec<Service>,

    /// Commitment to the key that will authorize the next update.
    pub update_commitment: String,

    /// Holder of the key matching the current update commitment.
    pub signer: S,

    /// Where to submit the operation.
    pub operation_endpoints: Vec<String>,

    /// Multihash code for hashes in the rendered operation.
    pub multihash_code: u64,
}

impl<S: Signer> UpdateRequest<S> {
    /// Build an update turning `current` into `doc`.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidInput` if the new document's verification methods cannot be mapped.
    /// * `Err::UnsupportedAlgorithm` if the configured multihash code is not supported.
    pub fn new(
        current: &Document, doc: &Document, next_update_key: &Jwk, signer: S,
        config: &SidetreeConfig,
    ) -> Result<Self> {
        let add_public_keys = public_keys(doc)?;

        let mut remove_public_keys: Vec<String> = vec![];
        let bound = current.verifications().map(|v| &v.method);
        let methods = current.verification_method.iter().chain(bound);
        for vm in methods {
            let id = vm.fragment().to_string();
            if !remove_public_keys.contains(&id) {
                remove_public_keys.push(id);
            }
        }

        Ok(Self {
            remove_public_keys,
            add_public_keys,
            remove_services: current.service.iter().map(|s| fragment(&s.id).to_string()).collect(),
            add_services: doc.service.clone(),
            update_commitment: hash_commitment(next_update_key, config.multihash_algorithm)?,
            signer,
            operation_endpoints: vec![],
            multihash_code: config.multihash_algorithm,
        })
    }

    /// Submit the operation to `endpoints`.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.operation_endpoints = endpoints;
        self
    }
}
