use crate::config::SidetreeConfig;
use crate::keys::signer::Signer;

/// A deactivate operation. Only the recovery key holder can deactivate a DID.
#[derive(Clone, Debug)]
pub struct DeactivateRequest<S: Signer> {
    /// Holder of the key matching the current recovery commitment.
    pub signer: S,

    /// Where to submit the operation.
    pub operation_endpoints: Vec<String>,

    /// Multihash code for hashes in the rendered operation.
    pub multihash_code: u64,
}

impl<S: Signer> DeactivateRequest<S> {
    /// Deactivate with `signer`.
    #[must_use]
    pub const fn new(signer: S, config: &SidetreeConfig) -> Self {
        Self {
            signer,
            operation_endpoints: vec![],
            multihash_code: config.multihash_algorithm,
        }
    }

    /// Submit the operation to `endpoints`.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.operation_endpoints = endpoints;
        self
    }
}
