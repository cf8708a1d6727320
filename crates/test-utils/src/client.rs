use std::sync::{Arc, Mutex};

use vercre_didorb::operation::{
    CreateRequest, DeactivateRequest, PublicKeyEntry, RecoverRequest, UpdateRequest,
};
use vercre_didorb::{OperationType, Resolution, Result, SidetreeClient, Signer};

/// An operation handed to [`MockClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submitted {
    /// Operation type.
    pub operation: OperationType,

    /// DID operated on. Empty for create.
    pub did: String,

    /// Operation endpoints the request carried.
    pub endpoints: Vec<String>,

    /// Public keys the request adds to the document. Empty for deactivate.
    pub public_keys: Vec<PublicKeyEntry>,
}

/// Protocol client that records operations instead of anchoring them.
#[derive(Clone, Default)]
pub struct MockClient {
    created: Resolution,
    failure: Option<String>,
    submitted: Arc<Mutex<Vec<Submitted>>>,
}

impl MockClient {
    /// Create a client that accepts every operation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `resolution` from `create_did`.
    #[must_use]
    pub fn with_created(mut self, resolution: Resolution) -> Self {
        self.created = resolution;
        self
    }

    /// Fail every operation with `msg`.
    #[must_use]
    pub fn fail(mut self, msg: &str) -> Self {
        self.failure = Some(msg.to_string());
        self
    }

    /// Operations submitted so far.
    #[must_use]
    pub fn submitted(&self) -> Vec<Submitted> {
        self.submitted.lock().expect("lock on submitted mutex failed").clone()
    }

    fn record(&self, submitted: Submitted) -> Result<()> {
        if let Some(msg) = &self.failure {
            return Err(anyhow::anyhow!("{msg}").into());
        }
        self.submitted.lock().expect("lock on submitted mutex failed").push(submitted);
        Ok(())
    }
}

impl SidetreeClient for MockClient {
    async fn create_did(&self, req: CreateRequest) -> Result<Resolution> {
        self.record(Submitted {
            operation: OperationType::Create,
            did: String::new(),
            endpoints: req.operation_endpoints,
            public_keys: req.public_keys,
        })?;
        Ok(self.created.clone())
    }

    async fn update_did<S: Signer>(&self, did: &str, req: UpdateRequest<S>) -> Result<()> {
        self.record(Submitted {
            operation: OperationType::Update,
            did: did.to_string(),
            endpoints: req.operation_endpoints,
            public_keys: req.add_public_keys,
        })
    }

    async fn recover_did<S: Signer>(&self, did: &str, req: RecoverRequest<S>) -> Result<()> {
        self.record(Submitted {
            operation: OperationType::Recover,
            did: did.to_string(),
            endpoints: req.operation_endpoints,
            public_keys: req.public_keys,
        })
    }

    async fn deactivate_did<S: Signer>(
        &self, did: &str, req: DeactivateRequest<S>,
    ) -> Result<()> {
        self.record(Submitted {
            operation: OperationType::Deactivate,
            did: did.to_string(),
            endpoints: req.operation_endpoints,
            public_keys: vec![],
        })
    }
}
