use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use vercre_didorb::{Ed25519Signer, Jwk, KeyRetriever, OperationType, Result};

const UPDATE: &str = "update";
const RECOVERY: &str = "recovery";
const SIGNING: &str = "signing";

/// Ephemeral key retriever. Every request generates a fresh Ed25519 key; requests can be made to
/// fail with a fixed message.
#[derive(Clone, Default)]
pub struct MockKeys {
    issued: Arc<DashMap<String, SigningKey>>,
    failures: Arc<DashMap<&'static str, String>>,
    calls: Arc<AtomicUsize>,
}

impl MockKeys {
    /// Create a key retriever that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `next_update_public_key` with `msg`.
    #[must_use]
    pub fn fail_next_update(self, msg: &str) -> Self {
        self.failures.insert(UPDATE, msg.to_string());
        self
    }

    /// Fail `next_recovery_public_key` with `msg`.
    #[must_use]
    pub fn fail_next_recovery(self, msg: &str) -> Self {
        self.failures.insert(RECOVERY, msg.to_string());
        self
    }

    /// Fail `signing_key` with `msg`.
    #[must_use]
    pub fn fail_signing(self, msg: &str) -> Self {
        self.failures.insert(SIGNING, msg.to_string());
        self
    }

    /// Number of requests made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The last next-round key of `kind` (`update` or `recovery`) issued for `did`.
    #[must_use]
    pub fn issued(&self, did: &str, kind: &str) -> Option<Jwk> {
        let key = self.issued.get(&format!("{did}#{kind}"))?;
        Jwk::ed25519(key.verifying_key().as_bytes()).ok()
    }

    fn check(&self, kind: &'static str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.get(kind) {
            Some(msg) => Err(anyhow::anyhow!("{}", msg.value()).into()),
            None => Ok(()),
        }
    }

    fn next(&self, did: &str, kind: &'static str) -> Result<Jwk> {
        self.check(kind)?;
        let key = SigningKey::generate(&mut OsRng);
        let jwk = Jwk::ed25519(key.verifying_key().as_bytes())?;
        self.issued.insert(format!("{did}#{kind}"), key);
        Ok(jwk)
    }
}

impl KeyRetriever for MockKeys {
    type Signer = Ed25519Signer;

    async fn next_recovery_public_key(&self, did: &str) -> Result<Jwk> {
        self.next(did, RECOVERY)
    }

    async fn next_update_public_key(&self, did: &str) -> Result<Jwk> {
        self.next(did, UPDATE)
    }

    async fn signing_key(&self, _did: &str, _op: OperationType) -> Result<Ed25519Signer> {
        self.check(SIGNING)?;
        Ok(SigningKey::generate(&mut OsRng).into())
    }
}
