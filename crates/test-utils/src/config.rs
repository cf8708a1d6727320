use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use vercre_didorb::{ConfigService, Endpoint, Result, SidetreeConfig};

const SIDETREE: &str = "sidetree";
const DOMAIN: &str = "domain";
const ANCHOR_ORIGIN: &str = "anchor_origin";

/// Configuration service returning fixed endpoint sets. Domains that have no endpoint set
/// configured get an empty one.
#[derive(Clone, Default)]
pub struct MockConfig {
    endpoint: Option<Endpoint>,
    anchor_endpoint: Option<Endpoint>,
    failures: Arc<DashMap<&'static str, String>>,
    domains: Arc<DashMap<String, usize>>,
    calls: Arc<AtomicUsize>,
}

impl MockConfig {
    /// Create a configuration service with default Sidetree parameters and no endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `endpoint` for every domain.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Return `endpoint` for every anchor origin.
    #[must_use]
    pub fn with_anchor_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.anchor_endpoint = Some(endpoint);
        self
    }

    /// Fail `sidetree_config` with `msg`.
    #[must_use]
    pub fn fail_sidetree_config(self, msg: &str) -> Self {
        self.failures.insert(SIDETREE, msg.to_string());
        self
    }

    /// Fail `get_endpoint` with `msg`.
    #[must_use]
    pub fn fail_get_endpoint(self, msg: &str) -> Self {
        self.failures.insert(DOMAIN, msg.to_string());
        self
    }

    /// Fail `get_endpoint_from_anchor_origin` with `msg`.
    #[must_use]
    pub fn fail_anchor_origin(self, msg: &str) -> Self {
        self.failures.insert(ANCHOR_ORIGIN, msg.to_string());
        self
    }

    /// Number of requests made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of endpoint lookups made for `domain`.
    #[must_use]
    pub fn lookups(&self, domain: &str) -> usize {
        self.domains.get(domain).map_or(0, |n| *n)
    }

    fn check(&self, kind: &'static str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.get(kind) {
            Some(msg) => Err(anyhow::anyhow!("{}", msg.value()).into()),
            None => Ok(()),
        }
    }
}

impl ConfigService for MockConfig {
    async fn sidetree_config(&self) -> Result<SidetreeConfig> {
        self.check(SIDETREE)?;
        Ok(SidetreeConfig::default())
    }

    async fn get_endpoint(&self, domain: &str) -> Result<Endpoint> {
        *self.domains.entry(domain.to_string()).or_default() += 1;
        self.check(DOMAIN)?;
        Ok(self.endpoint.clone().unwrap_or_default())
    }

    async fn get_endpoint_from_anchor_origin(&self, _did: &str) -> Result<Endpoint> {
        self.check(ANCHOR_ORIGIN)?;
        Ok(self.anchor_endpoint.clone().unwrap_or_default())
    }
}
