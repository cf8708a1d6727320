//! # Configuration
//!
//! Transport settings shared by the HTTP collaborators, Sidetree protocol parameters and the
//! [`ConfigService`] that maps domains and anchor origins to endpoint sets.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::did::Did;
use crate::error::Err;
use crate::hash::SHA2_256;
use crate::{tracerr, Result};

/// Default timeout for a single HTTP request, including each resolver query of a read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport settings for HTTP collaborators.
#[derive(Clone, Debug)]
pub struct HttpConfig {
    /// Bearer token sent with every request.
    pub auth_token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Additional PEM encoded trust anchors.
    pub root_certificates: Vec<Vec<u8>>,

    /// Accept any server certificate. Test deployments only.
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
            root_certificates: vec![],
            accept_invalid_certs: false,
        }
    }
}

impl HttpConfig {
    /// Send `token` as a bearer token.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Trust an additional PEM encoded root certificate.
    #[must_use]
    pub fn with_root_certificate(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.root_certificates.push(pem.into());
        self
    }

    /// Accept invalid server certificates.
    #[must_use]
    pub const fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build an HTTP client from the settings.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidConfig` if a certificate or the auth token cannot be used.
    pub fn client(&self) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) else {
                tracerr!(Err::InvalidConfig, "auth token is not a valid header value");
            };
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        for pem in &self.root_certificates {
            match reqwest::Certificate::from_pem(pem) {
                Ok(cert) => builder = builder.add_root_certificate(cert),
                Err(e) => tracerr!(Err::InvalidConfig, "invalid root certificate: {e}"),
            }
        }

        match builder.build() {
            Ok(client) => Ok(client),
            Err(e) => tracerr!(Err::InvalidConfig, "failed to create http client: {e}"),
        }
    }
}

/// Sidetree protocol parameters.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SidetreeConfig {
    /// Multihash code used for commitments, reveal values and delta hashes.
    pub multihash_algorithm: u64,

    /// Seconds a fetched endpoint set stays valid.
    pub max_age: u64,
}

impl Default for SidetreeConfig {
    fn default() -> Self {
        Self {
            multihash_algorithm: SHA2_256,
            max_age: 3600,
        }
    }
}

/// Endpoint set bound to a domain or anchor origin.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoint {
    /// Resolver URLs.
    pub resolution_endpoints: Vec<String>,

    /// Operation (anchor) URLs.
    pub operation_endpoints: Vec<String>,

    /// Number of resolvers that must return the same document for a read to succeed.
    pub min_resolvers: usize,

    /// Seconds the set stays valid. Zero defers to [`SidetreeConfig::max_age`].
    pub max_age: u64,
}

/// Source of Sidetree parameters and endpoint sets.
///
/// Implementations own any caching. Errors are surfaced to the caller unchanged and never
/// retried.
pub trait ConfigService: Send + Sync {
    /// Sidetree protocol parameters.
    fn sidetree_config(&self) -> impl Future<Output = Result<SidetreeConfig>> + Send;

    /// Endpoint set published by `domain`.
    fn get_endpoint(&self, domain: &str) -> impl Future<Output = Result<Endpoint>> + Send;

    /// Endpoint set of the anchor origin recorded for `did`.
    fn get_endpoint_from_anchor_origin(
        &self, did: &str,
    ) -> impl Future<Output = Result<Endpoint>> + Send;
}

// `/.well-known/did-orb` discovery document.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WellKnown {
    resolution_endpoint: String,
    operation_endpoint: String,
}

struct Cached {
    endpoint: Endpoint,
    expires: DateTime<Utc>,
}

/// [`ConfigService`] discovering endpoints from each domain's `/.well-known/did-orb` document.
/// Endpoint sets are cached until they expire.
///
/// Anchor origins are only discoverable for DIDs that embed a domain (`https` and `webcas`
/// locators), and the domain step of endpoint resolution already covers those. Registries that
/// read `ipfs`, `hl` or bare-CID DIDs without explicit endpoints need a [`ConfigService`] that
/// knows where those anchors live.
pub struct WellKnownConfig {
    http: reqwest::Client,
    sidetree: SidetreeConfig,
    scheme: String,
    cache: DashMap<String, Cached>,
}

impl WellKnownConfig {
    /// Create a config service using `http` for discovery.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            sidetree: SidetreeConfig::default(),
            scheme: "https".to_string(),
            cache: DashMap::new(),
        }
    }

    /// Use the given Sidetree parameters.
    #[must_use]
    pub fn with_sidetree_config(mut self, sidetree: SidetreeConfig) -> Self {
        self.sidetree = sidetree;
        self
    }

    /// Use `scheme` (`http` for local deployments) for discovery requests.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    // A live cache entry for `domain`. A stale entry is evicted.
    fn cached(&self, domain: &str) -> Option<Endpoint> {
        let now = Utc::now();
        if let Some(entry) = self.cache.get(domain) {
            if entry.expires > now {
                return Some(entry.endpoint.clone());
            }
        }
        self.cache.remove_if(domain, |_, entry| entry.expires <= now);
        None
    }

    async fn discover(&self, domain: &str) -> Result<Endpoint> {
        let url = format!("{}://{domain}/.well-known/did-orb", self.scheme);
        tracing::debug!(%url, "discovering endpoints");

        let res = match self.http.get(&url).header(ACCEPT, "application/json").send().await {
            Ok(res) => res,
            Err(e) => tracerr!(Err::RequestError, "getting endpoint from {url}: {e}"),
        };
        if !res.status().is_success() {
            tracerr!(Err::ApiError, "getting endpoint from {url}: status {}", res.status());
        }
        let well_known = match res.json::<WellKnown>().await {
            Ok(wk) => wk,
            Err(e) => tracerr!(Err::DeserializationError, "getting endpoint from {url}: {e}"),
        };

        Ok(Endpoint {
            resolution_endpoints: vec![well_known.resolution_endpoint],
            operation_endpoints: vec![well_known.operation_endpoint],
            min_resolvers: 1,
            max_age: self.sidetree.max_age,
        })
    }
}

impl ConfigService for WellKnownConfig {
    async fn sidetree_config(&self) -> Result<SidetreeConfig> {
        Ok(self.sidetree.clone())
    }

    async fn get_endpoint(&self, domain: &str) -> Result<Endpoint> {
        if let Some(endpoint) = self.cached(domain) {
            return Ok(endpoint);
        }

        let endpoint = self.discover(domain).await?;
        let max_age = if endpoint.max_age > 0 { endpoint.max_age } else { self.sidetree.max_age };
        let ttl = i64::try_from(max_age).ok().and_then(TimeDelta::try_seconds);
        self.cache.insert(
            domain.to_string(),
            Cached {
                endpoint: endpoint.clone(),
                expires: Utc::now() + ttl.unwrap_or_else(TimeDelta::zero),
            },
        );

        Ok(endpoint)
    }

    // Only DIDs embedding a domain can be mapped to a well-known document.
    async fn get_endpoint_from_anchor_origin(&self, did: &str) -> Result<Endpoint> {
        let parsed: Did = did.parse()?;
        let Some(domain) = parsed.domain() else {
            tracerr!(
                Err::NotSupported,
                "anchor origin of {parsed} cannot be discovered from a well-known document"
            );
        };
        self.get_endpoint(domain).await
    }
}
