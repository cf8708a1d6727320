//! # Endpoint Resolution
//!
//! Decides which network locations to use for a read or a write. Strategies are tried in a
//! fixed order and the first one that produces URLs for the requested purpose wins:
//!
//! 1. endpoints given explicitly in the call options;
//! 2. a content-addressable locator embedded in the DID (see [`CasLocator`]);
//! 3. the endpoint set of the configured default domain, or of the domain embedded in the DID;
//! 4. the endpoint set of the DID's anchor origin.
//!
//! Errors from the configuration service abort resolution immediately.

use url::Url;

use crate::config::{ConfigService, Endpoint};
use crate::did::{Did, Locator};
use crate::error::Err;
use crate::options::{OptionKey, Options};
use crate::{tracerr, Result};

/// What the endpoints will be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Purpose {
    /// Reading (resolving) a DID.
    Resolution,
    /// Submitting an operation.
    Operation,
}

impl Purpose {
    /// The URLs of `endpoint` serving this purpose.
    #[must_use]
    pub fn urls(self, endpoint: &Endpoint) -> &[String] {
        match self {
            Self::Resolution => &endpoint.resolution_endpoints,
            Self::Operation => &endpoint.operation_endpoints,
        }
    }

    const fn option(self) -> OptionKey {
        match self {
            Self::Resolution => OptionKey::ResolutionEndpoints,
            Self::Operation => OptionKey::OperationEndpoints,
        }
    }
}

/// Derives endpoints directly from a content-addressable locator embedded in a DID, without
/// consulting the configuration service.
pub trait CasLocator: Send + Sync {
    /// Endpoints for `did`, or `None` when the DID carries no usable locator.
    fn endpoint(&self, did: &Did) -> Option<Endpoint>;
}

/// Maps `webcas` locators to the Sidetree REST API of the serving domain. Other locators
/// (including IPFS) yield nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebCasLocator;

impl CasLocator for WebCasLocator {
    fn endpoint(&self, did: &Did) -> Option<Endpoint> {
        let Some(Locator::WebCas { domain, .. }) = &did.locator else {
            return None;
        };
        Some(Endpoint {
            resolution_endpoints: vec![format!("https://{domain}/sidetree/v1/identifiers")],
            operation_endpoints: vec![format!("https://{domain}/sidetree/v1/operations")],
            min_resolvers: 1,
            max_age: 0,
        })
    }
}

/// Resolves the endpoint set for a call.
pub struct EndpointResolver<'a, C: ConfigService> {
    config: &'a C,
    domain: Option<&'a str>,
    locator: &'a dyn CasLocator,
}

impl<'a, C: ConfigService> EndpointResolver<'a, C> {
    /// Create a resolver. `domain`, when set, takes precedence over any domain embedded in a DID.
    pub fn new(config: &'a C, domain: Option<&'a str>, locator: &'a dyn CasLocator) -> Self {
        Self {
            config,
            domain,
            locator,
        }
    }

    /// Endpoints to use for an existing `did`.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` if the explicit endpoint option is not a list of strings.
    /// * Any error returned by the configuration service.
    /// * `Err::InvalidConfig` if no strategy produced endpoints.
    pub async fn resolve(&self, did: &str, opts: &Options, purpose: Purpose) -> Result<Endpoint> {
        let mut tried = vec!["options"];
        if let Some(endpoint) = explicit(opts, purpose)? {
            return Ok(endpoint);
        }

        let parsed = did.parse::<Did>().ok();

        if let Some(parsed) = &parsed {
            tried.push("content-addressable locator");
            if let Some(endpoint) = self.locator.endpoint(parsed) {
                if yields(&endpoint, purpose) {
                    tracing::debug!(did, "endpoints from content-addressable locator");
                    return Ok(endpoint);
                }
            }
        }

        if let Some(domain) = self.domain.or_else(|| parsed.as_ref().and_then(Did::domain)) {
            tried.push("domain");
            let endpoint = self.config.get_endpoint(domain).await?;
            if yields(&endpoint, purpose) {
                tracing::debug!(did, domain, "endpoints from domain");
                return Ok(endpoint);
            }
        }

        if parsed.is_some_and(|d| d.is_orb() && d.is_anchored()) {
            tried.push("anchor origin");
            let endpoint = self.config.get_endpoint_from_anchor_origin(did).await?;
            if yields(&endpoint, purpose) {
                tracing::debug!(did, "endpoints from anchor origin");
                return Ok(endpoint);
            }
        }

        not_found(&tried)
    }

    /// Endpoints to submit a create operation to. A new DID has no locator yet, so the anchor
    /// origin being recorded for it stands in for the DID's own.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` if the explicit endpoint option is not a list of strings.
    /// * Any error returned by the configuration service.
    /// * `Err::InvalidConfig` if no strategy produced endpoints.
    pub async fn resolve_create(&self, opts: &Options, anchor_origin: &str) -> Result<Endpoint> {
        let mut tried = vec!["options"];
        if let Some(endpoint) = explicit(opts, Purpose::Operation)? {
            return Ok(endpoint);
        }

        let origin = origin_domain(anchor_origin);
        for domain in self.domain.into_iter().chain(origin.as_deref()) {
            tried.push("domain");
            let endpoint = self.config.get_endpoint(domain).await?;
            if yields(&endpoint, Purpose::Operation) {
                tracing::debug!(domain, "create endpoints from domain");
                return Ok(endpoint);
            }
        }

        not_found(&tried)
    }
}

fn explicit(opts: &Options, purpose: Purpose) -> Result<Option<Endpoint>> {
    let Some(urls) = opts.strings(&purpose.option())? else {
        return Ok(None);
    };
    if urls.is_empty() {
        return Ok(None);
    }

    tracing::debug!(?urls, "endpoints from options");
    let mut endpoint = Endpoint {
        min_resolvers: urls.len(),
        ..Endpoint::default()
    };
    match purpose {
        Purpose::Resolution => endpoint.resolution_endpoints = urls.to_vec(),
        Purpose::Operation => endpoint.operation_endpoints = urls.to_vec(),
    }
    Ok(Some(endpoint))
}

fn yields(endpoint: &Endpoint, purpose: Purpose) -> bool {
    !purpose.urls(endpoint).is_empty()
}

fn not_found<T>(tried: &[&str]) -> Result<T> {
    tracerr!(
        Err::InvalidConfig,
        "failed to get endpoints: domain is empty and did is not ipfs or webcas (tried: {})",
        tried.join(", ")
    )
}

// The domain of an anchor origin given as a DID, a URL or a bare domain.
fn origin_domain(origin: &str) -> Option<String> {
    if origin.is_empty() {
        return None;
    }
    if origin.starts_with("did:") {
        return origin.parse::<Did>().ok()?.domain().map(ToString::to_string);
    }
    match Url::parse(origin) {
        Ok(url) => {
            let host = url.host_str()?;
            Some(url.port().map_or_else(|| host.to_string(), |port| format!("{host}:{port}")))
        }
        Err(_) => Some(origin.to_string()),
    }
}
