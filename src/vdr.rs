//! # Verifiable Data Registry
//!
//! [`Vdr`] wires the collaborators together. Reads resolve endpoints and run a consensus read.
//! Writes validate their input, read the current document where the operation needs it, collect
//! keys and commitments, and hand a fully specified request to the protocol client.
//!
//! Collaborator errors are returned unchanged. The only wrapping is for the precondition read of
//! update, recover and deactivate, which fails with `failed to resolve did: <cause>`.

use std::time::Duration;

use crate::client::{HttpClient, SidetreeClient};
use crate::config::{ConfigService, HttpConfig, WellKnownConfig, DEFAULT_TIMEOUT};
use crate::consensus::Consensus;
use crate::did::DID_METHOD;
use crate::document::{Document, Resolution};
use crate::endpoint::{CasLocator, EndpointResolver, Purpose, WebCasLocator};
use crate::error::Err;
use crate::keys::retriever::{KeyRetriever, OperationType};
use crate::loader::DocumentLoader;
use crate::operation::{CreateRequest, DeactivateRequest, NextKeys, RecoverRequest, UpdateRequest};
use crate::options::{OptionKey, Options};
use crate::resolver::{HttpTransport, Transport};
use crate::{tracerr, Result};

/// `did:orb` registry.
pub struct Vdr<K, C, P, T>
where
    K: KeyRetriever,
    C: ConfigService,
    P: SidetreeClient,
    T: Transport,
{
    keys: K,
    config: C,
    client: P,
    transport: T,
    domain: Option<String>,
    locator: Box<dyn CasLocator>,
    loader: Option<Box<dyn DocumentLoader>>,
    timeout: Duration,
}

impl<K: KeyRetriever> Vdr<K, WellKnownConfig, HttpClient, HttpTransport> {
    /// A registry using HTTP for endpoint discovery, resolution and operation submission. All
    /// three share one client built from `config`.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidConfig` if the HTTP client cannot be built.
    pub fn http(keys: K, config: &HttpConfig) -> Result<Self> {
        let http = config.client()?;
        Ok(Self::new(
            keys,
            WellKnownConfig::new(http.clone()),
            HttpClient::new(http.clone()),
            HttpTransport::new(http),
        )
        .with_timeout(config.timeout))
    }
}

impl<K, C, P, T> Vdr<K, C, P, T>
where
    K: KeyRetriever,
    C: ConfigService,
    P: SidetreeClient,
    T: Transport,
{
    /// Create a registry from its collaborators.
    pub fn new(keys: K, config: C, client: P, transport: T) -> Self {
        Self {
            keys,
            config,
            client,
            transport,
            domain: None,
            locator: Box::new(WebCasLocator),
            loader: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Resolve endpoints against `domain` instead of any domain embedded in a DID.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Derive endpoints from content-addressable DIDs with `locator`.
    #[must_use]
    pub fn with_locator(mut self, locator: impl CasLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Load the JSON-LD contexts of resolved documents with `loader`.
    #[must_use]
    pub fn with_document_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Give each resolver at most `timeout` to answer.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true if this registry handles DIDs of `method`.
    #[must_use]
    pub fn accept(&self, method: &str) -> bool {
        method == DID_METHOD
    }

    fn endpoints(&self) -> EndpointResolver<'_, C> {
        EndpointResolver::new(&self.config, self.domain.as_deref(), self.locator.as_ref())
    }

    /// Create a DID for `doc`.
    ///
    /// Requires the `UpdatePublicKey`, `RecoveryPublicKey` and `AnchorOrigin` options.
    ///
    /// # Errors
    ///
    /// * Any error returned by the configuration service or the protocol client.
    /// * `Err::InvalidOption` for a missing or mistyped option.
    /// * `Err::InvalidInput` if the document's verification methods cannot be mapped.
    /// * `Err::InvalidConfig` if no operation endpoints can be found.
    pub async fn create(&self, doc: &Document, opts: &Options) -> Result<Resolution> {
        let sidetree = self.config.sidetree_config().await?;
        let req = CreateRequest::new(doc, opts, &sidetree)?;

        let endpoint = self.endpoints().resolve_create(opts, &req.anchor_origin).await?;
        let req = req.with_endpoints(endpoint.operation_endpoints);

        let resolution = self.client.create_did(req).await?;
        let id = resolution.did_document.as_ref().map(|d| d.id.as_str()).unwrap_or_default();
        tracing::info!(did = id, "created did");

        Ok(resolution)
    }

    /// Resolve `did` from a quorum of resolvers.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` if the `ResolutionEndpoints` option is not a list of strings.
    /// * Any error returned by the configuration service or the transport.
    /// * `Err::InvalidConfig` if no resolution endpoints can be found.
    /// * `Err::ContextLoadError` if a document's contexts cannot be loaded.
    /// * `Err::ConsensusFailure` if not enough resolvers agree.
    pub async fn read(&self, did: &str, opts: &Options) -> Result<Resolution> {
        let endpoint = self.endpoints().resolve(did, opts, Purpose::Resolution).await?;

        Consensus::new(&self.transport)
            .with_loader(self.loader.as_deref())
            .with_timeout(self.timeout)
            .read(did, &endpoint, opts)
            .await
    }

    /// Update the DID `doc.id` so its keys and services become those of `doc`. With the
    /// `Recover` option set the DID is recovered instead (see [`Vdr::recover`]).
    ///
    /// # Errors
    ///
    /// * `Err::NotFound` if the current document cannot be read.
    /// * Any error returned by the configuration service, key retriever or protocol client.
    /// * `Err::InvalidInput` if the document's verification methods cannot be mapped.
    /// * `Err::InvalidConfig` if no operation endpoints can be found.
    pub async fn update(&self, doc: &Document, opts: &Options) -> Result<()> {
        if opts.flag(&OptionKey::Recover)? {
            return self.recover(doc, opts).await;
        }

        let did = doc.id.as_str();
        let current = self.current(did, opts).await?;
        let sidetree = self.config.sidetree_config().await?;

        let next_update_key = self.keys.next_update_public_key(did).await?;
        let signer = self.keys.signing_key(did, OperationType::Update).await?;
        let req =
            UpdateRequest::new(current.document()?, doc, &next_update_key, signer, &sidetree)?;

        let endpoint = self.endpoints().resolve(did, opts, Purpose::Operation).await?;
        self.client.update_did(did, req.with_endpoints(endpoint.operation_endpoints)).await?;

        tracing::info!(did, "updated did");
        Ok(())
    }

    /// Recover the DID `doc.id`, replacing its document with `doc` and rotating both
    /// commitments. Requires the `AnchorOrigin` option.
    ///
    /// # Errors
    ///
    /// * `Err::NotFound` if the current document cannot be read.
    /// * `Err::InvalidOption` if the anchor origin is missing or not a string.
    /// * Any error returned by the configuration service, key retriever or protocol client.
    /// * `Err::InvalidInput` if the document's verification methods cannot be mapped.
    /// * `Err::InvalidConfig` if no operation endpoints can be found.
    pub async fn recover(&self, doc: &Document, opts: &Options) -> Result<()> {
        let did = doc.id.as_str();
        self.current(did, opts).await?;
        let sidetree = self.config.sidetree_config().await?;

        let anchor_origin = opts.required_string(&OptionKey::AnchorOrigin)?;
        let next = NextKeys {
            update: self.keys.next_update_public_key(did).await?,
            recovery: self.keys.next_recovery_public_key(did).await?,
        };
        let signer = self.keys.signing_key(did, OperationType::Recover).await?;
        let req = RecoverRequest::new(doc, anchor_origin, &next, signer, &sidetree)?;

        let endpoint = self.endpoints().resolve(did, opts, Purpose::Operation).await?;
        self.client.recover_did(did, req.with_endpoints(endpoint.operation_endpoints)).await?;

        tracing::info!(did, "recovered did");
        Ok(())
    }

    /// Deactivate `did`.
    ///
    /// # Errors
    ///
    /// * `Err::NotFound` if the current document cannot be read.
    /// * Any error returned by the configuration service, key retriever or protocol client.
    /// * `Err::InvalidConfig` if no operation endpoints can be found.
    pub async fn deactivate(&self, did: &str, opts: &Options) -> Result<()> {
        self.current(did, opts).await?;
        let sidetree = self.config.sidetree_config().await?;

        let signer = self.keys.signing_key(did, OperationType::Deactivate).await?;
        let req = DeactivateRequest::new(signer, &sidetree);

        let endpoint = self.endpoints().resolve(did, opts, Purpose::Operation).await?;
        self.client.deactivate_did(did, req.with_endpoints(endpoint.operation_endpoints)).await?;

        tracing::info!(did, "deactivated did");
        Ok(())
    }

    // The current resolution of `did`; writes cannot proceed without it.
    async fn current(&self, did: &str, opts: &Options) -> Result<Resolution> {
        match self.read(did, opts).await {
            Ok(resolution) => Ok(resolution),
            Err(e) => tracerr!(Err::NotFound, "failed to resolve did: {e}"),
        }
    }
}
