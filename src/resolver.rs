//! # Resolver Transport
//!
//! A [`Transport`] turns a resolver URL into a live [`Resolver`] handle. The consensus reader
//! asks the transport for one handle per endpoint. Substitute the transport to resolve from
//! anything other than the HTTP resolvers of a Sidetree node.

use std::future::Future;

use reqwest::header::ACCEPT;
use url::Url;

use crate::config::HttpConfig;
use crate::document::Resolution;
use crate::error::Err;
use crate::options::{OptionKey, Options};
use crate::{tracerr, Result};

/// Media type requested from resolvers.
pub const DID_LD_JSON: &str = "application/did+ld+json";

/// Resolves a DID against a single endpoint.
pub trait Resolver: Send + Sync {
    /// Resolve `did`.
    fn resolve(
        &self, did: &str, opts: &Options,
    ) -> impl Future<Output = Result<Resolution>> + Send;
}

/// Provides [`Resolver`] handles for endpoint URLs.
pub trait Transport: Send + Sync {
    /// Resolver handle type.
    type Resolver: Resolver;

    /// A resolver for `url`.
    ///
    /// # Errors
    ///
    /// Implementations fail when `url` is empty or otherwise unusable.
    fn resolver(&self, url: &str) -> Result<Self::Resolver>;
}

impl<F, R> Transport for F
where
    F: Fn(&str) -> Result<R> + Send + Sync,
    R: Resolver,
{
    type Resolver = R;

    fn resolver(&self, url: &str) -> Result<R> {
        self(url)
    }
}

/// [`Transport`] for Sidetree REST resolvers.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport sharing `http`.
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Create a transport from transport settings.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidConfig` if the HTTP client cannot be built.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Ok(Self::new(config.client()?))
    }
}

impl Transport for HttpTransport {
    type Resolver = HttpResolver;

    fn resolver(&self, url: &str) -> Result<HttpResolver> {
        if url.is_empty() {
            tracerr!(Err::InvalidInput, "empty url");
        }
        if let Err(e) = Url::parse(url) {
            tracerr!(Err::InvalidInput, "invalid resolver url {url}: {e}");
        }
        Ok(HttpResolver {
            http: self.http.clone(),
            base: url.trim_end_matches('/').to_string(),
        })
    }
}

/// Resolves DIDs with `GET <base>/<did>`.
#[derive(Clone, Debug)]
pub struct HttpResolver {
    http: reqwest::Client,
    base: String,
}

impl Resolver for HttpResolver {
    async fn resolve(&self, did: &str, opts: &Options) -> Result<Resolution> {
        let mut url = Url::parse(&format!("{}/{did}", self.base))?;
        for (key, name) in
            [(OptionKey::VersionId, "versionId"), (OptionKey::VersionTime, "versionTime")]
        {
            if let Some(value) = opts.string(&key)? {
                url.query_pairs_mut().append_pair(name, value);
            }
        }

        let res = match self.http.get(url.clone()).header(ACCEPT, DID_LD_JSON).send().await {
            Ok(res) => res,
            Err(e) => tracerr!(Err::RequestError, "failed to resolve {did} at {url}: {e}"),
        };
        let status = res.status();
        if !status.is_success() {
            tracerr!(Err::ApiError, "resolver {url} returned {status}");
        }
        let body = match res.bytes().await {
            Ok(body) => body,
            Err(e) => tracerr!(Err::RequestError, "failed to read response from {url}: {e}"),
        };

        Resolution::from_slice(&body)
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, RawQuery};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::Router;

    use super::*;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("should bind");
        let addr = listener.local_addr().expect("should have address");
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}/sidetree/v1/identifiers")
    }

    #[test]
    fn empty_url() {
        let transport = HttpTransport::new(reqwest::Client::new());
        let Err(e) = transport.resolver("") else {
            panic!("expected error");
        };
        assert_eq!(e.to_string(), "empty url");
    }

    #[tokio::test]
    async fn resolves_document() {
        let app = Router::new().route(
            "/sidetree/v1/identifiers/:did",
            get(|Path(did): Path<String>, RawQuery(query): RawQuery, headers: HeaderMap| {
                assert_eq!(headers[ACCEPT], DID_LD_JSON);
                assert_eq!(query.as_deref(), Some("versionId=v1"));
                async move { format!(r#"{{"didDocument": {{"id": "{did}"}}}}"#) }
            }),
        );
        let url = serve(app).await;

        let resolver = HttpTransport::new(reqwest::Client::new()).resolver(&url).expect("ok");
        let opts = Options::new().with(OptionKey::VersionId, "v1");
        let res = resolver.resolve("did:orb:uAAA:123", &opts).await.expect("should resolve");
        assert_eq!(res.document().expect("should have document").id, "did:orb:uAAA:123");
    }

    #[tokio::test]
    async fn error_status() {
        let app = Router::new().route(
            "/sidetree/v1/identifiers/:did",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let url = serve(app).await;

        let resolver = HttpTransport::new(reqwest::Client::new()).resolver(&url).expect("ok");
        let err = resolver.resolve("did:orb:uAAA:123", &Options::new()).await.expect_err("fails");
        assert!(err.is(Err::ApiError));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn malformed_body() {
        let app = Router::new()
            .route("/sidetree/v1/identifiers/:did", get(|| async { "not json" }));
        let url = serve(app).await;

        let resolver = HttpTransport::new(reqwest::Client::new()).resolver(&url).expect("ok");
        let err = resolver.resolve("did:orb:uAAA:123", &Options::new()).await.expect_err("fails");
        assert!(err.is(Err::DeserializationError));
    }
}
