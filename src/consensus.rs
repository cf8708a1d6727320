//! # Consensus Read
//!
//! A DID is only trusted once a minimum number of independent resolvers return the same
//! resolution. Resolvers are queried concurrently, each under its own timeout, and answers are
//! grouped by their canonical (JCS) byte form. The read succeeds as soon as one group reaches
//! the quorum and fails as soon as no group can reach it any more.
//!
//! Individual resolver failures are tolerated: they only use up the remaining attempts.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::{Endpoint, DEFAULT_TIMEOUT};
use crate::document::Resolution;
use crate::error::Err;
use crate::hash::canonical;
use crate::loader::DocumentLoader;
use crate::options::Options;
use crate::resolver::{Resolver, Transport};
use crate::{tracerr, Error, Result};

/// Reads a DID from a quorum of resolvers.
pub struct Consensus<'a, T: Transport> {
    transport: &'a T,
    loader: Option<&'a dyn DocumentLoader>,
    timeout: Duration,
}

impl<'a, T: Transport> Consensus<'a, T> {
    /// Create a reader using `transport` for resolver handles.
    pub const fn new(transport: &'a T) -> Self {
        Self {
            transport,
            loader: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load the remote contexts of every returned document with `loader`.
    #[must_use]
    pub const fn with_loader(mut self, loader: Option<&'a dyn DocumentLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Give each resolver at most `timeout` to answer.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve `did` against the resolution endpoints of `endpoint`, requiring
    /// `endpoint.min_resolvers` identical answers (at least one).
    ///
    /// # Errors
    ///
    /// * `Err::InvalidConfig` if the quorum cannot be met by the number of endpoints.
    /// * Any error returned by the transport when creating resolver handles.
    /// * `Err::ContextLoadError` if a returned document's context cannot be loaded.
    /// * `Err::DeserializationError` when the only answers carried no document.
    /// * The resolvers' error when every attempted resolver failed the same way.
    /// * `Err::ConsensusFailure` otherwise, when the quorum is not reached.
    pub async fn read(
        &self, did: &str, endpoint: &Endpoint, opts: &Options,
    ) -> Result<Resolution> {
        let urls = &endpoint.resolution_endpoints;
        let quorum = endpoint.min_resolvers.max(1);
        if quorum > urls.len() {
            tracerr!(
                Err::InvalidConfig,
                "min resolvers {quorum} exceeds the {} resolution endpoints",
                urls.len()
            );
        }

        let mut resolvers = Vec::with_capacity(urls.len());
        for url in urls {
            resolvers.push((url.as_str(), self.transport.resolver(url)?));
        }

        let mut pending = resolvers
            .iter()
            .map(|(url, resolver)| async move {
                let answer = tokio::time::timeout(self.timeout, resolver.resolve(did, opts));
                let res = match answer.await {
                    Ok(res) => res,
                    Err(_) => timed_out(url, self.timeout),
                };
                (*url, res)
            })
            .collect::<FuturesUnordered<_>>();

        let mut remaining = resolvers.len();
        let mut tally: HashMap<Vec<u8>, usize> = HashMap::new();
        let mut failures: Vec<Error> = vec![];
        let mut loaded: HashSet<String> = HashSet::new();

        while let Some((url, res)) = pending.next().await {
            remaining -= 1;

            match res.and_then(|resolution| with_document(url, resolution)) {
                Ok(resolution) => {
                    self.load_contexts(&resolution, &mut loaded).await?;
                    let bytes = canonical(&resolution)?;
                    let count = tally.entry(bytes).or_default();
                    *count += 1;
                    tracing::debug!(url, did, agreeing = *count, quorum, "resolver answered");
                    if *count >= quorum {
                        return Ok(resolution);
                    }
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, "resolver failed");
                    failures.push(e);
                }
            }

            let best = tally.values().copied().max().unwrap_or_default();
            if best + remaining < quorum {
                break;
            }
        }

        if tally.is_empty() && !failures.is_empty() {
            let first = failures[0].to_string();
            if failures.iter().all(|e| e.to_string() == first) {
                return Err(failures.swap_remove(0));
            }
        }

        tracerr!(Err::ConsensusFailure, "failed to fetch correct did from min resolvers")
    }

    // Load the remote contexts of a returned document. Each URL is loaded once per read, and
    // a document only counts once all of its contexts have loaded.
    async fn load_contexts(
        &self, resolution: &Resolution, loaded: &mut HashSet<String>,
    ) -> Result<()> {
        let (Some(loader), Some(doc)) = (self.loader, &resolution.did_document) else {
            return Ok(());
        };
        for url in doc.context_urls() {
            if loaded.contains(url) {
                continue;
            }
            if let Err(e) = loader.load_document(url).await {
                tracerr!(Err::ContextLoadError, "loading remote context failed: {e}");
            }
            loaded.insert(url.to_string());
        }
        Ok(())
    }
}

// An answer without a document has not resolved the DID.
fn with_document(url: &str, resolution: Resolution) -> Result<Resolution> {
    if resolution.did_document.is_none() {
        tracerr!(Err::DeserializationError, "resolver {url} returned no didDocument");
    }
    Ok(resolution)
}

fn timed_out(url: &str, timeout: Duration) -> Result<Resolution> {
    tracerr!(Err::RequestError, "resolver {url} timed out after {}ms", timeout.as_millis())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::Value;

    use super::*;
    use crate::document::Document;

    #[derive(Clone, Copy)]
    enum Answer {
        Doc(&'static str),
        Empty,
        Fail(&'static str),
        Hang,
    }

    struct Canned(Answer);

    impl Resolver for Canned {
        async fn resolve(&self, _: &str, _: &Options) -> Result<Resolution> {
            match self.0 {
                Answer::Doc(id) => {
                    let mut doc = Document::new(id);
                    doc.context = Some(Value::String("https://w3id.org/did/v1".into()));
                    Ok(Resolution {
                        did_document: Some(doc),
                        ..Resolution::default()
                    })
                }
                Answer::Empty => Ok(Resolution::default()),
                Answer::Fail(msg) => Err(anyhow::anyhow!(msg).into()),
                Answer::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(anyhow::anyhow!("woke up").into())
                }
            }
        }
    }

    fn transport(answers: &[Answer]) -> impl Transport<Resolver = Canned> + '_ {
        move |url: &str| -> Result<Canned> {
            let idx: usize = url.trim_start_matches("url").parse().expect("should be a test url");
            Ok(Canned(answers[idx]))
        }
    }

    fn endpoint(n: usize, min_resolvers: usize) -> Endpoint {
        Endpoint {
            resolution_endpoints: (0..n).map(|i| format!("url{i}")).collect(),
            min_resolvers,
            ..Endpoint::default()
        }
    }

    async fn read(transport: &impl Transport, endpoint: &Endpoint) -> Result<Resolution> {
        Consensus::new(transport).read("did", endpoint, &Options::new()).await
    }

    #[tokio::test]
    async fn quorum_agrees() {
        let transport = transport(&[Answer::Doc("did"), Answer::Doc("did")]);
        let res = read(&transport, &endpoint(2, 2)).await.expect("should read");
        assert_eq!(res.document().expect("should have document").id, "did");
    }

    #[tokio::test]
    async fn single_divergent_answer_is_not_trusted() {
        let transport = transport(&[Answer::Doc("did"), Answer::Doc("did:other")]);
        let err = read(&transport, &endpoint(2, 2)).await.expect_err("should fail");
        assert!(err.is(Err::ConsensusFailure));
        assert_eq!(err.to_string(), "failed to fetch correct did from min resolvers");
    }

    #[tokio::test]
    async fn majority_wins() {
        let transport = transport(&[
            Answer::Doc("did:other"),
            Answer::Fail("boom"),
            Answer::Doc("did"),
            Answer::Doc("did"),
        ]);
        let res = read(&transport, &endpoint(4, 2)).await.expect("should read");
        assert_eq!(res.document().expect("should have document").id, "did");
    }

    #[tokio::test]
    async fn same_failure_is_propagated() {
        let transport =
            transport(&[Answer::Fail("failed to resolve"), Answer::Fail("failed to resolve")]);
        let err = read(&transport, &endpoint(2, 2)).await.expect_err("should fail");
        assert_eq!(err.to_string(), "failed to resolve");
    }

    #[tokio::test]
    async fn mixed_failures() {
        let transport =
            transport(&[Answer::Fail("one"), Answer::Fail("two"), Answer::Fail("three")]);
        let err = read(&transport, &endpoint(3, 1)).await.expect_err("should fail");
        assert!(err.is(Err::ConsensusFailure));
    }

    #[tokio::test]
    async fn answer_without_document_is_a_failure() {
        let only_empty = transport(&[Answer::Empty]);
        let err = read(&only_empty, &endpoint(1, 1)).await.expect_err("should fail");
        assert!(err.is(Err::DeserializationError));
        assert_eq!(err.to_string(), "resolver url0 returned no didDocument");

        // The empty answer uses up an attempt but does not block a quorum elsewhere.
        let quorum_elsewhere = transport(&[Answer::Empty, Answer::Doc("did"), Answer::Doc("did")]);
        let res = read(&quorum_elsewhere, &endpoint(3, 2)).await.expect("should read");
        assert_eq!(res.document().expect("should have document").id, "did");

        let short = transport(&[Answer::Empty, Answer::Doc("did")]);
        let err = read(&short, &endpoint(2, 2)).await.expect_err("should fail");
        assert!(err.is(Err::ConsensusFailure));
    }

    #[tokio::test]
    async fn slow_resolver_does_not_block() {
        let transport = transport(&[Answer::Hang, Answer::Doc("did")]);
        let consensus = Consensus::new(&transport).with_timeout(Duration::from_millis(100));

        let res = consensus
            .read("did", &endpoint(2, 1), &Options::new())
            .await
            .expect("should read");
        assert_eq!(res.document().expect("should have document").id, "did");

        let err = consensus
            .read("did", &endpoint(2, 2), &Options::new())
            .await
            .expect_err("should fail");
        assert!(err.is(Err::ConsensusFailure));
    }

    #[tokio::test]
    async fn zero_quorum_means_one() {
        let transport = transport(&[Answer::Doc("did")]);
        read(&transport, &endpoint(1, 0)).await.expect("should read");
    }

    #[tokio::test]
    async fn quorum_exceeds_endpoints() {
        let transport = transport(&[Answer::Doc("did")]);
        let err = read(&transport, &endpoint(1, 2)).await.expect_err("should fail");
        assert!(err.is(Err::InvalidConfig));
    }

    #[tokio::test]
    async fn transport_error_aborts() {
        let transport =
            |_: &str| -> Result<Canned> { Err(anyhow::anyhow!("get http vdri error").into()) };
        let err = read(&transport, &endpoint(2, 1)).await.expect_err("should fail");
        assert_eq!(err.to_string(), "get http vdri error");
    }

    #[tokio::test]
    async fn context_load_failure() {
        let transport = transport(&[Answer::Doc("did"), Answer::Doc("did")]);
        let loader =
            |_: String| async { Err::<Value, Error>(anyhow::anyhow!("not found").into()) };
        let err = Consensus::new(&transport)
            .with_loader(Some(&loader))
            .read("did", &endpoint(2, 2), &Options::new())
            .await
            .expect_err("should fail");
        assert!(err.is(Err::ContextLoadError));
        assert!(err.to_string().starts_with("loading remote context failed"));
    }

    #[tokio::test]
    async fn context_loaded_once_per_read() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let loader = move |_: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Error>(Value::Null) }
        };

        let transport = transport(&[Answer::Doc("did"), Answer::Doc("did"), Answer::Doc("did")]);
        let consensus = Consensus::new(&transport).with_loader(Some(&loader));

        consensus.read("did", &endpoint(3, 3), &Options::new()).await.expect("should read");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        consensus.read("did", &endpoint(3, 3), &Options::new()).await.expect("should read");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
