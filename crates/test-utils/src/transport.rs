use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vercre_didorb::{Options, Resolution, Resolver, Result, Transport};

#[derive(Clone, Debug)]
enum Answer {
    Resolution(Resolution),
    Failure(String),
}

/// Resolver transport answering from memory. Each URL can be given its own answer; URLs without
/// one get the default.
#[derive(Clone, Debug)]
pub struct StaticTransport {
    default: Answer,
    answers: HashMap<String, Answer>,
    calls: Arc<AtomicUsize>,
}

impl StaticTransport {
    /// Every resolver returns `resolution`.
    #[must_use]
    pub fn new(resolution: Resolution) -> Self {
        Self {
            default: Answer::Resolution(resolution),
            answers: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every resolver fails with `msg`.
    #[must_use]
    pub fn failing(msg: &str) -> Self {
        Self {
            default: Answer::Failure(msg.to_string()),
            ..Self::new(Resolution::default())
        }
    }

    /// The resolver at `url` returns `resolution`.
    #[must_use]
    pub fn with_resolution(mut self, url: &str, resolution: Resolution) -> Self {
        self.answers.insert(url.to_string(), Answer::Resolution(resolution));
        self
    }

    /// The resolver at `url` fails with `msg`.
    #[must_use]
    pub fn with_failure(mut self, url: &str, msg: &str) -> Self {
        self.answers.insert(url.to_string(), Answer::Failure(msg.to_string()));
        self
    }

    /// Number of resolve calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for StaticTransport {
    type Resolver = StaticResolver;

    fn resolver(&self, url: &str) -> Result<StaticResolver> {
        if url.is_empty() {
            return Err(anyhow::anyhow!("empty url").into());
        }
        Ok(StaticResolver {
            answer: self.answers.get(url).unwrap_or(&self.default).clone(),
            calls: self.calls.clone(),
        })
    }
}

/// Resolver handle produced by [`StaticTransport`].
#[derive(Clone, Debug)]
pub struct StaticResolver {
    answer: Answer,
    calls: Arc<AtomicUsize>,
}

impl Resolver for StaticResolver {
    async fn resolve(&self, _did: &str, _opts: &Options) -> Result<Resolution> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Answer::Resolution(resolution) => Ok(resolution.clone()),
            Answer::Failure(msg) => Err(anyhow::anyhow!("{msg}").into()),
        }
    }
}
