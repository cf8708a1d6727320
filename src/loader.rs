//! JSON-LD context loading.
//!
//! Resolved documents may reference remote JSON-LD contexts. When a loader is configured the
//! consensus reader loads every referenced context before canonicalizing a document, so a
//! document whose contexts cannot be loaded is never returned.

use std::future::Future;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::Result;

/// Loads remote JSON-LD documents (typically contexts) by URL.
///
/// The registry holds its loader as a trait object, so loading returns a boxed future.
pub trait DocumentLoader: Send + Sync {
    /// Load the document at `url`.
    ///
    /// # Errors
    ///
    /// Implementations fail when the document cannot be fetched or parsed.
    fn load_document<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value>>;
}

impl<F, Fut> DocumentLoader for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value>> + Send + 'static,
{
    fn load_document<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value>> {
        Box::pin(self(url.to_string()))
    }
}
