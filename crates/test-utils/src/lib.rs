//! Collaborator doubles and fixtures shared by the registry's integration tests.

mod client;
mod config;
mod fixtures;
mod keys;
mod transport;

pub use crate::client::{MockClient, Submitted};
pub use crate::config::MockConfig;
pub use crate::fixtures::{doc_resolution, resolution, serve, serve_router, DOC_RESOLUTION};
pub use crate::keys::MockKeys;
pub use crate::transport::{StaticResolver, StaticTransport};
