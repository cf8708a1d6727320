//! # Sidetree `did:orb` Registry
//!
//! A verifiable data registry for `did:orb` DIDs. Reads are only trusted once a quorum of
//! independent resolvers return the same resolution. Writes (create, update, recover and
//! deactivate) are validated and turned into fully specified Sidetree operations, with
//! commitments derived from keys supplied by a caller-provided [`KeyRetriever`].
//!
//! Key custody, endpoint configuration, operation anchoring and resolver transport are
//! collaborators injected into [`Vdr`]. HTTP implementations of the configuration service, the
//! protocol client and the resolver transport are provided; see [`Vdr::http`].
//!
//! # Example
//!
//! ```rust,ignore
//! use vercre_didorb::{HttpConfig, OptionKey, Options, Vdr};
//!
//! let vdr = Vdr::http(keys, &HttpConfig::default())?.with_domain("orb.domain1.com");
//! let opts = Options::new().with(
//!     OptionKey::ResolutionEndpoints,
//!     ["https://orb.domain1.com/sidetree/v1/identifiers"],
//! );
//! let resolution = vdr.read("did:orb:uAAA:EiDahaOGH", &opts).await?;
//! ```

pub mod client;
pub mod config;
pub mod consensus;
pub mod core;
pub mod did;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod hash;
pub mod keys;
pub mod loader;
pub mod operation;
pub mod options;
pub mod resolver;
mod vdr;

pub use client::{HttpClient, SidetreeClient};
pub use config::{ConfigService, Endpoint, HttpConfig, SidetreeConfig, WellKnownConfig};
pub use did::{Did, Locator};
pub use document::{Document, Resolution, Service, Verification, VerificationMethod};
pub use error::Error;
pub use keys::retriever::{KeyRetriever, OperationType};
pub use keys::signer::{Ed25519Signer, Signer};
pub use keys::Jwk;
pub use loader::DocumentLoader;
pub use options::{OptionKey, OptionValue, Options};
pub use resolver::{HttpTransport, Resolver, Transport};
pub use vdr::Vdr;

/// Result type for the registry.
pub type Result<T, E = Error> = std::result::Result<T, E>;
