//! # Errors
//!
//! Error types for the registry. Every error carries a machine-readable code ([`Err`]) and a
//! human-readable message. The message is always the most specific description of what went
//! wrong so callers can match on it.

use std::fmt::Display;

use thiserror::Error;

/// Log an error and return early with the given code and message.
///
/// # Example
/// ```
/// use vercre_didorb::error::Err;
/// use vercre_didorb::{tracerr, Result};
///
/// fn with_msg() -> Result<()> {
///     tracerr!(Err::InvalidInput, "message: {}", "some message")
/// }
///
/// fn no_msg() -> Result<()> {
///     tracerr!(Err::InvalidInput)
/// }
/// ```
#[macro_export]
macro_rules! tracerr {
    // with context
    ($code:expr, $($msg:tt)*) => {
        {
        use $crate::error::Context as _;
        tracing::error!($($msg)*);
        return Err($code).context(format!($($msg)*));
        }
    };
    // no context
    ($code:expr) => {
        {
        tracing::error!("{}", $code);
        return Err($code.into());
        }
    }
}

/// Public error type.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] anyhow::Error);

impl Error {
    /// Transfer the error to `OAuth2` compatible format.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.0.root_cause().to_string(),
            "error_description": self.to_string(),
        })
    }

    /// Returns true if the error was raised with the code `err`.
    #[must_use]
    pub fn is(&self, err: Err) -> bool {
        self.0.downcast_ref::<Err>().is_some_and(|e| e == &err)
    }
}

/// Typed error codes.
#[derive(Clone, Copy, Error, Debug, PartialEq, Eq)]
pub enum Err {
    /// Caller input is malformed or incomplete. (See context for details)
    #[error("invalid_input")]
    InvalidInput,

    /// An operation option is missing or holds a value of the wrong type.
    #[error("invalid_option")]
    InvalidOption,

    /// Endpoint or Sidetree configuration could not be used.
    #[error("invalid_config")]
    InvalidConfig,

    /// Hash is not a valid multihash.
    #[error("invalid_hash")]
    InvalidHash,

    /// The key is malformed or not usable for the requested operation.
    #[error("invalid_key")]
    InvalidKey,

    /// Request failed. Used when a downstream API cannot be reached or does not answer in time.
    #[error("request_error")]
    RequestError,

    /// A downstream API answered with an error status.
    #[error("api_error")]
    ApiError,

    /// An error occurred trying to deserialize data.
    #[error("deserialization_error")]
    DeserializationError,

    /// An error occurred trying to serialize data.
    #[error("serialization_error")]
    SerializationError,

    /// No DID document could be resolved for the requested DID.
    #[error("not_found")]
    NotFound,

    /// Not enough resolvers agreed on the same document.
    #[error("consensus_failure")]
    ConsensusFailure,

    /// A JSON-LD context referenced by a document could not be loaded.
    #[error("context_load_error")]
    ContextLoadError,

    /// The requested hash or signature algorithm is not supported.
    #[error("unsupported_algorithm")]
    UnsupportedAlgorithm,

    /// Failure to sign a message.
    #[error("signing_error")]
    SigningError,

    /// Feature is not supported.
    #[error("not_supported")]
    NotSupported,
}

/// Context is used to decorate errors with useful context information.
pub trait Context<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Adds context to the error.
    ///
    /// # Errors
    ///
    /// * Original error with context appended.
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(e) => Err(Error(anyhow::Error::from(e).context(context))),
        }
    }
}

impl From<Err> for Error {
    fn from(error: Err) -> Self {
        Self(error.into())
    }
}

impl From<base64ct::Error> for Error {
    fn from(err: base64ct::Error) -> Self {
        Self(err.into())
    }
}

impl From<ed25519_dalek::SignatureError> for Error {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        Self(err.into())
    }
}

impl From<multibase::Error> for Error {
    fn from(err: multibase::Error) -> Self {
        Self(err.into())
    }
}

impl From<multihash::Error> for Error {
    fn from(err: multihash::Error) -> Self {
        Self(err.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self(err.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self(err.into())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self(err.into())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self(err.into())
    }
}
