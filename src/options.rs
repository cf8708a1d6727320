//! # Operation Options
//!
//! Callers tune each registry call with an open-ended bag of options. Recognized keys have a
//! fixed value type: a recognized key holding a value of the wrong type is an input error,
//! never silently ignored. Unrecognized keys are carried along and ignored.

use std::collections::HashMap;
use std::fmt::Display;

use crate::error::Err;
use crate::keys::Jwk;
use crate::{tracerr, Result};

/// Recognized option keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum OptionKey {
    /// Resolver URLs to read from (list of strings).
    ResolutionEndpoints,
    /// Operation (anchor) URLs to write to (list of strings).
    OperationEndpoints,
    /// Public key whose commitment authorizes the next update (bytes or JWK).
    UpdatePublicKey,
    /// Public key whose commitment authorizes the next recovery (bytes or JWK).
    RecoveryPublicKey,
    /// Anchor origin to record for the DID (string).
    AnchorOrigin,
    /// Turn an update into a recovery (bool).
    Recover,
    /// Resolve a specific version of the document (string).
    VersionId,
    /// Resolve the document as it was at a point in time (string).
    VersionTime,
    /// Any other key. Carried along, never interpreted.
    Other(String),
}

impl Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResolutionEndpoints => write!(f, "resolutionEndpointsOpt"),
            Self::OperationEndpoints => write!(f, "operationEndpointsOpt"),
            Self::UpdatePublicKey => write!(f, "updatePublicKey"),
            Self::RecoveryPublicKey => write!(f, "recoveryPublicKey"),
            Self::AnchorOrigin => write!(f, "anchorOrigin"),
            Self::Recover => write!(f, "recover"),
            Self::VersionId => write!(f, "versionId"),
            Self::VersionTime => write!(f, "versionTime"),
            Self::Other(key) => write!(f, "{key}"),
        }
    }
}

/// An option value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    /// Flag.
    Bool(bool),
    /// Single string.
    String(String),
    /// List of strings.
    Strings(Vec<String>),
    /// Raw bytes, such as an Ed25519 public key.
    Bytes(Vec<u8>),
    /// Public key as a JWK.
    Jwk(Jwk),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        Self::Strings(value)
    }
}

impl From<&[&str]> for OptionValue {
    fn from(value: &[&str]) -> Self {
        Self::Strings(value.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OptionValue {
    fn from(value: [&str; N]) -> Self {
        Self::Strings(value.iter().map(ToString::to_string).collect())
    }
}

impl From<Vec<u8>> for OptionValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for OptionValue {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Jwk> for OptionValue {
    fn from(value: Jwk) -> Self {
        Self::Jwk(value)
    }
}

/// Options for a single registry call.
///
/// ```
/// use vercre_didorb::options::{OptionKey, Options};
///
/// let opts = Options::new()
///     .with(OptionKey::ResolutionEndpoints, ["https://orb.example.com/sidetree/v1/identifiers"])
///     .with(OptionKey::AnchorOrigin, "https://orb.example.com");
/// assert_eq!(opts.string(&OptionKey::AnchorOrigin).unwrap(), Some("https://orb.example.com"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Options(HashMap<OptionKey, OptionValue>);

impl Options {
    /// An empty option bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set option `key`, replacing any previous value.
    #[must_use]
    pub fn with(mut self, key: OptionKey, value: impl Into<OptionValue>) -> Self {
        self.0.insert(key, value.into());
        self
    }

    /// Set option `key` in place.
    pub fn set(&mut self, key: OptionKey, value: impl Into<OptionValue>) {
        self.0.insert(key, value.into());
    }

    /// The raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &OptionKey) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// A list-of-strings option.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` if the value is not a list of strings.
    pub fn strings(&self, key: &OptionKey) -> Result<Option<&[String]>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(OptionValue::Strings(values)) => Ok(Some(values)),
            Some(_) => tracerr!(Err::InvalidOption, "{key} not array of string"),
        }
    }

    /// A string option.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` if the value is not a string.
    pub fn string(&self, key: &OptionKey) -> Result<Option<&str>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(OptionValue::String(value)) => Ok(Some(value)),
            Some(_) => tracerr!(Err::InvalidOption, "{key} is not string"),
        }
    }

    /// A flag. Absent flags are `false`.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` if the value is not a bool.
    pub fn flag(&self, key: &OptionKey) -> Result<bool> {
        match self.0.get(key) {
            None => Ok(false),
            Some(OptionValue::Bool(value)) => Ok(*value),
            Some(_) => tracerr!(Err::InvalidOption, "{key} is not bool"),
        }
    }

    /// A public key option, given either as raw Ed25519 bytes or as a JWK. Empty bytes count as
    /// absent.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` if the value is neither bytes nor a JWK.
    /// * `Err::InvalidKey` if the bytes are not an Ed25519 public key.
    pub fn public_key(&self, key: &OptionKey) -> Result<Option<Jwk>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(OptionValue::Bytes(bytes)) if bytes.is_empty() => Ok(None),
            Some(OptionValue::Bytes(bytes)) => Ok(Some(Jwk::ed25519(bytes)?)),
            Some(OptionValue::Jwk(jwk)) => Ok(Some(jwk.clone())),
            Some(_) => tracerr!(Err::InvalidOption, "{key} is not a public key"),
        }
    }

    /// A string option that must be present and non-empty.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` if the value is not a string, or is missing or empty.
    pub fn required_string(&self, key: &OptionKey) -> Result<&str> {
        match self.string(key)? {
            Some(value) if !value.is_empty() => Ok(value),
            _ => tracerr!(Err::InvalidOption, "{key} opt is empty"),
        }
    }

    /// A public key option that must be present.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidOption` if the value is not a key, or is missing or empty.
    pub fn required_public_key(&self, key: &OptionKey) -> Result<Jwk> {
        match self.public_key(key)? {
            Some(jwk) => Ok(jwk),
            None => tracerr!(Err::InvalidOption, "{key} opt is empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_type() {
        let opts = Options::new()
            .with(OptionKey::ResolutionEndpoints, "url")
            .with(OptionKey::AnchorOrigin, true)
            .with(OptionKey::Recover, "yes")
            .with(OptionKey::UpdatePublicKey, ["a"]);

        let err = opts.strings(&OptionKey::ResolutionEndpoints).expect_err("should fail");
        assert!(err.is(Err::InvalidOption));
        assert_eq!(err.to_string(), "resolutionEndpointsOpt not array of string");

        let err = opts.required_string(&OptionKey::AnchorOrigin).expect_err("should fail");
        assert_eq!(err.to_string(), "anchorOrigin is not string");

        let err = opts.flag(&OptionKey::Recover).expect_err("should fail");
        assert_eq!(err.to_string(), "recover is not bool");

        let err = opts.public_key(&OptionKey::UpdatePublicKey).expect_err("should fail");
        assert_eq!(err.to_string(), "updatePublicKey is not a public key");
    }

    #[test]
    fn missing_values() {
        let opts = Options::new()
            .with(OptionKey::UpdatePublicKey, Vec::<u8>::new())
            .with(OptionKey::AnchorOrigin, "");

        let err = opts.required_public_key(&OptionKey::UpdatePublicKey).expect_err("should fail");
        assert_eq!(err.to_string(), "updatePublicKey opt is empty");

        let err =
            opts.required_public_key(&OptionKey::RecoveryPublicKey).expect_err("should fail");
        assert_eq!(err.to_string(), "recoveryPublicKey opt is empty");

        let err = opts.required_string(&OptionKey::AnchorOrigin).expect_err("should fail");
        assert_eq!(err.to_string(), "anchorOrigin opt is empty");

        assert!(!opts.flag(&OptionKey::Recover).expect("should be ok"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let opts = Options::new()
            .with(OptionKey::Other("x-custom".into()), 42u8.to_string())
            .with(OptionKey::UpdatePublicKey, vec![3u8; 32]);

        let jwk = opts.required_public_key(&OptionKey::UpdatePublicKey).expect("should get key");
        assert_eq!(jwk.crv.as_deref(), Some("Ed25519"));
        assert!(opts.strings(&OptionKey::ResolutionEndpoints).expect("should be ok").is_none());
    }
}
