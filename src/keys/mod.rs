//! Public key material, key custody and signing.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};

pub mod retriever;
pub mod signer;

use crate::error::Err;
use crate::{tracerr, Result};

/// Simplified JSON Web Key (JWK) public key structure.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Jwk {
    /// Key type.
    pub kty: String,
    /// Cryptographic curve type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// X coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Y coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl Jwk {
    /// Wrap a raw Ed25519 public key in an `OKP` JWK.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidKey` - The key is not 32 bytes long.
    pub fn ed25519(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            tracerr!(Err::InvalidKey, "ed25519 public key must be 32 bytes, got {}", bytes.len());
        }
        Ok(Self {
            kty: "OKP".to_string(),
            crv: Some("Ed25519".to_string()),
            x: Some(Base64UrlUnpadded::encode_string(bytes)),
            y: None,
        })
    }
}

/// Types of key signature algorithm supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// `EdDSA` using the Ed25519 curve.
    EdDsa,
}

/// Key signature type display label (the JOSE `alg` value).
impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::EdDsa => write!(f, "EdDSA"),
        }
    }
}
