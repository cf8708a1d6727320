//! Message signer trait and an Ed25519 implementation.

use std::future::Future;

use base64ct::{Base64UrlUnpadded, Encoding};
use ed25519_dalek::{Signer as _, SigningKey};
use serde::Serialize;
use serde_json::json;

use crate::keys::{Algorithm, Jwk};
use crate::Result;

/// Message signer. The implementer holds (or has access to) the private key.
pub trait Signer: Send + Sync {
    /// Algorithm used by [`Signer::try_sign`].
    fn algorithm(&self) -> Algorithm;

    /// The public key matching the signing key.
    fn public_key(&self) -> impl Future<Output = Result<Jwk>> + Send;

    /// Sign the provided message bytes, returning the raw signature.
    fn try_sign(&self, msg: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Sign `payload` as a compact JWS: `base64url(header).base64url(payload).base64url(sig)`.
///
/// # Errors
///
/// * Serialization error if the payload cannot be serialized.
/// * Any error returned by the signer.
pub async fn sign_compact(signer: &impl Signer, payload: &impl Serialize) -> Result<String> {
    let hdr = serde_json::to_vec(&json!({"alg": signer.algorithm().to_string()}))?;
    let body = serde_json::to_vec(payload)?;

    let signing_input = format!(
        "{}.{}",
        Base64UrlUnpadded::encode_string(&hdr),
        Base64UrlUnpadded::encode_string(&body)
    );
    let sig = signer.try_sign(signing_input.as_bytes()).await?;

    Ok(format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(&sig)))
}

/// Signer backed by an in-memory Ed25519 key.
#[derive(Clone, Debug)]
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    /// Create a signer from a 32-byte secret key.
    #[must_use]
    pub fn from_bytes(secret: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(secret),
        }
    }

    /// Raw bytes of the public key.
    #[must_use]
    pub fn verifying_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }
}

impl From<SigningKey> for Ed25519Signer {
    fn from(key: SigningKey) -> Self {
        Self { key }
    }
}

impl Signer for Ed25519Signer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::EdDsa
    }

    async fn public_key(&self) -> Result<Jwk> {
        Jwk::ed25519(&self.verifying_key())
    }

    async fn try_sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(msg).to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    use super::*;

    #[tokio::test]
    async fn compact_jws_verifies() {
        let signer = Ed25519Signer::from_bytes(&[9u8; 32]);
        let jws = sign_compact(&signer, &json!({"deltaHash": "abc"})).await.expect("should sign");

        let parts: Vec<&str> = jws.split('.').collect();
        assert_eq!(parts.len(), 3);

        let hdr = Base64UrlUnpadded::decode_vec(parts[0]).expect("should decode");
        assert_eq!(hdr, br#"{"alg":"EdDSA"}"#);

        let sig = Base64UrlUnpadded::decode_vec(parts[2]).expect("should decode");
        let sig = Signature::from_slice(&sig).expect("should parse signature");
        let vk = VerifyingKey::from_bytes(&signer.verifying_key()).expect("should parse key");
        vk.verify(format!("{}.{}", parts[0], parts[1]).as_bytes(), &sig).expect("should verify");
    }

    #[tokio::test]
    async fn public_key_is_okp() {
        let signer = Ed25519Signer::from_bytes(&[9u8; 32]);
        let jwk = signer.public_key().await.expect("should get key");
        assert_eq!(jwk.kty, "OKP");
        assert_eq!(jwk.crv.as_deref(), Some("Ed25519"));
    }
}
