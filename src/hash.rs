//! Helper functions for canonicalizing, hashing and multi-hashing data.
//!
//! Sidetree commitments and reveal values are derived from the
//! [JSON Canonicalization Scheme (JCS)](https://identity.foundation/JCS/) form of a public key.

use base64ct::{Base64UrlUnpadded, Encoding};
use multihash::Multihash;
use olpc_cjson::CanonicalFormatter;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Err;
use crate::{tracerr, Result};

/// Multihash code for SHA2-256.
pub const SHA2_256: u64 = 0x12;

/// Serialize `data` to canonical JSON bytes.
///
/// # Errors
///
/// * Serialization error if the data cannot be serialized.
pub fn canonical(data: &impl Serialize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, CanonicalFormatter::new());
    data.serialize(&mut ser)?;
    Ok(buf)
}

/// Transforms the provided data into a base64url-encoded multihash of its canonical JSON form.
/// Used for reveal values and delta hashes.
///
/// # Errors
///
/// * Serialization error if the data cannot be serialized.
/// * `Err::UnsupportedAlgorithm` if `code` is not a supported multihash code.
pub fn hash_data(data: &impl Serialize, code: u64) -> Result<String> {
    let buf = canonical(data)?;
    let multi = multi_hash(&buf, code)?;
    Ok(Base64UrlUnpadded::encode_string(&multi))
}

/// Hash the public key by hashing the canonical JSON representation and then multi-hashing the
/// hash.
///
/// # Errors
///
/// * Serialization error if the data cannot be serialized.
/// * `Err::UnsupportedAlgorithm` if `code` is not a supported multihash code.
pub fn hash_commitment(data: &impl Serialize, code: u64) -> Result<String> {
    let buf = canonical(data)?;
    let hashed = digest(&buf, code)?;
    let multi = multi_hash(&hashed, code)?;
    Ok(Base64UrlUnpadded::encode_string(&multi))
}

/// Check the provided string is a base64url-encoded SHA2-256 multihash.
///
/// # Errors
///
/// * `Err::InvalidHash` if the string does not decode to a SHA2-256 multihash.
pub fn check_hash(hash: &str) -> Result<()> {
    let Ok(decoded) = Base64UrlUnpadded::decode_vec(hash) else {
        tracerr!(Err::InvalidHash, "{hash} is not base64url encoded");
    };
    let Ok(wrapped) = Multihash::<64>::from_bytes(&decoded) else {
        tracerr!(Err::InvalidHash, "{hash} is not a multihash");
    };
    if wrapped.code() != SHA2_256 {
        tracerr!(Err::InvalidHash, "invalid hash code: {}", wrapped.code());
    }
    Ok(())
}

fn digest(data: &[u8], code: u64) -> Result<Vec<u8>> {
    match code {
        SHA2_256 => Ok(Sha256::digest(data).to_vec()),
        _ => tracerr!(Err::UnsupportedAlgorithm, "multihash algorithm {code} not supported"),
    }
}

fn multi_hash(data: &[u8], code: u64) -> Result<Vec<u8>> {
    let hashed = digest(data, code)?;
    let mhash = Multihash::<64>::wrap(code, &hashed)?;
    Ok(mhash.to_bytes())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::keys::Jwk;

    #[test]
    fn canonical_sorts_keys() {
        let bytes =
            canonical(&json!({"b": 1, "a": {"d": true, "c": "x"}})).expect("should serialize");
        assert_eq!(bytes, br#"{"a":{"c":"x","d":true},"b":1}"#);
    }

    #[test]
    fn multi_hash_ok() {
        let data = b"Hello, world!";

        let mhash = multi_hash(data, SHA2_256).expect("should hash");
        let wrapped = Multihash::<64>::from_bytes(&mhash).expect("should unwrap");

        assert_eq!(wrapped.code(), SHA2_256);
        assert_eq!(wrapped.digest(), &Sha256::digest(data)[..]);
    }

    #[test]
    fn commitment_is_hash_of_reveal() {
        let key = Jwk::ed25519(&[7u8; 32]).expect("should build key");

        let reveal = hash_data(&key, SHA2_256).expect("should hash");
        let commitment = hash_commitment(&key, SHA2_256).expect("should hash");
        check_hash(&reveal).expect("reveal value should be a multihash");
        check_hash(&commitment).expect("commitment should be a multihash");

        // commitment = multihash(H(JCS(key))); reveal = multihash(JCS(key))
        let reveal_bytes = Base64UrlUnpadded::decode_vec(&reveal).expect("should decode");
        let inner = Multihash::<64>::from_bytes(&reveal_bytes).expect("should unwrap");
        let expected = multi_hash(inner.digest(), SHA2_256).expect("should hash");
        assert_eq!(commitment, Base64UrlUnpadded::encode_string(&expected));
    }

    #[test]
    fn unsupported_code() {
        let err = hash_data(&json!({}), 0x13).expect_err("should fail");
        assert!(err.is(Err::UnsupportedAlgorithm));
        assert_eq!(err.to_string(), "multihash algorithm 19 not supported");
    }

    #[test]
    fn check_hash_rejects_garbage() {
        assert!(check_hash("123").is_err());
        assert!(check_hash("EiB1u5HnTYKVHrmemOpZtrGlc6BoaWWHwNAd-k7CrLKHOg").is_ok());
    }
}
