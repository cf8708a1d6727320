//! # Sidetree Identifiers
//!
//! A `did:orb` identifier carries an addressing prefix between the method name and the unique
//! suffix. The prefix says where the DID's operations can be found:
//!
//! - `did:orb:uAAA:<suffix>` has not been anchored yet.
//! - `did:orb:<cid>:<suffix>` is anchored in the content-addressable object `<cid>`.
//! - `did:orb:ipfs:<cid>:<suffix>` is anchored in an object held in IPFS.
//! - `did:orb:webcas:<domain>:<cid>:<suffix>` is anchored in an object served by `<domain>`.
//! - `did:orb:https:<domain>:<..>:<suffix>` names the domain to resolve against.
//! - `did:orb:hl:<hashlink>:<suffix>` is anchored in a hashlink.
//!
//! See: <https://trustbloc.github.io/did-method-orb/>

use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Err;
use crate::{tracerr, Error, Result};

/// The DID method this registry handles.
pub const DID_METHOD: &str = "orb";

/// Locator prefix of a DID that has not been anchored.
pub const UNPUBLISHED: &str = "uAAA";

static DID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^did:(?<method>[a-z0-9]+):(?<segments>(?:[^:]+:)*)(?<suffix>[^:]+)$")
        .expect("should compile")
});

/// A parsed DID. Identifiers are immutable once parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Did {
    /// DID method name (`orb` for identifiers this registry manages).
    pub method: String,

    /// Where the DID's operations are anchored, when the identifier says.
    pub locator: Option<Locator>,

    /// Unique suffix of the DID.
    pub suffix: String,

    raw: String,
}

/// Addressing scheme encoded between the method name and the suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    /// `uAAA`
    Unpublished,

    /// `ipfs:<cid>`
    Ipfs(String),

    /// `webcas:<domain>:<cid>`
    WebCas {
        /// Domain serving the content-addressable store.
        domain: String,
        /// Content identifier of the anchor object.
        cid: String,
    },

    /// `https:<domain>:..`
    Https {
        /// Domain to resolve against.
        domain: String,
    },

    /// `hl:<hashlink>`
    Hashlink(String),

    /// Bare content identifier of the anchor object.
    Cid(String),
}

impl FromStr for Did {
    type Err = Error;

    fn from_str(did: &str) -> Result<Self> {
        let Some(caps) = DID_REGEX.captures(did) else {
            tracerr!(Err::InvalidInput, "{did} is not a valid did");
        };

        let segments: Vec<&str> =
            caps["segments"].split(':').filter(|s| !s.is_empty()).collect();
        let locator = match segments.as_slice() {
            [] => None,
            [UNPUBLISHED, ..] => Some(Locator::Unpublished),
            ["ipfs", cid, ..] => Some(Locator::Ipfs((*cid).to_string())),
            ["webcas", domain, cid, ..] => Some(Locator::WebCas {
                domain: (*domain).to_string(),
                cid: (*cid).to_string(),
            }),
            ["https", domain, ..] => Some(Locator::Https {
                domain: (*domain).to_string(),
            }),
            ["hl", link, ..] => Some(Locator::Hashlink((*link).to_string())),
            ["ipfs" | "webcas" | "https" | "hl", ..] => {
                tracerr!(Err::InvalidInput, "{did} has an incomplete locator");
            }
            [cid, ..] => Some(Locator::Cid((*cid).to_string())),
        };

        Ok(Self {
            method: caps["method"].to_string(),
            locator,
            suffix: caps["suffix"].to_string(),
            raw: did.to_string(),
        })
    }
}

impl Did {
    /// The domain embedded in the identifier (`https` and `webcas` locators).
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        match &self.locator {
            Some(Locator::Https { domain } | Locator::WebCas { domain, .. }) => Some(domain),
            _ => None,
        }
    }

    /// True when the identifier references an anchor.
    #[must_use]
    pub fn is_anchored(&self) -> bool {
        !matches!(self.locator, None | Some(Locator::Unpublished))
    }

    /// True for identifiers of the `orb` method.
    #[must_use]
    pub fn is_orb(&self) -> bool {
        self.method == DID_METHOD
    }
}

impl Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_locators() {
        let cases = [
            ("did:orb:uAAA:EiDaha", Some(Locator::Unpublished)),
            ("did:orb:ipfs:bafkrei:EiDaha", Some(Locator::Ipfs("bafkrei".into()))),
            (
                "did:orb:webcas:example.com:bafkrei:EiDaha",
                Some(Locator::WebCas {
                    domain: "example.com".into(),
                    cid: "bafkrei".into(),
                }),
            ),
            (
                "did:orb:https:example.com:uAAA:EiDaha",
                Some(Locator::Https {
                    domain: "example.com".into(),
                }),
            ),
            ("did:orb:hl:uEiD:EiDaha", Some(Locator::Hashlink("uEiD".into()))),
            ("did:orb:bafkrei:EiDaha", Some(Locator::Cid("bafkrei".into()))),
            ("did:orb:EiDaha", None),
        ];

        for (input, locator) in cases {
            let did: Did = input.parse().expect("should parse");
            assert_eq!(did.locator, locator, "{input}");
            assert_eq!(did.suffix, "EiDaha");
            assert_eq!(did.to_string(), input);
        }
    }

    #[test]
    fn domain_and_anchor() {
        let did: Did = "did:orb:webcas:example.com:bafkrei:EiDaha".parse().expect("should parse");
        assert_eq!(did.domain(), Some("example.com"));
        assert!(did.is_anchored());
        assert!(did.is_orb());

        let did: Did = "did:orb:uAAA:EiDaha".parse().expect("should parse");
        assert_eq!(did.domain(), None);
        assert!(!did.is_anchored());

        let did: Did = "did:ex:domain:1234".parse().expect("should parse");
        assert!(!did.is_orb());
    }

    #[test]
    fn invalid() {
        assert!("did".parse::<Did>().is_err());
        assert!("did:orb:".parse::<Did>().is_err());

        let err = "did:orb:webcas:example.com:EiDaha".parse::<Did>().expect_err("should fail");
        assert!(err.to_string().contains("incomplete locator"));
    }
}
