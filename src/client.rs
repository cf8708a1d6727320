//! # Sidetree Protocol Client
//!
//! Renders validated operation requests into Sidetree operations and submits them to a node's
//! operations endpoint. The client never decides *where* to submit: the orchestrator resolves the
//! operation endpoints and passes them in with each request.
//!
//! See: <https://identity.foundation/sidetree/spec/#did-operations>

use std::future::Future;

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};

use crate::config::HttpConfig;
use crate::did::Did;
use crate::document::{Resolution, Service};
use crate::error::Err;
use crate::hash::hash_data;
use crate::keys::retriever::OperationType;
use crate::keys::signer::{sign_compact, Signer};
use crate::keys::Jwk;
use crate::operation::{
    CreateRequest, DeactivateRequest, PublicKeyEntry, RecoverRequest, UpdateRequest,
};
use crate::{tracerr, Result};

/// Anchors DID operations.
pub trait SidetreeClient: Send + Sync {
    /// Anchor a create operation, returning the resolution of the new DID.
    fn create_did(&self, req: CreateRequest) -> impl Future<Output = Result<Resolution>> + Send;

    /// Anchor an update of `did`.
    fn update_did<S: Signer>(
        &self, did: &str, req: UpdateRequest<S>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Anchor a recovery of `did`.
    fn recover_did<S: Signer>(
        &self, did: &str, req: RecoverRequest<S>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Anchor a deactivation of `did`.
    fn deactivate_did<S: Signer>(
        &self, did: &str, req: DeactivateRequest<S>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// A Sidetree operation as posted to an operations endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// The type of DID operation.
    #[serde(rename = "type")]
    pub type_: OperationType,

    /// Create only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix_data: Option<SuffixData>,

    /// Unique suffix of the DID being operated on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_suffix: Option<String>,

    /// Hash of the key authorizing the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_value: Option<String>,

    /// Document changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,

    /// Compact JWS over the operation's signed data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_data: Option<String>,
}

/// Suffix data of a create operation. The DID suffix is the hash of this structure.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuffixData {
    /// Hash of the operation's delta.
    pub delta_hash: String,

    /// Commitment to the first recovery key.
    pub recovery_commitment: String,

    /// Anchor origin of the DID.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub anchor_origin: String,
}

/// Document changes carried by create, update and recover operations.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    /// Commitment to the next update key.
    pub update_commitment: String,

    /// Changes to apply, in order.
    pub patches: Vec<Patch>,
}

/// A single document change.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Patch {
    /// Replace the whole document.
    Replace {
        /// The new document content.
        document: PatchDocument,
    },

    /// Add (or overwrite) public keys.
    AddPublicKeys {
        /// Keys to add.
        public_keys: Vec<PublicKeyEntry>,
    },

    /// Remove public keys by id.
    RemovePublicKeys {
        /// Ids of the keys to remove.
        ids: Vec<String>,
    },

    /// Add (or overwrite) services.
    AddServices {
        /// Services to add.
        services: Vec<Service>,
    },

    /// Remove services by id.
    RemoveServices {
        /// Ids of the services to remove.
        ids: Vec<String>,
    },
}

/// Document content of a replace patch.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDocument {
    /// Public keys of the document.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub public_keys: Vec<PublicKeyEntry>,

    /// Services of the document.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub services: Vec<Service>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateSignedData {
    update_key: Jwk,
    delta_hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecoverSignedData {
    recovery_commitment: String,
    recovery_key: Jwk,
    delta_hash: String,
    anchor_origin: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeactivateSignedData {
    did_suffix: String,
    recovery_key: Jwk,
}

impl Operation {
    /// Render a create operation.
    ///
    /// # Errors
    ///
    /// * `Err::UnsupportedAlgorithm` if the request's multihash code is not supported.
    pub fn create(req: &CreateRequest) -> Result<Self> {
        let delta = Delta {
            update_commitment: req.update_commitment.clone(),
            patches: vec![Patch::Replace {
                document: PatchDocument {
                    public_keys: req.public_keys.clone(),
                    services: req.services.clone(),
                },
            }],
        };

        Ok(Self {
            type_: OperationType::Create,
            suffix_data: Some(SuffixData {
                delta_hash: hash_data(&delta, req.multihash_code)?,
                recovery_commitment: req.recovery_commitment.clone(),
                anchor_origin: req.anchor_origin.clone(),
            }),
            delta: Some(delta),
            ..Self::default()
        })
    }

    /// Render an update of `did`, signed with the request's update signer.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidInput` if `did` is not a valid DID.
    /// * Any error returned by the signer.
    pub async fn update<S: Signer>(did: &str, req: &UpdateRequest<S>) -> Result<Self> {
        let suffix = did.parse::<Did>()?.suffix;

        let mut patches = vec![];
        if !req.remove_public_keys.is_empty() {
            patches.push(Patch::RemovePublicKeys {
                ids: req.remove_public_keys.clone(),
            });
        }
        if !req.add_public_keys.is_empty() {
            patches.push(Patch::AddPublicKeys {
                public_keys: req.add_public_keys.clone(),
            });
        }
        if !req.remove_services.is_empty() {
            patches.push(Patch::RemoveServices {
                ids: req.remove_services.clone(),
            });
        }
        if !req.add_services.is_empty() {
            patches.push(Patch::AddServices {
                services: req.add_services.clone(),
            });
        }
        let delta = Delta {
            update_commitment: req.update_commitment.clone(),
            patches,
        };

        let update_key = req.signer.public_key().await?;
        let data = UpdateSignedData {
            delta_hash: hash_data(&delta, req.multihash_code)?,
            update_key: update_key.clone(),
        };

        Ok(Self {
            type_: OperationType::Update,
            did_suffix: Some(suffix),
            reveal_value: Some(hash_data(&update_key, req.multihash_code)?),
            delta: Some(delta),
            signed_data: Some(sign_compact(&req.signer, &data).await?),
            ..Self::default()
        })
    }

    /// Render a recovery of `did`, signed with the request's recovery signer.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidInput` if `did` is not a valid DID.
    /// * Any error returned by the signer.
    pub async fn recover<S: Signer>(did: &str, req: &RecoverRequest<S>) -> Result<Self> {
        let suffix = did.parse::<Did>()?.suffix;

        let delta = Delta {
            update_commitment: req.update_commitment.clone(),
            patches: vec![Patch::Replace {
                document: PatchDocument {
                    public_keys: req.public_keys.clone(),
                    services: req.services.clone(),
                },
            }],
        };

        let recovery_key = req.signer.public_key().await?;
        let data = RecoverSignedData {
            recovery_commitment: req.recovery_commitment.clone(),
            recovery_key: recovery_key.clone(),
            delta_hash: hash_data(&delta, req.multihash_code)?,
            anchor_origin: req.anchor_origin.clone(),
        };

        Ok(Self {
            type_: OperationType::Recover,
            did_suffix: Some(suffix),
            reveal_value: Some(hash_data(&recovery_key, req.multihash_code)?),
            delta: Some(delta),
            signed_data: Some(sign_compact(&req.signer, &data).await?),
            ..Self::default()
        })
    }

    /// Render a deactivation of `did`, signed with the request's recovery signer.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidInput` if `did` is not a valid DID.
    /// * Any error returned by the signer.
    pub async fn deactivate<S: Signer>(did: &str, req: &DeactivateRequest<S>) -> Result<Self> {
        let suffix = did.parse::<Did>()?.suffix;

        let recovery_key = req.signer.public_key().await?;
        let data = DeactivateSignedData {
            did_suffix: suffix.clone(),
            recovery_key: recovery_key.clone(),
        };

        Ok(Self {
            type_: OperationType::Deactivate,
            did_suffix: Some(suffix),
            reveal_value: Some(hash_data(&recovery_key, req.multihash_code)?),
            signed_data: Some(sign_compact(&req.signer, &data).await?),
            ..Self::default()
        })
    }
}

/// [`SidetreeClient`] posting operations to Sidetree REST operation endpoints.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: reqwest::Client,
}

impl HttpClient {
    /// Create a client sharing `http`.
    #[must_use]
    pub const fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Create a client from transport settings.
    ///
    /// # Errors
    ///
    /// * `Err::InvalidConfig` if the HTTP client cannot be built.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Ok(Self::new(config.client()?))
    }

    // Post the operation to each endpoint in turn, returning the body of the first that
    // accepts it.
    async fn submit(&self, endpoints: &[String], op: &Operation) -> Result<Vec<u8>> {
        if endpoints.is_empty() {
            tracerr!(Err::InvalidConfig, "no operation endpoints to submit {} to", op.type_);
        }

        let mut last = String::new();
        for url in endpoints {
            match self.post(url, op).await {
                Ok(body) => {
                    tracing::debug!(%url, operation = %op.type_, "operation accepted");
                    return Ok(body);
                }
                Err(e) => {
                    tracing::warn!(%url, error = %e, "operation endpoint rejected request");
                    last = e.to_string();
                }
            }
        }

        tracerr!(Err::ApiError, "failed to submit {} operation: {last}", op.type_)
    }

    async fn post(&self, url: &str, op: &Operation) -> Result<Vec<u8>> {
        let res = match self.http.post(url).header(ACCEPT, "application/json").json(op).send().await
        {
            Ok(res) => res,
            Err(e) => tracerr!(Err::RequestError, "failed to send request to {url}: {e}"),
        };

        let status = res.status();
        let body = match res.bytes().await {
            Ok(body) => body.to_vec(),
            Err(e) => tracerr!(Err::RequestError, "failed to read response from {url}: {e}"),
        };
        if !status.is_success() {
            let detail = String::from_utf8_lossy(&body);
            tracerr!(Err::ApiError, "{url} returned {status}: {}", detail.trim());
        }

        Ok(body)
    }
}

impl SidetreeClient for HttpClient {
    async fn create_did(&self, req: CreateRequest) -> Result<Resolution> {
        let op = Operation::create(&req)?;
        let body = self.submit(&req.operation_endpoints, &op).await?;
        Resolution::from_slice(&body)
    }

    async fn update_did<S: Signer>(&self, did: &str, req: UpdateRequest<S>) -> Result<()> {
        let op = Operation::update(did, &req).await?;
        self.submit(&req.operation_endpoints, &op).await?;
        Ok(())
    }

    async fn recover_did<S: Signer>(&self, did: &str, req: RecoverRequest<S>) -> Result<()> {
        let op = Operation::recover(did, &req).await?;
        self.submit(&req.operation_endpoints, &op).await?;
        Ok(())
    }

    async fn deactivate_did<S: Signer>(
        &self, did: &str, req: DeactivateRequest<S>,
    ) -> Result<()> {
        let op = Operation::deactivate(did, &req).await?;
        self.submit(&req.operation_endpoints, &op).await?;
        Ok(())
    }
}
