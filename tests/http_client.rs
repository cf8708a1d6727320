//! Tests for the HTTP protocol client against local operation endpoints.

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::Value;
use test_utils::{serve, serve_router, MockKeys, DOC_RESOLUTION};
use vercre_didorb::config::SidetreeConfig;
use vercre_didorb::document::Relationship;
use vercre_didorb::error::Err;
use vercre_didorb::hash::{hash_data, SHA2_256};
use vercre_didorb::operation::{CreateRequest, DeactivateRequest, UpdateRequest};
use vercre_didorb::{
    Document, Ed25519Signer, HttpClient, HttpConfig, Jwk, OptionKey, Options, Service,
    SidetreeClient, Signer, Vdr, Verification, VerificationMethod,
};

const DID: &str = "did:orb:uAAA:EiDahaOGH-liLLdDtTxEAdc8i-cfCz-WUcQdRJheMVNn3A";
const SUFFIX: &str = "EiDahaOGH-liLLdDtTxEAdc8i-cfCz-WUcQdRJheMVNn3A";

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<Value>>>);

impl Captured {
    fn operations(&self) -> Vec<Value> {
        self.0.lock().expect("lock on captured mutex failed").clone()
    }
}

// An operation endpoint recording every posted operation and answering with `status`/`body`.
async fn capture(status: StatusCode, body: &'static str) -> (String, Captured) {
    let captured = Captured::default();
    let store = captured.clone();
    let app = Router::new().route(
        "/sidetree/v1/operations",
        post(move |Json(op): Json<Value>| {
            let store = store.clone();
            async move {
                store.0.lock().expect("lock on captured mutex failed").push(op);
                (status, body)
            }
        }),
    );
    let url = serve_router(app).await;
    (format!("{url}/sidetree/v1/operations"), captured)
}

fn doc(id: &str) -> Document {
    let jwk = Jwk::ed25519(&[3u8; 32]).expect("should build key");
    Document {
        service: vec![Service::new("svc", "LinkedDomains", "https://example.com")],
        authentication: vec![Verification::referenced(
            VerificationMethod::from_jwk("key-1", "", "", jwk),
            Relationship::Authentication,
        )],
        ..Document::new(id)
    }
}

fn client() -> HttpClient {
    HttpClient::new(reqwest::Client::new())
}

fn decode(segment: &str) -> Value {
    let bytes = Base64UrlUnpadded::decode_vec(segment).expect("should decode");
    serde_json::from_slice(&bytes).expect("should be json")
}

#[tokio::test]
async fn create_posts_operation() {
    let (url, captured) = capture(StatusCode::OK, DOC_RESOLUTION).await;

    let opts = Options::new()
        .with(OptionKey::UpdatePublicKey, vec![1u8; 32])
        .with(OptionKey::RecoveryPublicKey, vec![2u8; 32])
        .with(OptionKey::AnchorOrigin, "origin.com");
    let req = CreateRequest::new(&doc(""), &opts, &SidetreeConfig::default())
        .expect("should validate")
        .with_endpoints(vec![url]);
    let recovery_commitment = req.recovery_commitment.clone();

    let resolution = client().create_did(req).await.expect("should create");
    let created = resolution.did_document.expect("should have document");
    assert_eq!(created.id, "did:example:21tDAKCERh95uGgKbJNHYp");

    let ops = captured.operations();
    assert_eq!(ops.len(), 1);
    let op = &ops[0];
    assert_eq!(op["type"], "create");
    assert_eq!(op["suffixData"]["recoveryCommitment"], recovery_commitment.as_str());
    assert_eq!(op["suffixData"]["anchorOrigin"], "origin.com");
    let delta_hash = hash_data(&op["delta"], SHA2_256).expect("should hash");
    assert_eq!(op["suffixData"]["deltaHash"], delta_hash);
    assert_eq!(op["delta"]["patches"][0]["action"], "replace");
    assert_eq!(op["delta"]["patches"][0]["document"]["publicKeys"][0]["id"], "key-1");
    assert_eq!(op["delta"]["patches"][0]["document"]["services"][0]["id"], "svc");
}

#[tokio::test]
async fn update_is_signed_with_update_key() {
    let (url, captured) = capture(StatusCode::OK, "").await;

    let signer = Ed25519Signer::from_bytes(&[7u8; 32]);
    let update_key = signer.public_key().await.expect("should have key");
    let next = Jwk::ed25519(&[8u8; 32]).expect("should build key");
    let req = UpdateRequest::new(
        &Document::new(DID),
        &doc(DID),
        &next,
        signer,
        &SidetreeConfig::default(),
    )
    .expect("should build")
    .with_endpoints(vec![url]);

    client().update_did(DID, req).await.expect("should update");

    let ops = captured.operations();
    let op = &ops[0];
    assert_eq!(op["type"], "update");
    assert_eq!(op["didSuffix"], SUFFIX);
    assert_eq!(op["revealValue"], hash_data(&update_key, SHA2_256).expect("should hash"));
    assert_eq!(op["delta"]["patches"][0]["action"], "add-public-keys");
    assert_eq!(op["delta"]["patches"][1]["action"], "add-services");

    let signed = op["signedData"].as_str().expect("should be compact jws");
    let parts: Vec<&str> = signed.split('.').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(decode(parts[0])["alg"], "EdDSA");

    let payload = decode(parts[1]);
    assert_eq!(payload["updateKey"], serde_json::to_value(&update_key).expect("should serialize"));
    assert_eq!(payload["deltaHash"], hash_data(&op["delta"], SHA2_256).expect("should hash"));
}

#[tokio::test]
async fn falls_back_to_next_endpoint() {
    let busy = serve(500, "busy").await;
    let (url, captured) = capture(StatusCode::OK, "").await;

    let req = DeactivateRequest::new(
        Ed25519Signer::from_bytes(&[7u8; 32]),
        &SidetreeConfig::default(),
    )
    .with_endpoints(vec![busy, url]);
    client().deactivate_did(DID, req).await.expect("should deactivate");

    let ops = captured.operations();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0]["type"], "deactivate");
    assert_eq!(ops[0]["didSuffix"], SUFFIX);
    assert!(ops[0].get("delta").is_none());
}

#[tokio::test]
async fn every_endpoint_fails() {
    let first = serve(500, "busy").await;
    let second = serve(400, "bad request").await;

    let req = DeactivateRequest::new(
        Ed25519Signer::from_bytes(&[7u8; 32]),
        &SidetreeConfig::default(),
    )
    .with_endpoints(vec![first, second]);
    let err = client().deactivate_did(DID, req).await.expect_err("should fail");

    assert!(err.is(Err::ApiError));
    assert!(err.to_string().starts_with("failed to submit deactivate operation"));
    assert!(err.to_string().contains("bad request"));
}

// Update through the HTTP registry: the current document is read from a local resolver and the
// operation replaces its keys and services.
#[tokio::test]
async fn http_registry_update() {
    let resolver = serve(200, DOC_RESOLUTION).await;
    let (operations, captured) = capture(StatusCode::OK, "").await;

    let keys = MockKeys::new();
    let vdr = Vdr::http(keys.clone(), &HttpConfig::default()).expect("should build registry");
    let opts = Options::new()
        .with(OptionKey::ResolutionEndpoints, vec![resolver])
        .with(OptionKey::OperationEndpoints, vec![operations]);

    vdr.update(&doc(DID), &opts).await.expect("should update");

    let ops = captured.operations();
    assert_eq!(ops.len(), 1);
    let patches = &ops[0]["delta"]["patches"];
    assert_eq!(patches[0]["action"], "remove-public-keys");
    assert_eq!(patches[0]["ids"], serde_json::json!(["keys-1", "key2", "key3"]));
    assert_eq!(patches[2]["action"], "remove-services");
    assert_eq!(patches[2]["ids"], serde_json::json!(["inbox", "did-communication"]));

    let next = keys.issued(DID, "update").expect("should issue update key");
    let commitment =
        vercre_didorb::hash::hash_commitment(&next, SHA2_256).expect("should commit");
    assert_eq!(ops[0]["delta"]["updateCommitment"], commitment.as_str());
}
