//! Tests for deactivating a `did:orb` DID.

use test_utils::{serve, MockClient, MockConfig, MockKeys, DOC_RESOLUTION};
use vercre_didorb::error::Err;
use vercre_didorb::{HttpTransport, OperationType, OptionKey, Options, Vdr};

const OPERATIONS: &str = "https://orb.domain1.com/sidetree/v1/operations";

type TestVdr = Vdr<MockKeys, MockConfig, MockClient, HttpTransport>;

fn vdr(keys: &MockKeys, client: &MockClient) -> TestVdr {
    Vdr::new(
        keys.clone(),
        MockConfig::new(),
        client.clone(),
        HttpTransport::new(reqwest::Client::new()),
    )
}

#[tokio::test]
async fn deactivate_success() {
    let url = serve(200, DOC_RESOLUTION).await;
    let client = MockClient::new();
    let opts = Options::new()
        .with(OptionKey::ResolutionEndpoints, vec![url])
        .with(OptionKey::OperationEndpoints, [OPERATIONS]);

    vdr(&MockKeys::new(), &client)
        .deactivate("did:ex:domain:123", &opts)
        .await
        .expect("should deactivate");

    let submitted = client.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].operation, OperationType::Deactivate);
    assert_eq!(submitted[0].did, "did:ex:domain:123");
}

#[tokio::test]
async fn error_from_get_did_doc() {
    let url = serve(500, "").await;
    let keys = MockKeys::new();
    let opts = Options::new().with(OptionKey::ResolutionEndpoints, vec![url]);

    let err = vdr(&keys, &MockClient::new()).deactivate("", &opts).await.expect_err("fails");
    assert!(err.to_string().contains("failed to resolve did"));
    assert_eq!(keys.calls(), 0);
}

// An answer without a document is no proof the DID exists.
#[tokio::test]
async fn resolution_without_document() {
    let url = serve(200, r#"{"didResolutionMetadata": {"error": "notFound"}}"#).await;
    let keys = MockKeys::new();
    let client = MockClient::new();
    let opts = Options::new()
        .with(OptionKey::ResolutionEndpoints, vec![url])
        .with(OptionKey::OperationEndpoints, [OPERATIONS]);

    let err = vdr(&keys, &client)
        .deactivate("did:orb:uAAA:EiDahaOGH", &opts)
        .await
        .expect_err("should fail");
    assert!(err.is(Err::NotFound));
    assert!(err.to_string().contains("failed to resolve did"));
    assert!(err.to_string().contains("returned no didDocument"));
    assert_eq!(keys.calls(), 0);
    assert!(client.submitted().is_empty());
}

#[tokio::test]
async fn failed_to_get_signing_key() {
    let url = serve(200, DOC_RESOLUTION).await;
    let keys = MockKeys::new().fail_signing("failed to get signing key");
    let opts = Options::new()
        .with(OptionKey::ResolutionEndpoints, vec![url])
        .with(OptionKey::OperationEndpoints, [OPERATIONS]);

    let err = vdr(&keys, &MockClient::new())
        .deactivate("did:ex:domain:123", &opts)
        .await
        .expect_err("should fail");
    assert_eq!(err.to_string(), "failed to get signing key");
}

#[tokio::test]
async fn no_operation_endpoints() {
    let url = serve(200, DOC_RESOLUTION).await;
    let client = MockClient::new();
    let opts = Options::new().with(OptionKey::ResolutionEndpoints, vec![url]);

    let err = vdr(&MockKeys::new(), &client)
        .deactivate("did:ex:domain:123", &opts)
        .await
        .expect_err("should fail");
    assert!(err.is(Err::InvalidConfig));
    assert!(client.submitted().is_empty());
}
