use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::Router;
use vercre_didorb::{Document, Resolution};

/// A published resolution whose document references one remote context.
pub const DOC_RESOLUTION: &str = r#"{
  "@context": "https://w3id.org/did-resolution/v1",
  "didDocument": {
    "@context": ["https://w3id.org/did/v1"],
    "id": "did:example:21tDAKCERh95uGgKbJNHYp",
    "verificationMethod": [
      {
        "id": "did:example:123456789abcdefghi#keys-1",
        "type": "Secp256k1VerificationKey2018",
        "controller": "did:example:123456789abcdefghi",
        "publicKeyBase58": "H3C2AVvLMv6gmMNam3uVAjZpfkcJCwDwnZn6z3wXmqPV"
      },
      {
        "id": "did:example:123456789abcdefghw#key2",
        "type": "RsaVerificationKey2018",
        "controller": "did:example:123456789abcdefghw",
        "publicKeyPem": "-----BEGIN PUBLIC KEY-----\nMIIBIjANBgkq\n-----END PUBLIC KEY-----"
      }
    ],
    "authentication": [
      "did:example:123456789abcdefghi#keys-1",
      {
        "id": "did:example:123456789abcdefghs#key3",
        "type": "RsaVerificationKey2018",
        "controller": "did:example:123456789abcdefghs",
        "publicKeyHex": "02b97c30de767f084ce3080168ee293053ba33b235d7116a3263d29f1450936b71"
      }
    ],
    "service": [
      {
        "id": "did:example:123456789abcdefghi#inbox",
        "type": "SocialWebInboxService",
        "serviceEndpoint": "https://social.example.com/83hfh37dj",
        "spamCost": {"amount": "0.50", "currency": "USD"}
      },
      {
        "id": "did:example:123456789abcdefghi#did-communication",
        "type": "did-communication",
        "serviceEndpoint": "https://agent.example.com/",
        "priority": 0,
        "recipientKeys": ["did:example:123456789abcdefghi#key2"],
        "routingKeys": ["did:example:123456789abcdefghi#key2"]
      }
    ],
    "created": "2002-10-10T17:00:00Z"
  },
  "didDocumentMetadata": {
    "canonicalId": "did:ex:123333",
    "method": {
      "published": true,
      "recoveryCommitment": "EiB1u5HnTYKVHrmemOpZtrGlc6BoaWWHwNAd-k7CrLKHOg",
      "updateCommitment": "EiAiTB0QR_Skh3i-fzDSeFgjVoMEDsXYoVIsA56-GUsKjg"
    }
  }
}"#;

/// [`DOC_RESOLUTION`], parsed.
///
/// # Panics
///
/// Never: the fixture is valid.
#[must_use]
pub fn doc_resolution() -> Resolution {
    Resolution::from_slice(DOC_RESOLUTION.as_bytes()).expect("fixture should parse")
}

/// A resolution carrying an empty document for `id`.
#[must_use]
pub fn resolution(id: &str) -> Resolution {
    Resolution {
        did_document: Some(Document::new(id)),
        ..Resolution::default()
    }
}

/// Serve `app` on an ephemeral local port, returning its base URL.
///
/// # Panics
///
/// If no local port can be bound.
pub async fn serve_router(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("should bind");
    let addr = listener.local_addr().expect("should have address");
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

/// Serve `body` with `status` for every request, returning the base URL.
///
/// # Panics
///
/// If `status` is not a valid status code or no local port can be bound.
pub async fn serve(status: u16, body: &str) -> String {
    let status = StatusCode::from_u16(status).expect("should be a status code");
    let body = body.to_string();
    let app = Router::new().fallback(move || async move {
        (status, [(CONTENT_TYPE, "application/did+ld+json")], body)
    });
    serve_router(app).await
}
