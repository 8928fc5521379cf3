use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use loanline_core::config::AppConfig;
use loanline_core::domain::customer::{CustomerId, KycRequest};
use loanline_core::gateways::{
    CreditScoreGateway, CustomerProfileGateway, GatewayError, KycGateway, OfferCatalogGateway,
};
use loanline_server::bootstrap::{bootstrap_with_config, Application};
use loanline_server::gateway_client::HttpGateways;
use loanline_server::mock_services;
use loanline_server::sanction_letter::SanctionLetterEmitter;
use loanline_store::CustomerDataset;

struct TestServer {
    router: Router,
    _letters: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let letters = TempDir::new().expect("temp dir");
        let mut config = AppConfig::default();
        config.documents.output_dir = letters.path().to_path_buf();
        let app: Application = bootstrap_with_config(config).await.expect("bootstrap");
        Self { router: loanline_server::router(&app), _letters: letters }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = self.router.clone().oneshot(request).await.expect("router responds");
        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body readable");
        (status, body.to_vec(), disposition)
    }

    async fn json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body, _) = self.send(request).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    async fn chat(&self, session_id: &str, message: &str) -> Value {
        let request = post("/api/chat", json!({"session_id": session_id, "message": message}));
        let (status, body) = self.json(request).await;
        assert_eq!(status, StatusCode::OK, "chat failed: {body}");
        body
    }
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn bare(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn chat_flow_ends_with_a_downloadable_letter() {
    let server = TestServer::start().await;

    let (status, greeting) =
        server.json(bare("POST", "/api/start-conversation?customer_id=CUST001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(greeting["current_stage"], "sales");
    assert!(greeting["messages"][0]["content"].as_str().unwrap_or_default().contains("Rajesh"));
    let session_id = greeting["session_id"].as_str().expect("session id").to_owned();

    let body = server.chat(&session_id, "I need 50000 for 12 months").await;
    assert_eq!(body["current_stage"], "awaiting_verification_confirmation");
    assert_eq!(body["quick_replies"][0]["value"], "proceed_verification");

    let body = server.chat(&session_id, "proceed_verification").await;
    assert_eq!(body["current_stage"], "awaiting_underwriting_confirmation");
    let body = server.chat(&session_id, "proceed_underwriting").await;
    assert_eq!(body["current_stage"], "awaiting_sanction_confirmation");
    let body = server.chat(&session_id, "generate_sanction").await;
    assert_eq!(body["current_stage"], "end");
    assert_eq!(body["conversation_complete"], true);
    assert_eq!(body["sanction_letter_available"], true);

    let (status, bytes, disposition) = server
        .send(bare("GET", &format!("/api/download-sanction-letter/{session_id}")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(disposition.unwrap_or_default().contains("sanction_letter_CUST001_"));
    assert!(!bytes.is_empty());

    let (status, summary) = server.json(bare("GET", &format!("/api/session/{session_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["loan_amount"], 50000.0);
    assert_eq!(summary["conversation_complete"], true);
}

#[tokio::test]
async fn chat_without_session_creates_one() {
    let server = TestServer::start().await;

    let request =
        post("/api/chat", json!({"session_id": "", "customer_id": "CUST001", "message": "hi"}));
    let (status, body) = server.json(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["session_id"].as_str().unwrap_or_default().is_empty());
    assert_eq!(body["current_stage"], "sales");
}

#[tokio::test]
async fn unknown_sessions_are_not_found() {
    let server = TestServer::start().await;

    let (status, body) = server.json(bare("GET", "/api/session/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(body["correlation_id"].as_str().unwrap_or_default().starts_with("req-"));

    let (status, _) = server.json(bare("DELETE", "/api/session/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.json(bare("GET", "/api/download-sanction-letter/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn letter_is_not_found_before_sanction() {
    let server = TestServer::start().await;
    let (_, greeting) =
        server.json(bare("POST", "/api/start-conversation?customer_id=CUST001")).await;
    let session_id = greeting["session_id"].as_str().expect("session id").to_owned();

    let (status, _) = server
        .json(bare("GET", &format!("/api/download-sanction-letter/{session_id}")))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let server = TestServer::start().await;
    let (_, greeting) =
        server.json(bare("POST", "/api/start-conversation?customer_id=CUST003")).await;
    let session_id = greeting["session_id"].as_str().expect("session id").to_owned();

    let (status, body) = server
        .json(post(
            "/api/upload-salary-slip",
            json!({"session_id": session_id, "salary_amount": 50000}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = server.json(post("/api/chat", json!({"message": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.json(bare("POST", "/api/start-conversation?customer_id=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sessions_can_be_deleted() {
    let server = TestServer::start().await;
    let (_, greeting) =
        server.json(bare("POST", "/api/start-conversation?customer_id=CUST002")).await;
    let session_id = greeting["session_id"].as_str().expect("session id").to_owned();

    let (status, body) = server.json(bare("DELETE", &format!("/api/session/{session_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, _) = server.json(bare("GET", &format!("/api/session/{session_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_fixture_mode() {
    let server = TestServer::start().await;

    let (status, body) = server.json(bare("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["gateway_mode"], "fixture");
}

#[tokio::test]
async fn http_gateways_read_from_mock_services() {
    let dataset = Arc::new(CustomerDataset::embedded().expect("embedded dataset"));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("ephemeral port");
    let address = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, mock_services::router(dataset)).await;
    });

    let gateways =
        HttpGateways::new(format!("http://{address}"), Duration::from_secs(5), None)
            .expect("client builds");
    gateways.probe().await.expect("mock services reachable");

    let customer_id = CustomerId::new("CUST001");
    let profile = gateways.customer(&customer_id).await.expect("profile");
    assert_eq!(profile.name, "Rajesh Kumar");

    let report = gateways.credit_report(&customer_id).await.expect("report");
    assert_eq!(report.credit_score, 780);

    let offers = gateways.offers(&customer_id).await.expect("offers");
    assert!(!offers.offers.is_empty());

    let kyc = gateways
        .verify(&KycRequest {
            customer_id: customer_id.clone(),
            phone: Some("9876543210".to_owned()),
            address: None,
        })
        .await
        .expect("kyc");
    assert!(kyc.verified);

    let missing = gateways.customer(&CustomerId::new("CUST404")).await.expect_err("missing");
    assert!(matches!(missing, GatewayError::NotFound { .. }));
}

#[tokio::test]
async fn emitter_writes_letters_into_configured_directory() {
    let letters = TempDir::new().expect("temp dir");
    let mut config = AppConfig::default();
    config.documents.output_dir = letters.path().join("nested");

    let emitter = SanctionLetterEmitter::new(&config.documents).expect("emitter");

    assert_eq!(emitter.output_dir(), letters.path().join("nested"));
}
