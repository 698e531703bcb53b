//! Integration tests for REST API endpoints
//!
//! These tests build the real router and gateway around a spy backend that
//! records every payload it is asked to send.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use promptgate_backend::{BackendClient, BackendError, BackendPayload, HttpBackendClient};
use promptgate_server::{api::create_router, config::GatewayConfig, gateway::Gateway};
use promptgate_templates::TemplateRegistry;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const TOKEN: &str = "local-test-token";

/// What the spy answers with
enum Reply {
    /// Fixed raw body
    Body(Vec<u8>),
    /// `{"response": <model>, "prompt": <prompt>}` after a short delay
    EchoModel,
    /// Transport failure
    Unavailable,
}

struct SpyBackend {
    reply: Reply,
    calls: Mutex<Vec<BackendPayload>>,
}

impl SpyBackend {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<BackendPayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendClient for SpyBackend {
    async fn send(&self, payload: &BackendPayload) -> Result<Vec<u8>, BackendError> {
        self.calls.lock().unwrap().push(payload.clone());

        match &self.reply {
            Reply::Body(body) => Ok(body.clone()),
            Reply::EchoModel => {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(serde_json::to_vec(&json!({
                    "response": payload.model(),
                    "prompt": payload.prompt(),
                }))
                .unwrap())
            }
            Reply::Unavailable => Err(BackendError::Unavailable("connection refused".to_string())),
        }
    }

    fn name(&self) -> &str {
        "spy"
    }
}

fn test_config() -> GatewayConfig {
    GatewayConfig {
        auth_token: TOKEN.to_string(),
        default_model: "llama3".to_string(),
        ollama_params: json!({"stream": false}).as_object().unwrap().clone(),
        response_fields: vec!["eval_count".to_string()],
        ..GatewayConfig::default()
    }
}

fn test_templates() -> Arc<TemplateRegistry> {
    Arc::new(TemplateRegistry::from_sources([
        ("lights", "{{ query }} suffix"),
        ("broken", "{{ query }} {{ undefined_thing.field }}"),
    ]))
}

fn create_test_router(config: &GatewayConfig, backend: Arc<dyn BackendClient>) -> Router {
    let gateway = Gateway::new(config, test_templates(), backend);
    create_router(Arc::new(gateway), &config.auth_token)
}

fn template_request(name: &str, auth: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/template/{}", name))
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("Authorization", auth);
    }
    builder.body(body.into()).unwrap()
}

fn bearer() -> String {
    format!("Bearer {}", TOKEN)
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

const BACKEND_BODY: &[u8] = br#"{"response":"hi\nthere","done":true,"eval_count":5}"#;

#[tokio::test]
async fn test_health_endpoint_is_open() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let app = create_test_router(&test_config(), spy);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_template_request_success() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let app = create_test_router(&test_config(), spy.clone());

    let response = app
        .oneshot(template_request(
            "lights",
            Some(&bearer()),
            r#"{"query":"turn on the kitchen"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(
        json_body(response).await,
        json!({"response": "hi\nthere", "eval_count": 5})
    );

    let calls = spy.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt(), Some("turn on the kitchen suffix"));
    assert_eq!(calls[0].model(), Some("llama3"));
    assert_eq!(calls[0].get("stream"), Some(&json!(false)));
}

#[tokio::test]
async fn test_strip_newline_applies_to_response() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let config = GatewayConfig {
        strip_newline: true,
        ..test_config()
    };
    let app = create_test_router(&config, spy);

    let response = app
        .oneshot(template_request("lights", Some(&bearer()), r#"{"query":"q"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"response": "hi there", "eval_count": 5})
    );
}

#[tokio::test]
async fn test_request_model_overrides_default() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let app = create_test_router(&test_config(), spy.clone());

    let response = app
        .oneshot(template_request(
            "lights",
            Some(&bearer()),
            r#"{"query":"q","model":"mistral"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(spy.calls()[0].model(), Some("mistral"));
}

#[tokio::test]
async fn test_wrong_token_is_rejected_without_backend_call() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let app = create_test_router(&test_config(), spy.clone());

    let wrong_headers = [
        None,
        Some(String::new()),
        Some("Bearer".to_string()),
        Some("Bearer ".to_string()),
        Some(TOKEN.to_string()),
        Some(format!("bearer {}", TOKEN)),
        Some(format!("Bearer {}x", TOKEN)),
        Some(format!("Bearer  {}", TOKEN)),
    ];

    for header in wrong_headers {
        let response = app
            .clone()
            .oneshot(template_request(
                "lights",
                header.as_deref(),
                r#"{"query":"q"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header {:?}", header);
    }

    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_payloads_are_bad_requests_without_backend_call() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let app = create_test_router(&test_config(), spy.clone());

    let bodies = [
        "not json",
        "",
        "{}",
        r#"{"model":"mistral"}"#,
        r#"{"query":42}"#,
        r#"{"query":null}"#,
        r#"{"query":["a"]}"#,
        r#"["query"]"#,
        r#"["open the garage", "mistral"]"#,
        r#""open the garage""#,
    ];

    for body in bodies {
        let response = app
            .clone()
            .oneshot(template_request("lights", Some(&bearer()), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {:?}", body);
        let json = json_body(response).await;
        assert_eq!(json["status"], 400);
        assert!(json["error"].is_string());
    }

    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn test_missing_content_type_is_accepted() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let app = create_test_router(&test_config(), spy.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/template/lights")
        .header("Authorization", bearer())
        .body(Body::from(r#"{"query":"q"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(spy.calls().len(), 1);
}

#[tokio::test]
async fn test_unknown_template_is_not_found() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let app = create_test_router(&test_config(), spy.clone());

    let response = app
        .oneshot(template_request("garage", Some(&bearer()), r#"{"query":"q"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn test_render_failure_is_internal_error() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let app = create_test_router(&test_config(), spy.clone());

    let response = app
        .oneshot(template_request("broken", Some(&bearer()), r#"{"query":"q"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(spy.calls().is_empty());
}

#[tokio::test]
async fn test_backend_unavailable_is_internal_error() {
    let spy = SpyBackend::new(Reply::Unavailable);
    let app = create_test_router(&test_config(), spy.clone());

    let response = app
        .oneshot(template_request("lights", Some(&bearer()), r#"{"query":"q"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["status"], 500);
    assert!(json.get("response").is_none());
    assert_eq!(spy.calls().len(), 1);
}

#[tokio::test]
async fn test_undecodable_backend_body_is_internal_error() {
    let spy = SpyBackend::new(Reply::Body(b"<html>bad gateway</html>".to_vec()));
    let app = create_test_router(&test_config(), spy);

    let response = app
        .oneshot(template_request("lights", Some(&bearer()), r#"{"query":"q"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_concurrent_requests_keep_their_own_model() {
    let spy = SpyBackend::new(Reply::EchoModel);
    let app = create_test_router(&test_config(), spy.clone());

    let mut tasks = Vec::new();
    for i in 0..32 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            let model = format!("model-{}", i);
            let body = json!({"query": format!("query {}", i), "model": model.clone()}).to_string();
            let response = app
                .oneshot(template_request("lights", Some(&bearer()), body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            (model, json_body(response).await)
        }));
    }

    for task in tasks {
        let (model, json) = task.await.unwrap();
        assert_eq!(json["response"], json!(model));
    }

    let calls = spy.calls();
    assert_eq!(calls.len(), 32);
    for payload in calls {
        let model = payload.model().unwrap();
        let index = model.trim_start_matches("model-");
        assert_eq!(payload.prompt(), Some(format!("query {} suffix", index).as_str()));
    }
}

#[tokio::test]
async fn test_gateway_uses_raw_query_without_template() {
    let spy = SpyBackend::new(Reply::Body(BACKEND_BODY.to_vec()));
    let gateway = Gateway::new(&test_config(), test_templates(), spy.clone());

    gateway
        .process("not-registered", "plain question", None)
        .await
        .unwrap();

    assert_eq!(spy.calls()[0].prompt(), Some("plain question"));
}

#[tokio::test]
async fn test_end_to_end_with_http_backend() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .match_header("Authorization", "Bearer backend-key")
        .match_body(mockito::Matcher::PartialJson(json!({
            "prompt": "is it raining suffix",
            "model": "llama3",
            "stream": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"llama3","response":"No.","done":true,"eval_count":3}"#)
        .expect(1)
        .create_async()
        .await;

    let config = GatewayConfig {
        api_url: format!("{}/api/generate", server.url()),
        api_key: "backend-key".to_string(),
        ..test_config()
    };
    let backend =
        HttpBackendClient::new(config.api_url.clone(), config.api_key.clone(), config.request_timeout())
            .unwrap();
    let app = create_test_router(&config, Arc::new(backend));

    let response = app
        .oneshot(template_request(
            "lights",
            Some(&bearer()),
            r#"{"query":"is it raining"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"response": "No.", "eval_count": 3})
    );
    mock.assert_async().await;
}
