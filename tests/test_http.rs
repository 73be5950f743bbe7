//! End-to-end router tests: entry endpoint, API routes and the error envelope.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use folio_server::config::{Config, Loader, OptionSpec, CONTACT_FORM_ENABLED};
use folio_server::responder::{ApplicationError, Failure, Responder};
use folio_server::server::{self, AppState, PLACEHOLDER_MESSAGE, TemplateSource};

fn config_with(vars: &[(&str, &str)]) -> Arc<Config> {
    let mut loader = Loader::new().declare(OptionSpec::bool(CONTACT_FORM_ENABLED, true));
    for (k, v) in vars {
        loader = loader.var(*k, *v);
    }
    Arc::new(loader.load().unwrap())
}

fn app(config: Arc<Config>, template: Option<TemplateSource>) -> Router {
    server::build_router(AppState::new(config, template))
}

async fn send(router: Router, req: Request<Body>) -> Response {
    router.oneshot(req).await.unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Router with deliberately failing routes, wrapped like the real one.
fn failing_app(debug: bool) -> Router {
    let routes = Router::new()
        .route(
            "/missing-item",
            get(|| async {
                Err::<(), Failure>(
                    ApplicationError::new("Not found")
                        .with_status(StatusCode::NOT_FOUND)
                        .with_detail("id", 7)
                        .into(),
                )
            }),
        )
        .route(
            "/broken",
            get(|| async {
                let e = std::io::Error::other("connection pool exhausted");
                Err::<(), Failure>(e.into())
            }),
        )
        .route(
            "/panics",
            get(|| async {
                if true {
                    panic!("invariant violated: secret token abc123");
                }
                "unreachable"
            }),
        );
    server::with_error_handling(routes, Responder::new(debug))
}

// ── Entry endpoint ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_root_without_template_is_json_placeholder() {
    let response = send(app(config_with(&[]), None), get_req("/")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(body_json(response).await, json!({ "message": PLACEHOLDER_MESSAGE }));
}

#[tokio::test]
async fn test_root_with_template_is_html() {
    let template = TemplateSource::from_string(
        "<!doctype html><title>{{ app_name }}</title><body>{{ portfolio }}</body>",
    );
    let config = config_with(&[("APP_NAME", "Ada <Lovelace>")]);
    let response = send(app(config, Some(template)), get_req("/")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let ct = response.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/html"), "got {ct}");

    let html = body_text(response).await;
    assert!(html.contains("<title>Ada &lt;Lovelace&gt;</title>"));
    assert!(html.contains("id=\"projects\""));
}

// ── API routes ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_config() {
    let config = config_with(&[("APP_ENV", "staging"), ("FRAMEWORK", "fastapi")]);
    let body = body_json(send(app(config, None), get_req("/api/health")).await).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "staging");
    assert_eq!(body["framework"], "fastapi");
    assert_eq!(body["app_version"], "1.0.0");
}

#[tokio::test]
async fn test_portfolio_is_served_as_json() {
    let response = send(app(config_with(&[]), None), get_req("/api/portfolio")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["projects"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_favicon_is_no_content() {
    let response = send(app(config_with(&[]), None), get_req("/favicon.ico")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_contact_accepts_valid_form() {
    let body = r#"{"name":"Ada","email":"ada@example.com","subject":"Hi","message":"Let's talk"}"#;
    let response = send(app(config_with(&[]), None), post_json("/api/contact", body)).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "received");
    assert!(body["received_at"].as_str().is_some());
}

#[tokio::test]
async fn test_contact_validation_failure_uses_envelope() {
    let body = r#"{"name":"","email":"not-an-email","message":"hi"}"#;
    let response = send(app(config_with(&[]), None), post_json("/api/contact", body)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["message"], "contact form failed validation");
    assert_eq!(body["details"]["name"], "must not be blank");
    assert_eq!(body["details"]["email"], "must be a valid email address");
}

#[tokio::test]
async fn test_contact_malformed_json_is_bad_request() {
    let response = send(app(config_with(&[]), None), post_json("/api/contact", "{not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "BadRequestError");
    assert!(body["details"]["reason"].as_str().is_some());
}

#[tokio::test]
async fn test_contact_wrong_field_type_is_bad_request() {
    let response = send(app(config_with(&[]), None), post_json("/api/contact", r#"{"name":5}"#)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "BadRequestError");
}

#[tokio::test]
async fn test_contact_without_content_type_is_bad_request() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/contact")
        .body(Body::from(r#"{"name":"Ada","email":"ada@example.com","message":"hi"}"#))
        .unwrap();
    let response = send(app(config_with(&[]), None), req).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "BadRequestError");
}

#[tokio::test]
async fn test_contact_disabled_is_not_found() {
    let config = config_with(&[("CONTACT_FORM_ENABLED", "false")]);
    let body = r#"{"name":"Ada","email":"ada@example.com","message":"hi"}"#;
    let response = send(app(config, None), post_json("/api/contact", body)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "NotFoundError");
}

// ── Fallbacks ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_route_is_not_found_envelope() {
    let response = send(app(config_with(&[]), None), get_req("/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "NotFoundError");
    assert_eq!(body["details"]["path"], "/nope");
}

#[tokio::test]
async fn test_wrong_method_is_method_not_allowed_envelope() {
    let response = send(app(config_with(&[]), None), get_req("/api/contact")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "MethodNotAllowedError");
    assert_eq!(body["details"]["method"], "GET");
}

#[tokio::test]
async fn test_every_response_has_request_id() {
    for uri in ["/", "/api/health", "/nope"] {
        let response = send(app(config_with(&[]), None), get_req(uri)).await;
        assert!(response.headers().contains_key("x-request-id"), "{uri}");
    }
}

// ── Error responder ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_application_error_envelope() {
    let response = send(failing_app(false), get_req("/missing-item")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_text(response).await,
        r#"{"error":"ApplicationError","message":"Not found","details":{"id":7}}"#
    );
}

#[tokio::test]
async fn test_internal_failure_hidden_without_debug() {
    let response = send(failing_app(false), get_req("/broken")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_text(response).await;
    assert_eq!(
        text,
        r#"{"error":"InternalServerError","message":"An unexpected error occurred","details":{}}"#
    );
    assert!(!text.contains("pool exhausted"));
}

#[tokio::test]
async fn test_internal_failure_detailed_with_debug() {
    let response = send(failing_app(true), get_req("/broken")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "InternalServerError");
    assert_eq!(body["details"]["error"], "connection pool exhausted");
}

#[tokio::test]
async fn test_panic_becomes_internal_envelope() {
    let response = send(failing_app(false), get_req("/panics")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_text(response).await;
    assert!(text.contains("InternalServerError"));
    assert!(!text.contains("abc123"));

    let response = send(failing_app(true), get_req("/panics")).await;
    let body = body_json(response).await;
    assert!(body["details"]["error"].as_str().unwrap().contains("abc123"));
}

fn leaky_router(config: &Config) -> Router {
    let routes = Router::new().route(
        "/broken",
        get(|| async { Err::<(), Failure>(anyhow::anyhow!("db password hunter2").into()) }),
    );
    server::with_error_handling(routes, Responder::new(config.exposes_failure_detail()))
}

#[tokio::test]
async fn test_debug_flag_flows_from_config() {
    let config = config_with(&[("DEBUG", "true")]);
    let body = body_json(send(leaky_router(&config), get_req("/broken")).await).await;
    assert_eq!(body["details"]["error"], "db password hunter2");
}

#[tokio::test]
async fn test_production_hides_failure_text_even_with_debug() {
    let config = config_with(&[("APP_ENV", "production"), ("DEBUG", "true")]);
    let response = send(leaky_router(&config), get_req("/broken")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_text(response).await;
    assert!(!text.contains("hunter2"), "{text}");
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["details"], json!({}));
}
