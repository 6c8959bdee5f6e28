use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use iv_monitor::config::ProxyConfig;
use iv_monitor::routes::register_routes;
use iv_monitor::state::AppState;
use once_cell::sync::Lazy;
use serde::Deserialize;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

//
// ----------- Global Setup -----------
//

static INIT: Lazy<()> = Lazy::new(|| {
    dotenvy::dotenv().ok();
});

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

//
// ----------- Test Helpers -----------
//

fn app_for(upstream_base_url: String) -> Router {
    register_routes(AppState::new(ProxyConfig {
        upstream_base_url,
        app_server_port: 3000,
        cache_ttl_secs: 600,
    }))
}

async fn send(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("Should receive a response")
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    serde_json::from_slice(&bytes).expect("should parse JSON")
}

fn qvix_payload() -> serde_json::Value {
    serde_json::json!([
        { "date": "2024-04-01", "open": 17.9, "high": 18.8, "low": 17.5, "close": 18.5 },
        { "date": "2024-04-02", "open": 18.4, "high": 19.6, "low": 18.1, "close": 19.25 }
    ])
}

//
// ----------- Happy Path Tests -----------
//

#[tokio::test]
async fn series_endpoint_passes_upstream_payload_through() {
    let _ = *INIT;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index_option_50etf_qvix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(qvix_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(server.uri());
    let response = send(app, "/api/index_option_50etf_qvix").await;

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .expect("Missing content-type")
        .to_str()
        .unwrap()
        .to_string();
    let body: serde_json::Value = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/json"));
    assert_eq!(body, qvix_payload());
}

#[tokio::test]
async fn repeated_requests_within_ttl_reach_upstream_once() {
    let _ = *INIT;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index_option_300index_qvix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(qvix_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(server.uri());

    for _ in 0..3 {
        let response = send(app.clone(), "/api/index_option_300index_qvix").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    server.verify().await;
}

#[tokio::test]
async fn query_parameters_are_forwarded_and_keyed() {
    let _ = *INIT;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index_option_1000index_qvix"))
        .and(query_param("start_date", "20240101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(qvix_payload()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index_option_1000index_qvix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(server.uri());

    let filtered: serde_json::Value = body_json(
        send(app.clone(), "/api/index_option_1000index_qvix?start_date=20240101").await,
    )
    .await;
    let unfiltered: serde_json::Value =
        body_json(send(app, "/api/index_option_1000index_qvix").await).await;

    assert_eq!(filtered, qvix_payload());
    assert_eq!(unfiltered, serde_json::json!([]));
}

//
// ----------- Sad Path Tests -----------
//

#[tokio::test]
async fn upstream_failure_returns_500_json() {
    let _ = *INIT;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let app = app_for(server.uri());
    let response = send(app, "/api/index_option_500index_qvix").await;

    let status = response.status();
    let error_response: ErrorResponse = body_json(response).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_response.error, "Internal Server Error");
    assert_eq!(error_response.message, "upstream responded with status 503");
}

#[tokio::test]
async fn unknown_series_returns_404_json() {
    let _ = *INIT;

    let app = app_for("http://127.0.0.1:9".to_string());
    let response = send(app, "/api/index_option_foo_qvix").await;

    let status = response.status();
    let error_response: ErrorResponse = body_json(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_response.error, "Not Found");
    assert!(error_response.message.contains("/api/index_option_foo_qvix"));
}

#[tokio::test]
async fn unmatched_path_returns_404_json() {
    let _ = *INIT;

    let app = app_for("http://127.0.0.1:9".to_string());
    let response = send(app, "/nowhere").await;

    let status = response.status();
    let error_response: ErrorResponse = body_json(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_response.error, "Not Found");
    assert_eq!(error_response.message, "No API endpoint matches /nowhere.");
}

#[tokio::test]
async fn wrong_method_on_known_path_returns_404_json() {
    let _ = *INIT;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(qvix_payload()))
        .expect(0)
        .mount(&server)
        .await;

    for uri in ["/health", "/api/index_option_50etf_qvix"] {
        let app = app_for(server.uri());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("Should receive a response");

        let status = response.status();
        let error_response: ErrorResponse = body_json(response).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_response.error, "Not Found");
        assert_eq!(error_response.message, format!("No API endpoint matches {uri}."));
    }

    server.verify().await;
}
