use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use iv_monitor::config::ProxyConfig;
use iv_monitor::routes::{health_check::HealthCheckResponse, register_routes};
use iv_monitor::state::AppState;
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_200_ok() {
    // Arrange
    let router = register_routes(AppState::new(ProxyConfig {
        upstream_base_url: "http://127.0.0.1:9".to_string(),
        app_server_port: 3000,
        cache_ttl_secs: 600,
    }));

    // Act
    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("should have gotten a response");

    let status = response.status();

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should have read body bytes");

    let health_response: HealthCheckResponse =
        serde_json::from_slice(&bytes).expect("should have deserialized JSON");

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health_response.status, "ok");
    assert!(health_response.timestamp <= chrono::Utc::now());
}
