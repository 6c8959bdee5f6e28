use chrono::NaiveDate;
use iv_monitor::monitor::reading::validate_readings;
use iv_monitor::monitor::source::remote::{DEFAULT_FALLBACK_IV, FUTURES_FALLBACK_IV};
use iv_monitor::monitor::source::{ReadingSource, RemoteSource};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

//
// ----------- Test Helpers -----------
//

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

async fn mount_series(server: &MockServer, slug: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{slug}")))
        .respond_with(response)
        .mount(server)
        .await;
}

fn source_for(server: &MockServer) -> RemoteSource {
    RemoteSource::new(format!("{}/api", server.uri()), chrono_tz::UTC)
}

//
// ----------- Tests -----------
//

#[tokio::test]
async fn latest_close_becomes_the_reading() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        "index_option_300index_qvix",
        ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "date": "2024-04-01", "close": 18.5 },
            { "date": "2024-04-02", "close": 19.25 }
        ])),
    )
    .await;

    let readings = source_for(&server).fetch(&symbols(&["IF"])).await;

    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].symbol, "IF");
    assert_eq!(readings[0].implied_volatility, 19.25);
    assert_eq!(readings[0].date, NaiveDate::from_ymd_opt(2024, 4, 2));
    assert!(!readings[0].is_default);
}

#[tokio::test]
async fn unmapped_symbol_gets_fallback_without_affecting_others() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        "index_option_50index_qvix",
        ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "date": "2024-04-02", "close": "21.4" }
        ])),
    )
    .await;

    let readings = source_for(&server).fetch(&symbols(&["XX", "IH"])).await;

    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].symbol, "XX");
    assert_eq!(readings[0].implied_volatility, DEFAULT_FALLBACK_IV);
    assert!(readings[0].is_default);
    assert_eq!(readings[1].symbol, "IH");
    assert_eq!(readings[1].implied_volatility, 21.4);
    assert!(!readings[1].is_default);
}

#[tokio::test]
async fn failing_series_falls_back_per_symbol() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        "index_option_300index_qvix",
        ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "boom" })),
    )
    .await;
    mount_series(
        &server,
        "index_option_500index_qvix",
        ResponseTemplate::new(200).set_body_json(serde_json::json!([])),
    )
    .await;
    mount_series(
        &server,
        "index_option_50etf_qvix",
        ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "date": "2024-04-02", "close": 15.0 }
        ])),
    )
    .await;

    let readings = source_for(&server)
        .fetch(&symbols(&["IF", "IC", "ETF50"]))
        .await;

    assert_eq!(readings[0].implied_volatility, FUTURES_FALLBACK_IV);
    assert!(readings[0].is_default);
    assert_eq!(readings[1].implied_volatility, DEFAULT_FALLBACK_IV);
    assert!(readings[1].is_default);
    assert_eq!(readings[2].implied_volatility, 15.0);
    assert!(!readings[2].is_default);
}

#[tokio::test]
async fn unreachable_proxy_yields_fallbacks_for_every_symbol() {
    let source = RemoteSource::new("http://127.0.0.1:9/api", chrono_tz::UTC);

    let readings = source.fetch(&symbols(&["IF", "IH"])).await;

    assert_eq!(readings.len(), 2);
    assert!(readings.iter().all(|r| r.is_default));
}

#[tokio::test]
async fn non_finite_close_falls_back_instead_of_dropping_symbol() {
    let server = MockServer::start().await;
    mount_series(
        &server,
        "index_option_300index_qvix",
        ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "date": "2024-04-02", "close": "NaN" }
        ])),
    )
    .await;
    mount_series(
        &server,
        "index_option_50index_qvix",
        ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "date": "2024-04-02", "close": "inf" }
        ])),
    )
    .await;

    let readings = source_for(&server).fetch(&symbols(&["IF", "IH", "XX"])).await;
    let valid = validate_readings(readings.clone());

    assert_eq!(readings[0].implied_volatility, FUTURES_FALLBACK_IV);
    assert!(readings[0].is_default);
    assert_eq!(readings[1].implied_volatility, DEFAULT_FALLBACK_IV);
    assert!(readings[1].is_default);
    assert_eq!(
        valid.iter().map(|r| r.symbol.as_str()).collect::<Vec<_>>(),
        vec!["IF", "IH", "XX"]
    );
}
