/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Fetcher tests against a local mock HTTP server.

use ccm_widget_client::{ApiClient, FetchError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_widget_config_derives_dialer_uri() {
    let server = MockServer::start().await;
    serve_json(
        &server,
        "/widget-configs/w-42",
        json!({
            "widgetIdentifier": "w-42",
            "webRtc": {
                "wssFs": "wss://fs.example.com:7443",
                "uriFs": "10.0.0.5",
                "diallingUri": "1001",
                "sipExtension": "2002",
                "extensionPassword": "pw",
                "enabledSipLogs": false
            }
        }),
    )
    .await;

    let client = ApiClient::new(&server.uri());
    let config = client.widget_config("w-42").await.unwrap();

    assert_eq!(config.dialer.dialer_uri, "sip:1001@10.0.0.5");
    assert_eq!(config.dialer.server_host, "wss://fs.example.com:7443");
    assert_eq!(config.raw["widgetIdentifier"], "w-42");
}

#[tokio::test]
async fn test_widget_config_http_error_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widget-configs/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such widget"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri());
    let err = client.widget_config("missing").await.unwrap_err();

    assert_eq!(err.http_status(), Some(404));
    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such widget");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_widget_config_malformed_json_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widget-configs/w-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri());
    let err = client.widget_config("w-1").await.unwrap_err();
    assert!(matches!(err, FetchError::Json(_)), "got {err:?}");
}

#[tokio::test]
async fn test_widget_config_without_web_rtc_is_a_decode_error() {
    let server = MockServer::start().await;
    serve_json(&server, "/widget-configs/w-1", json!({ "theme": "dark" })).await;

    let client = ApiClient::new(&server.uri());
    let err = client.widget_config("w-1").await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_pre_chat_form_returns_raw_body() {
    let server = MockServer::start().await;
    let form = json!({
        "id": "pre-chat",
        "attributes": [{ "key": "email", "type": "email", "isRequired": true }]
    });
    serve_json(&server, "/forms/pre-chat", form.clone()).await;

    let client = ApiClient::new(&format!("{}/", server.uri()));
    let definition = client.pre_chat_form("pre-chat").await.unwrap();
    assert_eq!(definition.into_inner(), form);
}

#[tokio::test]
async fn test_form_validation_returns_raw_body() {
    let server = MockServer::start().await;
    let rules = json!([{ "type": "email", "regex": "^.+@.+$" }]);
    serve_json(&server, "/formValidation", rules.clone()).await;

    let client = ApiClient::new(&server.uri());
    let validation = client.form_validation().await.unwrap();
    assert_eq!(validation.as_value(), &rules);
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let client = ApiClient::new("http://127.0.0.1:1");
    let err = client.form_validation().await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_empty_form_id_is_rejected_before_sending() {
    let server = MockServer::start().await;
    let client = ApiClient::new(&server.uri());
    let err = client.pre_chat_form("").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
