// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Token endpoint tests against a mock server.

use kc_admin_client::{AdminConfig, AdminError, fetch_token};
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";

#[tokio::test]
async fn test_bearer_mode_makes_no_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = AdminConfig::bearer(server.uri(), "master", "preissued");
    let token = fetch_token(&reqwest::Client::new(), &config)
        .await
        .unwrap();

    assert_eq!(token.value, "preissued");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_client_credentials_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "grant_type=client_credentials&client_id=provisioner&client_secret=s3cr3t",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "cc-token", "expires_in": 300})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = AdminConfig::client_credentials(server.uri(), "master", "provisioner", "s3cr3t");
    let token = fetch_token(&reqwest::Client::new(), &config)
        .await
        .unwrap();

    assert_eq!(token.value, "cc-token");
    assert_eq!(token.expires_in, Some(std::time::Duration::from_secs(300)));
}

#[tokio::test]
async fn test_password_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string(
            "grant_type=password&client_id=admin-cli&username=admin&password=p%40ss+word",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "pw-token"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = AdminConfig::password(server.uri(), "master", "admin", "p@ss word", "admin-cli");
    let token = fetch_token(&reqwest::Client::new(), &config)
        .await
        .unwrap();

    assert_eq!(token.value, "pw-token");
    assert!(token.expires_in.is_none());
}

#[tokio::test]
async fn test_rejected_credentials_carry_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid user credentials"
        })))
        .mount(&server)
        .await;

    let config = AdminConfig::password(server.uri(), "master", "admin", "wrong", "admin-cli");
    let err = fetch_token(&reqwest::Client::new(), &config)
        .await
        .unwrap_err();

    match err {
        AdminError::Authentication(message) => {
            assert!(message.contains("401"));
            assert!(message.contains("Invalid user credentials"));
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_access_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
        .mount(&server)
        .await;

    let config = AdminConfig::client_credentials(server.uri(), "master", "svc", "secret");
    let err = fetch_token(&reqwest::Client::new(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Authentication(_)));
    assert!(err.to_string().contains("no access_token"));
}

#[tokio::test]
async fn test_empty_access_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": ""})))
        .mount(&server)
        .await;

    let config = AdminConfig::client_credentials(server.uri(), "master", "svc", "secret");
    let err = fetch_token(&reqwest::Client::new(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Authentication(_)));
}

#[tokio::test]
async fn test_non_json_success_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let config = AdminConfig::client_credentials(server.uri(), "master", "svc", "secret");
    let err = fetch_token(&reqwest::Client::new(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Authentication(_)));
    assert!(err.to_string().contains("not valid JSON"));
}

#[tokio::test]
async fn test_unreachable_endpoint_names_url() {
    let config = AdminConfig::client_credentials("http://127.0.0.1:1", "master", "svc", "secret");
    let err = fetch_token(&reqwest::Client::new(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Authentication(_)));
    assert!(err.to_string().contains(
        "http://127.0.0.1:1/realms/master/protocol/openid-connect/token"
    ));
}

#[tokio::test]
async fn test_token_url_uses_configured_realm() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/realms/acme/protocol/openid-connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "acme"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = AdminConfig::client_credentials(server.uri(), "acme", "svc", "secret");
    let token = fetch_token(&reqwest::Client::new(), &config)
        .await
        .unwrap();
    assert_eq!(token.value, "acme");
}
