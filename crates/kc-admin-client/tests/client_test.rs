// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! KeycloakAdmin tests: token caching and URL assembly.

use std::time::Duration;

use kc_admin_client::{
    AdminConfig, AdminError, KeycloakAdmin, Method, Query, RequestOptions, UserQuery,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";

async fn mount_token(server: &MockServer, expires_in: u64, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "admin-token", "expires_in": expires_in})),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn password_admin(server: &MockServer) -> KeycloakAdmin {
    KeycloakAdmin::new(AdminConfig::password(
        server.uri(),
        "master",
        "admin",
        "admin",
        "admin-cli",
    ))
    .unwrap()
}

// ==========================================================================
// Token cache
// ==========================================================================

#[tokio::test]
async fn test_bearer_requests_skip_token_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/acme/users"))
        .and(header("authorization", "Bearer static"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let admin = KeycloakAdmin::new(AdminConfig::bearer(server.uri(), "acme", "static")).unwrap();
    let users = admin.users().list(UserQuery::new()).await.unwrap();

    assert!(users.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_token_is_cached() {
    let server = MockServer::start().await;
    mount_token(&server, 300, 1).await;

    let admin = password_admin(&server);
    assert_eq!(admin.valid_token().await.unwrap(), "admin-token");
    assert_eq!(admin.valid_token().await.unwrap(), "admin-token");
}

#[tokio::test]
async fn test_token_close_to_expiry_is_refreshed() {
    let server = MockServer::start().await;
    // Lifetime shorter than the 30s skew: never considered fresh.
    mount_token(&server, 10, 2).await;

    let admin = password_admin(&server);
    admin.valid_token().await.unwrap();
    admin.valid_token().await.unwrap();
}

#[tokio::test]
async fn test_zero_skew_keeps_short_lived_token() {
    let server = MockServer::start().await;
    mount_token(&server, 10, 1).await;

    let config = AdminConfig::password(server.uri(), "master", "admin", "admin", "admin-cli")
        .with_token_expiry_skew(Duration::ZERO);
    let admin = KeycloakAdmin::new(config).unwrap();
    admin.valid_token().await.unwrap();
    admin.valid_token().await.unwrap();
}

#[tokio::test]
async fn test_invalidate_forces_new_token() {
    let server = MockServer::start().await;
    mount_token(&server, 300, 2).await;

    let admin = password_admin(&server);
    admin.valid_token().await.unwrap();
    admin.invalidate_token().await;
    admin.valid_token().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_callers_share_one_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "admin-token", "expires_in": 300}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let admin = password_admin(&server);
    let (a, b, c) = tokio::join!(admin.valid_token(), admin.valid_token(), admin.valid_token());

    assert_eq!(a.unwrap(), "admin-token");
    assert_eq!(b.unwrap(), "admin-token");
    assert_eq!(c.unwrap(), "admin-token");
}

#[tokio::test]
async fn test_clients_do_not_share_tokens() {
    let server = MockServer::start().await;
    mount_token(&server, 300, 2).await;

    let first = password_admin(&server);
    let second = password_admin(&server);
    first.valid_token().await.unwrap();
    second.valid_token().await.unwrap();
}

#[tokio::test]
async fn test_token_failure_stops_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_grant"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let admin = password_admin(&server);
    let err = admin.users().list(UserQuery::new()).await.unwrap_err();
    assert!(matches!(err, AdminError::Authentication(_)));
}

// ==========================================================================
// URL assembly
// ==========================================================================

#[tokio::test]
async fn test_password_login_then_list_users() {
    let server = MockServer::start().await;
    mount_token(&server, 300, 1).await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/master/users"))
        .and(header("authorization", "Bearer admin-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "u1", "username": "alice", "enabled": true},
            {"id": "u2", "username": "bob", "enabled": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let admin = password_admin(&server);
    let users = admin.users().list(UserQuery::new()).await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].username.as_deref(), Some("alice"));
    assert_eq!(users[1].enabled, Some(false));
}

#[tokio::test]
async fn test_query_string_encoding_and_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/acme/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let admin = KeycloakAdmin::new(AdminConfig::bearer(server.uri(), "acme", "t")).unwrap();
    let query = Query::new()
        .param("search", "al ice")
        .opt("first", None::<u32>)
        .param("enabled", true);
    admin
        .request("/users", Method::GET, None, query.into())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("search=al%20ice&enabled=true"));
}

#[tokio::test]
async fn test_request_without_realm() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/realms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"realm": "master"}])))
        .expect(1)
        .mount(&server)
        .await;

    let admin = KeycloakAdmin::new(AdminConfig::bearer(server.uri(), "acme", "t")).unwrap();
    let realms = admin.realms().list().await.unwrap();
    assert_eq!(realms[0].realm.as_deref(), Some("master"));
}

#[tokio::test]
async fn test_request_for_other_realm() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/other/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let admin = KeycloakAdmin::new(AdminConfig::bearer(server.uri(), "acme", "t")).unwrap();
    admin
        .request_for_realm("other", "/groups", Method::GET, None, RequestOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_request_for_empty_realm_is_rejected() {
    let server = MockServer::start().await;
    let admin = KeycloakAdmin::new(AdminConfig::bearer(server.uri(), "acme", "t")).unwrap();

    let err = admin
        .request_for_realm("", "/groups", Method::GET, None, RequestOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_realm_reports_404() {
    let server = MockServer::start().await;
    mount_token(&server, 300, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/admin/realms/nonexistent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Realm not found."})))
        .expect(1)
        .mount(&server)
        .await;

    let admin = password_admin(&server);
    let err = admin.realms().delete("nonexistent").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("Realm not found."));
}

#[test]
fn test_invalid_base_url_is_config_error() {
    let err = KeycloakAdmin::new(AdminConfig::bearer("ftp://sso.example.com", "acme", "t"))
        .unwrap_err();
    assert!(matches!(err, AdminError::Config(_)));
}
