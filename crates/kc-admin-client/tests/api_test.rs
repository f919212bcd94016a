// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource sub-API tests against a mock admin server.

use kc_admin_client::{
    AdminConfig, AdminError, ClientQuery, ClientRepresentation, GroupRepresentation,
    IdentityProviderMapperRepresentation, KeycloakAdmin, OrganizationRepresentation,
    PolicyRepresentation, RealmRepresentation, RoleRepresentation, UserRepresentation,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REALM: &str = "/admin/realms/acme";

async fn setup() -> (MockServer, KeycloakAdmin) {
    let server = MockServer::start().await;
    let admin = KeycloakAdmin::new(AdminConfig::bearer(server.uri(), "acme", "t")).unwrap();
    (server, admin)
}

fn created_at(server: &MockServer, suffix: &str) -> ResponseTemplate {
    ResponseTemplate::new(201).insert_header(
        "Location",
        format!("{}{}{}", server.uri(), REALM, suffix).as_str(),
    )
}

// ==========================================================================
// Users
// ==========================================================================

#[tokio::test]
async fn test_create_user_returns_id() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/users", REALM)))
        .and(body_json(json!({"username": "alice", "enabled": true})))
        .respond_with(created_at(&server, "/users/9f3c"))
        .expect(1)
        .mount(&server)
        .await;

    let id = admin
        .users()
        .create(&UserRepresentation::new("alice"))
        .await
        .unwrap();
    assert_eq!(id, "9f3c");
}

#[tokio::test]
async fn test_find_by_username_is_exact() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/users", REALM)))
        .and(query_param("username", "alice"))
        .and(query_param("exact", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "u1", "username": "alice"}])))
        .expect(1)
        .mount(&server)
        .await;

    let user = admin.users().find_by_username("alice").await.unwrap();
    assert_eq!(user.and_then(|u| u.id).as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_user_count() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/users/count", REALM)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(42)))
        .mount(&server)
        .await;

    let count = admin
        .users()
        .count(Default::default())
        .await
        .unwrap();
    assert_eq!(count, 42);
}

#[tokio::test]
async fn test_reset_password_body() {
    let (server, admin) = setup().await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/users/u1/reset-password", REALM)))
        .and(body_json(json!({"type": "password", "value": "n3w", "temporary": false})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    admin.users().reset_password("u1", "n3w", false).await.unwrap();
}

#[tokio::test]
async fn test_execute_actions_email() {
    let (server, admin) = setup().await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/users/u1/execute-actions-email", REALM)))
        .and(query_param("lifespan", "3600"))
        .and(body_json(json!(["UPDATE_PASSWORD", "VERIFY_EMAIL"])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    admin
        .users()
        .execute_actions_email(
            "u1",
            &["UPDATE_PASSWORD".to_string(), "VERIFY_EMAIL".to_string()],
            Some(3600),
            None,
            None,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_validation_happens_before_any_call() {
    let (server, admin) = setup().await;

    let results = [
        admin.users().get("").await.map(|_| ()),
        admin.users().delete(" ").await,
        admin.users().join_group("u1", "").await,
        admin
            .users()
            .execute_actions_email("u1", &[], None, None, None)
            .await,
        admin.groups().create(&GroupRepresentation::default()).await.map(|_| ()),
        admin.roles().get("").await.map(|_| ()),
        admin.client_roles("").list(Default::default()).await.map(|_| ()),
        admin.user_role_mappings("u1").add_realm(&[]).await,
        admin.authorization("").settings().await.map(|_| ()),
    ];

    for result in results {
        assert!(matches!(result, Err(AdminError::Validation(_))));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ==========================================================================
// Groups
// ==========================================================================

#[tokio::test]
async fn test_group_count_unwraps_object() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/groups/count", REALM)))
        .and(query_param("search", "eng"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 7})))
        .mount(&server)
        .await;

    assert_eq!(admin.groups().count(Some("eng")).await.unwrap(), 7);
}

#[tokio::test]
async fn test_create_child_group_reads_id_from_body() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/groups/g1/children", REALM)))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "g2", "name": "backend"})),
        )
        .mount(&server)
        .await;

    let id = admin
        .groups()
        .create_child("g1", &GroupRepresentation::new("backend"))
        .await
        .unwrap();
    assert_eq!(id, "g2");
}

// ==========================================================================
// Roles & mappings
// ==========================================================================

#[tokio::test]
async fn test_client_role_create_returns_decoded_name() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/clients/c1/roles", REALM)))
        .respond_with(created_at(&server, "/clients/c1/roles/app%20admin"))
        .expect(1)
        .mount(&server)
        .await;

    let name = admin
        .client_roles("c1")
        .create(&RoleRepresentation::new("app admin"))
        .await
        .unwrap();
    assert_eq!(name, "app admin");
}

#[tokio::test]
async fn test_realm_role_path_is_encoded() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/roles/read%20only", REALM)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "r1", "name": "read only"})))
        .expect(1)
        .mount(&server)
        .await;

    let role = admin.roles().get("read only").await.unwrap();
    assert_eq!(role.id.as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_add_realm_role_mapping() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/users/u1/role-mappings/realm", REALM)))
        .and(body_json(json!([{"id": "r1", "name": "auditor"}])))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    admin
        .user_role_mappings("u1")
        .add_realm(&[RoleRepresentation::reference("r1", "auditor")])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_group_client_mappings_available() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/groups/g1/role-mappings/clients/c1/available", REALM)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "view"}])))
        .expect(1)
        .mount(&server)
        .await;

    let roles = admin
        .group_role_mappings("g1")
        .client_available("c1")
        .await
        .unwrap();
    assert_eq!(roles[0].name.as_deref(), Some("view"));
}

#[tokio::test]
async fn test_client_scope_scope_mappings_path() {
    let (server, admin) = setup().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/client-scopes/s1/scope-mappings/realm", REALM)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    admin
        .client_scopes()
        .scope_mappings("s1")
        .remove_realm(&[RoleRepresentation::reference("r1", "auditor")])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_all_mappings_tolerates_empty_body() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/users/u1/role-mappings", REALM)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let mappings = admin.users().role_mappings("u1").all().await.unwrap();
    assert!(mappings.realm_mappings.is_empty());
}

// ==========================================================================
// Clients
// ==========================================================================

#[tokio::test]
async fn test_find_client_by_client_id() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/clients", REALM)))
        .and(query_param("clientId", "portal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(admin.clients().find_by_client_id("portal").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_client_returns_uuid() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/clients", REALM)))
        .respond_with(created_at(&server, "/clients/6a1e"))
        .mount(&server)
        .await;

    let id = admin
        .clients()
        .create(&ClientRepresentation::new("portal").service_account())
        .await
        .unwrap();
    assert_eq!(id, "6a1e");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["serviceAccountsEnabled"], true);
    assert_eq!(sent["publicClient"], false);
}

#[tokio::test]
async fn test_list_clients_with_search() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/clients", REALM)))
        .and(query_param("clientId", "port"))
        .and(query_param("search", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "c1", "clientId": "portal"}])))
        .expect(1)
        .mount(&server)
        .await;

    let clients = admin
        .clients()
        .list(ClientQuery::new().with_search("port"))
        .await
        .unwrap();
    assert_eq!(clients[0].client_id.as_deref(), Some("portal"));
}

#[tokio::test]
async fn test_download_keystore_is_binary() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/clients/c1/certificates/jwt.credential/download", REALM)))
        .and(header("accept", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1u8, 2, 3], "application/octet-stream"))
        .mount(&server)
        .await;

    let bytes = admin
        .clients()
        .download_keystore("c1", "jwt.credential", &json!({"format": "JKS"}))
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), &[1u8, 2, 3]);
}

// ==========================================================================
// Realms
// ==========================================================================

#[tokio::test]
async fn test_create_realm_without_realm_prefix() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path("/admin/realms"))
        .and(body_json(json!({"realm": "beta", "enabled": true})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    admin
        .realms()
        .create(&RealmRepresentation::new("beta"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_partial_export_flags() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path("/admin/realms/beta/partial-export"))
        .and(query_param("exportClients", "true"))
        .and(query_param("exportGroupsAndRoles", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"realm": "beta"})))
        .expect(1)
        .mount(&server)
        .await;

    let exported = admin.realms().partial_export("beta", true, false).await.unwrap();
    assert_eq!(exported.realm.as_deref(), Some("beta"));
}

#[tokio::test]
async fn test_localization_text_is_plain() {
    let (server, admin) = setup().await;
    Mock::given(method("PUT"))
        .and(path("/admin/realms/beta/localization/de/loginTitle"))
        .and(header("content-type", "text/plain"))
        .and(body_string("Willkommen"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    admin
        .realms()
        .put_localization_text("beta", "de", "loginTitle", "Willkommen")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_localization_text_reads_plain_body() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path("/admin/realms/beta/localization/de/loginTitle"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain;charset=UTF-8")
                .set_body_string("Willkommen"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let text = admin
        .realms()
        .get_localization_text("beta", "de", "loginTitle")
        .await
        .unwrap();
    assert_eq!(text, "Willkommen");
}

#[tokio::test]
async fn test_delete_localization_text() {
    let (server, admin) = setup().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/realms/beta/localization/de/loginTitle"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    admin
        .realms()
        .delete_localization_text("beta", "de", "loginTitle")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_localization_key_required() {
    let (server, admin) = setup().await;

    let err = admin
        .realms()
        .get_localization_text("beta", "de", " ")
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ==========================================================================
// Organizations & identity providers
// ==========================================================================

#[tokio::test]
async fn test_create_organization_returns_id() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/organizations", REALM)))
        .respond_with(created_at(&server, "/organizations/o1"))
        .mount(&server)
        .await;

    let id = admin
        .organizations()
        .create(&OrganizationRepresentation::new("Acme").with_domain("acme.com"))
        .await
        .unwrap();
    assert_eq!(id, "o1");
}

#[tokio::test]
async fn test_invite_existing_user_is_form_encoded() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/organizations/o1/members/invite-existing-user", REALM)))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("id=u1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    admin
        .organizations()
        .invite_existing_user("o1", "u1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_add_member_sends_bare_id() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/organizations/o1/members", REALM)))
        .and(body_string(r#""u1""#))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    admin.organizations().add_member("o1", "u1").await.unwrap();
}

#[tokio::test]
async fn test_identity_provider_mapper_create_returns_id() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/identity-provider/instances/github/mappers", REALM)))
        .respond_with(created_at(&server, "/identity-provider/instances/github/mappers/m1"))
        .expect(1)
        .mount(&server)
        .await;

    let mapper = IdentityProviderMapperRepresentation {
        name: Some("email".to_string()),
        identity_provider_mapper: Some("github-user-attribute-mapper".to_string()),
        ..Default::default()
    };
    let id = admin
        .identity_providers()
        .create_mapper("github", &mapper)
        .await
        .unwrap();
    assert_eq!(id, "m1");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["identityProviderAlias"], "github");
}

// ==========================================================================
// Authorization services
// ==========================================================================

#[tokio::test]
async fn test_create_role_policy() {
    let (server, admin) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/clients/c1/authz/resource-server/policy/role", REALM)))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "p1", "name": "admins", "type": "role"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let policy = admin
        .authorization("c1")
        .create_policy("role", &PolicyRepresentation::new("admins"))
        .await
        .unwrap();
    assert_eq!(policy.id.as_deref(), Some("p1"));
    assert_eq!(policy.policy_type.as_deref(), Some("role"));
}

#[tokio::test]
async fn test_component_sub_types_query() {
    let (server, admin) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/components/ldap1/sub-component-types", REALM)))
        .and(query_param(
            "type",
            "org.keycloak.storage.ldap.mappers.LDAPStorageMapper",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "user-attribute-ldap-mapper"}])))
        .expect(1)
        .mount(&server)
        .await;

    let types = admin
        .components()
        .sub_component_types("ldap1", "org.keycloak.storage.ldap.mappers.LDAPStorageMapper")
        .await
        .unwrap();
    assert_eq!(types[0].id, "user-attribute-ldap-mapper");
}
