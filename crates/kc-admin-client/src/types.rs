// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Admin REST representations and list query options.
//!
//! Only the commonly used fields are typed. Everything else the server sends
//! is kept in `extra` and written back unchanged on update.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::request::Query;

/// Multi-valued attributes as stored by Keycloak.
pub type Attributes = HashMap<String, Vec<String>>;

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<CredentialRepresentation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub federation_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_client_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRepresentation {
    /// A new enabled user with the given username.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            enabled: Some(true),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>, temporary: bool) -> Self {
        self.credentials = Some(vec![CredentialRepresentation::password(
            password, temporary,
        )]);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CredentialRepresentation {
    /// A password credential.
    pub fn password(value: impl Into<String>, temporary: bool) -> Self {
        Self {
            credential_type: Some("password".to_string()),
            value: Some(value.into()),
            temporary: Some(temporary),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSessionRepresentation {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub last_access: Option<i64>,
    #[serde(default)]
    pub clients: HashMap<String, String>,
}

/// Query options for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub search: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub exact: Option<bool>,
    pub enabled: Option<bool>,
    pub email_verified: Option<bool>,
    pub brief_representation: Option<bool>,
    /// Attribute search, `key:value key2:value2`.
    pub q: Option<String>,
    pub first: Option<u32>,
    pub max: Option<u32>,
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>, exact: bool) -> Self {
        self.username = Some(username.into());
        self.exact = Some(exact);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_attribute_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_page(mut self, first: u32, max: u32) -> Self {
        self.first = Some(first);
        self.max = Some(max);
        self
    }

    pub(crate) fn to_query(&self) -> Query {
        Query::new()
            .opt("search", self.search.as_ref())
            .opt("username", self.username.as_ref())
            .opt("email", self.email.as_ref())
            .opt("firstName", self.first_name.as_ref())
            .opt("lastName", self.last_name.as_ref())
            .opt("exact", self.exact)
            .opt("enabled", self.enabled)
            .opt("emailVerified", self.email_verified)
            .opt("briefRepresentation", self.brief_representation)
            .opt("q", self.q.as_ref())
            .opt("first", self.first)
            .opt("max", self.max)
    }
}

// ============================================================================
// Groups
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_group_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_groups: Option<Vec<GroupRepresentation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm_roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_roles: Option<HashMap<String, Vec<String>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GroupRepresentation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Query options for listing groups (and group children or members).
#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub search: Option<String>,
    pub exact: Option<bool>,
    pub brief_representation: Option<bool>,
    pub first: Option<u32>,
    pub max: Option<u32>,
}

impl GroupQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }

    pub fn with_page(mut self, first: u32, max: u32) -> Self {
        self.first = Some(first);
        self.max = Some(max);
        self
    }

    pub(crate) fn to_query(&self) -> Query {
        Query::new()
            .opt("search", self.search.as_ref())
            .opt("exact", self.exact)
            .opt("briefRepresentation", self.brief_representation)
            .opt("first", self.first)
            .opt("max", self.max)
    }
}

/// `{"count": n}` as returned by the count endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

// ============================================================================
// Realms
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_with_email_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizations_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token_lifespan: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_required: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RealmRepresentation {
    /// A new enabled realm.
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: Some(realm.into()),
            enabled: Some(true),
            ..Default::default()
        }
    }
}

/// Result of a partial import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialImportResult {
    #[serde(default)]
    pub overwritten: u64,
    #[serde(default)]
    pub added: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Active realm keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeysMetadataRepresentation {
    #[serde(default)]
    pub active: HashMap<String, String>,
    #[serde(default)]
    pub keys: Vec<Value>,
}

/// Login or admin event. Fields differ between the two kinds, so most are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRepresentation {
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub realm_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub resource_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query options for the event endpoints.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub types: Vec<String>,
    pub client: Option<String>,
    pub user: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub ip_address: Option<String>,
    pub first: Option<u32>,
    pub max: Option<u32>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.types.push(event_type.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user = Some(user_id.into());
        self
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = Some(client.into());
        self
    }

    pub fn with_dates(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.date_from = Some(from.into());
        self.date_to = Some(to.into());
        self
    }

    pub fn with_page(mut self, first: u32, max: u32) -> Self {
        self.first = Some(first);
        self.max = Some(max);
        self
    }

    pub(crate) fn to_query(&self) -> Query {
        let mut query = Query::new();
        for event_type in &self.types {
            query = query.param("type", event_type);
        }
        query
            .opt("client", self.client.as_ref())
            .opt("user", self.user.as_ref())
            .opt("dateFrom", self.date_from.as_ref())
            .opt("dateTo", self.date_to.as_ref())
            .opt("ipAddress", self.ip_address.as_ref())
            .opt("first", self.first)
            .opt("max", self.max)
    }
}

// ============================================================================
// Clients & client scopes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_client: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_flow_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_access_grants_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_accounts_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_services_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_mappers: Option<Vec<ProtocolMapperRepresentation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_client_scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_client_scopes: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientRepresentation {
    /// A new enabled OpenID Connect client.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            enabled: Some(true),
            protocol: Some("openid-connect".to_string()),
            ..Default::default()
        }
    }

    /// Confidential client with the service account enabled.
    pub fn service_account(mut self) -> Self {
        self.public_client = Some(false);
        self.service_accounts_enabled = Some(true);
        self
    }
}

/// Query options for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ClientQuery {
    pub client_id: Option<String>,
    /// Treat `client_id` as a substring search.
    pub search: Option<bool>,
    pub viewable_only: Option<bool>,
    pub first: Option<u32>,
    pub max: Option<u32>,
}

impl ClientQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_search(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.search = Some(true);
        self
    }

    pub fn with_page(mut self, first: u32, max: u32) -> Self {
        self.first = Some(first);
        self.max = Some(max);
        self
    }

    pub(crate) fn to_query(&self) -> Query {
        Query::new()
            .opt("clientId", self.client_id.as_ref())
            .opt("search", self.search)
            .opt("viewableOnly", self.viewable_only)
            .opt("first", self.first)
            .opt("max", self.max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMapperRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_mapper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScopeRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_mappers: Option<Vec<ProtocolMapperRepresentation>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClientScopeRepresentation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            protocol: Some("openid-connect".to_string()),
            ..Default::default()
        }
    }
}

// ============================================================================
// Roles
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_role: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RoleRepresentation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Reference to an existing role by id and name, as role-mapping
    /// endpoints expect.
    pub fn reference(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Query options for listing roles.
#[derive(Debug, Clone, Default)]
pub struct RoleQuery {
    pub search: Option<String>,
    pub brief_representation: Option<bool>,
    pub first: Option<u32>,
    pub max: Option<u32>,
}

impl RoleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_page(mut self, first: u32, max: u32) -> Self {
        self.first = Some(first);
        self.max = Some(max);
        self
    }

    pub(crate) fn to_query(&self) -> Query {
        Query::new()
            .opt("search", self.search.as_ref())
            .opt("briefRepresentation", self.brief_representation)
            .opt("first", self.first)
            .opt("max", self.max)
    }
}

/// All role mappings of a user, group or client scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingsRepresentation {
    #[serde(default)]
    pub realm_mappings: Vec<RoleRepresentation>,
    #[serde(default)]
    pub client_mappings: HashMap<String, ClientMappingsRepresentation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMappingsRepresentation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub mappings: Vec<RoleRepresentation>,
}

// ============================================================================
// Organizations
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<OrganizationDomainRepresentation>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrganizationRepresentation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            enabled: Some(true),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains
            .get_or_insert_with(Vec::new)
            .push(OrganizationDomainRepresentation {
                name: domain.into(),
                verified: None,
            });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationDomainRepresentation {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// Query options for listing organizations.
#[derive(Debug, Clone, Default)]
pub struct OrganizationQuery {
    pub search: Option<String>,
    pub exact: Option<bool>,
    pub brief_representation: Option<bool>,
    pub first: Option<u32>,
    pub max: Option<u32>,
}

impl OrganizationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }

    pub fn with_page(mut self, first: u32, max: u32) -> Self {
        self.first = Some(first);
        self.max = Some(max);
        self
    }

    pub(crate) fn to_query(&self) -> Query {
        Query::new()
            .opt("search", self.search.as_ref())
            .opt("exact", self.exact)
            .opt("briefRepresentation", self.brief_representation)
            .opt("first", self.first)
            .opt("max", self.max)
    }
}

// ============================================================================
// Identity providers
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_token: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_broker_login_flow_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdentityProviderRepresentation {
    pub fn new(alias: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            provider_id: Some(provider_id.into()),
            enabled: Some(true),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderMapperRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_provider_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_provider_mapper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<HashMap<String, String>>,
}

// ============================================================================
// Components
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Attributes>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTypeRepresentation {
    pub id: String,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub properties: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Query options for listing components.
#[derive(Debug, Clone, Default)]
pub struct ComponentQuery {
    pub name: Option<String>,
    pub parent: Option<String>,
    pub component_type: Option<String>,
}

impl ComponentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_type(mut self, component_type: impl Into<String>) -> Self {
        self.component_type = Some(component_type.into());
        self
    }

    pub(crate) fn to_query(&self) -> Query {
        Query::new()
            .opt("name", self.name.as_ref())
            .opt("parent", self.parent.as_ref())
            .opt("type", self.component_type.as_ref())
    }
}

// ============================================================================
// Authorization services
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceServerRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_remote_resource_management: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_enforcement_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_strategy: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRepresentation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<ScopeRepresentation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_managed_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceRepresentation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_uri: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScopeRepresentation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// A policy or a permission; permissions are policies of type `resource` or `scope`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PolicyRepresentation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Query options for the authorization list endpoints.
#[derive(Debug, Clone, Default)]
pub struct AuthzQuery {
    pub name: Option<String>,
    pub first: Option<u32>,
    pub max: Option<u32>,
}

impl AuthzQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_page(mut self, first: u32, max: u32) -> Self {
        self.first = Some(first);
        self.max = Some(max);
        self
    }

    pub(crate) fn to_query(&self) -> Query {
        Query::new()
            .opt("name", self.name.as_ref())
            .opt("first", self.first)
            .opt("max", self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_serializes_camel_case_and_skips_unset() {
        let user = UserRepresentation::new("alice")
            .with_email("alice@example.com")
            .with_name("Alice", "Liddell");
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            json!({
                "username": "alice",
                "enabled": true,
                "email": "alice@example.com",
                "firstName": "Alice",
                "lastName": "Liddell"
            })
        );
    }

    #[test]
    fn test_unknown_fields_round_trip_through_extra() {
        let user: UserRepresentation = serde_json::from_value(json!({
            "id": "u1",
            "username": "bob",
            "totp": false,
            "access": {"manage": true}
        }))
        .unwrap();
        assert_eq!(user.extra.get("totp"), Some(&json!(false)));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["access"]["manage"], json!(true));
    }

    #[test]
    fn test_credential_type_field_name() {
        let cred = CredentialRepresentation::password("pw", true);
        let value = serde_json::to_value(&cred).unwrap();
        assert_eq!(value["type"], "password");
        assert_eq!(value["temporary"], true);
    }

    #[test]
    fn test_resource_id_field_name() {
        let resource: ResourceRepresentation =
            serde_json::from_value(json!({"_id": "r-1", "name": "docs"})).unwrap();
        assert_eq!(resource.id.as_deref(), Some("r-1"));
    }

    #[test]
    fn test_user_query_order_and_names() {
        let query = UserQuery::new()
            .with_search("al ice")
            .with_enabled(true)
            .with_page(0, 20)
            .to_query();
        assert_eq!(
            query.to_query_string(),
            "search=al%20ice&enabled=true&first=0&max=20"
        );
    }

    #[test]
    fn test_event_query_repeats_type() {
        let query = EventQuery::new()
            .with_type("LOGIN")
            .with_type("LOGOUT")
            .to_query();
        assert_eq!(query.to_query_string(), "type=LOGIN&type=LOGOUT");
    }

    #[test]
    fn test_mappings_tolerate_missing_sections() {
        let mappings: MappingsRepresentation = serde_json::from_value(json!({})).unwrap();
        assert!(mappings.realm_mappings.is_empty());
        assert!(mappings.client_mappings.is_empty());
    }
}
