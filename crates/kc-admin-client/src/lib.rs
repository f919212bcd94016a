// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Keycloak Admin Client
//!
//! Typed client for the Keycloak admin REST API.
//!
//! The crate is thin endpoint bindings on top of shared plumbing:
//! - Token acquisition (bearer, client credentials, password grant) and caching
//! - Request construction (URL assembly, query encoding, header overrides)
//! - Response shaping into [`ApiResponse`] (JSON, created id, empty, text, binary)
//!
//! # Architecture
//!
//! [`KeycloakAdmin`] owns the configuration, one HTTP client and the admin
//! token. Resource families are exposed as borrowed sub-APIs:
//! - [`UsersApi`], [`GroupsApi`], [`ClientsApi`], [`ClientScopesApi`]
//! - [`RealmsApi`] for realm-level operations on any realm
//! - [`RolesApi`] for realm roles and client roles
//! - [`MappingsClient`] for role and scope mappings
//! - [`OrganizationsApi`], [`IdentityProvidersApi`], [`ComponentsApi`], [`AuthorizationApi`]
//!
//! Endpoints without a typed binding are reachable through
//! [`KeycloakAdmin::request`].
//!
//! # Example
//!
//! ```no_run
//! use kc_admin_client::{AdminConfig, KeycloakAdmin, UserRepresentation};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let admin = KeycloakAdmin::new(AdminConfig::client_credentials(
//!     "https://sso.example.com",
//!     "acme",
//!     "provisioner",
//!     "s3cr3t",
//! ))?;
//!
//! // Create a user and grant it a realm role
//! let user = UserRepresentation::new("alice")
//!     .with_email("alice@example.com")
//!     .with_password("change-me", true);
//! let user_id = admin.users().create(&user).await?;
//!
//! let role = admin.roles().get("auditor").await?;
//! admin.user_role_mappings(&user_id).add_realm(&[role]).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
mod client;
mod config;
mod error;
mod executor;
mod request;
mod response;
mod token;
mod types;

pub use api::{
    AuthorizationApi, ClientScopesApi, ClientsApi, ComponentsApi, GroupsApi,
    IdentityProvidersApi, MappingsClient, OrganizationsApi, RealmsApi, RolesApi, UsersApi,
};
pub use client::KeycloakAdmin;
pub use config::{AdminConfig, AuthMethod, Credentials, DEFAULT_ADMIN_CLIENT_ID};
pub use error::{AdminError, Result};
pub use executor::execute;
pub use request::{
    Body, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT, Method, Query, RequestOptions,
};
pub use response::{ApiResponse, ID_RETURNING_COLLECTIONS, ResponseParts, interpret};
pub use token::{AccessToken, fetch_token};
pub use types::{
    Attributes, AuthzQuery, ClientMappingsRepresentation, ClientQuery, ClientRepresentation,
    ClientScopeRepresentation, ComponentQuery, ComponentRepresentation,
    ComponentTypeRepresentation, CountResponse, CredentialRepresentation, EventQuery,
    EventRepresentation, GroupQuery, GroupRepresentation, IdentityProviderMapperRepresentation,
    IdentityProviderRepresentation, KeysMetadataRepresentation, MappingsRepresentation,
    OrganizationDomainRepresentation, OrganizationQuery, OrganizationRepresentation,
    PartialImportResult, PolicyRepresentation, ProtocolMapperRepresentation, RealmRepresentation,
    ResourceRepresentation, ResourceServerRepresentation, RoleQuery, RoleRepresentation,
    ScopeRepresentation, UserQuery, UserRepresentation, UserSessionRepresentation,
};
