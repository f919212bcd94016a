// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! KeycloakAdmin client for the Keycloak admin REST API.

use tracing::{debug, error, instrument};

use crate::api::{
    AuthorizationApi, ClientScopesApi, ClientsApi, ComponentsApi, GroupsApi,
    IdentityProvidersApi, MappingsClient, OrganizationsApi, RealmsApi, RolesApi, UsersApi,
};
use crate::config::AdminConfig;
use crate::error::{AdminError, Result};
use crate::executor;
use crate::request::{Body, Method, RequestOptions};
use crate::response::ApiResponse;
use crate::token::TokenCache;

/// High-level client for the Keycloak admin API.
///
/// Owns the configuration, one HTTP connection pool and the admin token for
/// its realm. The token is fetched on first use and refreshed when it is close
/// to expiry; two clients never share a token.
///
/// Resource families are reached through borrowed sub-APIs:
///
/// ```no_run
/// use kc_admin_client::{AdminConfig, KeycloakAdmin, UserQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let admin = KeycloakAdmin::new(AdminConfig::password(
///     "http://localhost:8080",
///     "master",
///     "admin",
///     "admin",
///     "admin-cli",
/// ))?;
///
/// let users = admin.users().list(UserQuery::new().with_search("alice")).await?;
/// println!("found {} users", users.len());
/// # Ok(())
/// # }
/// ```
pub struct KeycloakAdmin {
    config: AdminConfig,
    http: reqwest::Client,
    tokens: TokenCache,
}

impl KeycloakAdmin {
    /// Create a client with the given configuration.
    pub fn new(config: AdminConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AdminError::Config(format!("failed to build HTTP client: {}", e)))?;

        Self::with_http_client(config, http)
    }

    /// Create a client that reuses an existing reqwest client.
    pub fn with_http_client(config: AdminConfig, http: reqwest::Client) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            http,
            tokens: TokenCache::new(),
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(AdminConfig::from_env()?)
    }

    /// Get the client configuration.
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Realm this client is bound to.
    pub fn realm(&self) -> &str {
        &self.config.realm
    }

    // =========================================================================
    // Token
    // =========================================================================

    /// Return the cached admin token, fetching a new one when none is cached
    /// or the cached one is about to expire.
    pub async fn valid_token(&self) -> Result<String> {
        self.tokens.get(&self.http, &self.config).await
    }

    /// Drop the cached token; the next request authenticates again.
    pub async fn invalidate_token(&self) {
        debug!("Invalidating cached admin token");
        self.tokens.clear().await;
    }

    // =========================================================================
    // Request dispatch
    // =========================================================================

    /// Call `{base}/admin/realms/{realm}{endpoint}` for the configured realm.
    #[instrument(skip(self, body, options), fields(realm = %self.config.realm))]
    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        let base = format!(
            "{}/realms/{}",
            self.config.admin_url(),
            urlencoding::encode(&self.config.realm)
        );
        self.dispatch(base, endpoint, method, body, options).await
    }

    /// Call `{base}/admin/realms{endpoint}`, for endpoints that list or
    /// create realms themselves.
    #[instrument(skip(self, body, options))]
    pub async fn request_without_realm(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        let base = format!("{}/realms", self.config.admin_url());
        self.dispatch(base, endpoint, method, body, options).await
    }

    /// Call `{base}/admin/realms/{realm}{endpoint}` for a realm other than
    /// the configured one. The token of the configured realm is used.
    #[instrument(skip(self, body, options))]
    pub async fn request_for_realm(
        &self,
        realm: &str,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        crate::error::require(realm, "realm name")?;
        let base = format!(
            "{}/realms/{}",
            self.config.admin_url(),
            urlencoding::encode(realm)
        );
        self.dispatch(base, endpoint, method, body, options).await
    }

    async fn dispatch(
        &self,
        base: String,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<ApiResponse> {
        let url = options.query.append_to(&format!("{}{}", base, endpoint));

        let result = async {
            let token = self.valid_token().await?;
            executor::execute(&self.http, &url, method, &token, body.as_ref(), &options).await
        }
        .await;

        if let Err(e) = &result {
            error!(endpoint = %endpoint, error = %e, "Admin request failed");
        }
        result
    }

    // =========================================================================
    // Resource APIs
    // =========================================================================

    /// Users of the configured realm.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    /// Groups of the configured realm.
    pub fn groups(&self) -> GroupsApi<'_> {
        GroupsApi::new(self)
    }

    /// Realm management (list, create, delete and realm-level settings).
    pub fn realms(&self) -> RealmsApi<'_> {
        RealmsApi::new(self)
    }

    /// Clients (applications) of the configured realm.
    pub fn clients(&self) -> ClientsApi<'_> {
        ClientsApi::new(self)
    }

    /// Realm roles.
    pub fn roles(&self) -> RolesApi<'_> {
        RolesApi::realm(self)
    }

    /// Roles of one client, addressed by the client's internal id.
    pub fn client_roles(&self, client_uuid: &str) -> RolesApi<'_> {
        RolesApi::client(self, client_uuid)
    }

    /// Client scopes of the configured realm.
    pub fn client_scopes(&self) -> ClientScopesApi<'_> {
        ClientScopesApi::new(self)
    }

    /// Organizations of the configured realm.
    pub fn organizations(&self) -> OrganizationsApi<'_> {
        OrganizationsApi::new(self)
    }

    /// Identity provider instances and their mappers.
    pub fn identity_providers(&self) -> IdentityProvidersApi<'_> {
        IdentityProvidersApi::new(self)
    }

    /// Components (user storage providers, key providers, ...).
    pub fn components(&self) -> ComponentsApi<'_> {
        ComponentsApi::new(self)
    }

    /// Authorization services of one client, addressed by internal id.
    pub fn authorization(&self, client_uuid: &str) -> AuthorizationApi<'_> {
        AuthorizationApi::new(self, client_uuid)
    }

    /// Role mappings of a user.
    pub fn user_role_mappings(&self, user_id: &str) -> MappingsClient<'_> {
        crate::api::user_role_mappings(self, user_id)
    }

    /// Role mappings of a group.
    pub fn group_role_mappings(&self, group_id: &str) -> MappingsClient<'_> {
        crate::api::group_role_mappings(self, group_id)
    }
}

impl std::fmt::Debug for KeycloakAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakAdmin")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
