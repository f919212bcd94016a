// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Clients (applications) of the configured realm.
//!
//! Most endpoints address a client by its internal id (`id`), not by the
//! human-readable `clientId`; use [`ClientsApi::find_by_client_id`] to resolve one.

use bytes::Bytes;
use serde_json::Value;
use tracing::{info, instrument};

use super::mappings::{MappingsClient, client_scope_mappings};
use super::segment;
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, Method, RequestOptions};
use crate::types::{
    ClientQuery, ClientRepresentation, ClientScopeRepresentation, CredentialRepresentation,
    ProtocolMapperRepresentation, UserRepresentation,
};

/// `/clients` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ClientsApi<'a> {
    admin: &'a KeycloakAdmin,
}

impl<'a> ClientsApi<'a> {
    pub(crate) fn new(admin: &'a KeycloakAdmin) -> Self {
        Self { admin }
    }

    fn client_path(id: &str, suffix: &str) -> Result<String> {
        require(id, "client id")?;
        Ok(format!("/clients/{}{}", segment(id), suffix))
    }

    async fn get_json<T: serde::de::DeserializeOwned + Default>(&self, endpoint: &str) -> Result<T> {
        self.admin
            .request(endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    async fn send(&self, endpoint: &str, method: Method, body: Option<Body>) -> Result<()> {
        self.admin
            .request(endpoint, method, body, RequestOptions::new())
            .await?;
        Ok(())
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list(&self, query: ClientQuery) -> Result<Vec<ClientRepresentation>> {
        self.admin
            .request("/clients", Method::GET, None, query.to_query().into())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<ClientRepresentation> {
        let endpoint = Self::client_path(id, "")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    /// Look a client up by its `clientId`.
    #[instrument(skip(self))]
    pub async fn find_by_client_id(&self, client_id: &str) -> Result<Option<ClientRepresentation>> {
        require(client_id, "clientId")?;
        let clients = self
            .list(ClientQuery::new().with_client_id(client_id))
            .await?;
        Ok(clients.into_iter().next())
    }

    /// Create a client and return its internal id.
    #[instrument(skip(self, client), fields(client_id = ?client.client_id))]
    pub async fn create(&self, client: &ClientRepresentation) -> Result<String> {
        if client
            .client_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty())
        {
            return Err(AdminError::validation("clientId is required"));
        }
        let id = self
            .admin
            .request(
                "/clients",
                Method::POST,
                Some(Body::json(client)?),
                RequestOptions::new(),
            )
            .await?
            .into_id()?;
        info!(id = %id, "Client created");
        Ok(id)
    }

    #[instrument(skip(self, client))]
    pub async fn update(&self, id: &str, client: &ClientRepresentation) -> Result<()> {
        let endpoint = Self::client_path(id, "")?;
        self.send(&endpoint, Method::PUT, Some(Body::json(client)?))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let endpoint = Self::client_path(id, "")?;
        self.send(&endpoint, Method::DELETE, None).await?;
        info!("Client deleted");
        Ok(())
    }

    // =========================================================================
    // Secrets & service account
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn secret(&self, id: &str) -> Result<CredentialRepresentation> {
        let endpoint = Self::client_path(id, "/client-secret")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    #[instrument(skip(self))]
    pub async fn regenerate_secret(&self, id: &str) -> Result<CredentialRepresentation> {
        let endpoint = Self::client_path(id, "/client-secret")?;
        let secret = self
            .admin
            .request(&endpoint, Method::POST, None, RequestOptions::new())
            .await?
            .into_json()?;
        info!("Client secret regenerated");
        Ok(secret)
    }

    /// The user backing a client's service account.
    #[instrument(skip(self))]
    pub async fn service_account_user(&self, id: &str) -> Result<UserRepresentation> {
        let endpoint = Self::client_path(id, "/service-account-user")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    // =========================================================================
    // Protocol mappers
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn protocol_mappers(&self, id: &str) -> Result<Vec<ProtocolMapperRepresentation>> {
        let endpoint = Self::client_path(id, "/protocol-mappers/models")?;
        self.get_json(&endpoint).await
    }

    #[instrument(skip(self, mapper), fields(name = ?mapper.name))]
    pub async fn add_protocol_mapper(
        &self,
        id: &str,
        mapper: &ProtocolMapperRepresentation,
    ) -> Result<()> {
        let endpoint = Self::client_path(id, "/protocol-mappers/models")?;
        self.send(&endpoint, Method::POST, Some(Body::json(mapper)?))
            .await
    }

    // =========================================================================
    // Client scopes
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn default_client_scopes(&self, id: &str) -> Result<Vec<ClientScopeRepresentation>> {
        let endpoint = Self::client_path(id, "/default-client-scopes")?;
        self.get_json(&endpoint).await
    }

    #[instrument(skip(self))]
    pub async fn add_default_client_scope(&self, id: &str, scope_id: &str) -> Result<()> {
        let endpoint = Self::scope_link(id, "default", scope_id)?;
        self.send(&endpoint, Method::PUT, None).await
    }

    #[instrument(skip(self))]
    pub async fn remove_default_client_scope(&self, id: &str, scope_id: &str) -> Result<()> {
        let endpoint = Self::scope_link(id, "default", scope_id)?;
        self.send(&endpoint, Method::DELETE, None).await
    }

    #[instrument(skip(self))]
    pub async fn optional_client_scopes(&self, id: &str) -> Result<Vec<ClientScopeRepresentation>> {
        let endpoint = Self::client_path(id, "/optional-client-scopes")?;
        self.get_json(&endpoint).await
    }

    #[instrument(skip(self))]
    pub async fn add_optional_client_scope(&self, id: &str, scope_id: &str) -> Result<()> {
        let endpoint = Self::scope_link(id, "optional", scope_id)?;
        self.send(&endpoint, Method::PUT, None).await
    }

    #[instrument(skip(self))]
    pub async fn remove_optional_client_scope(&self, id: &str, scope_id: &str) -> Result<()> {
        let endpoint = Self::scope_link(id, "optional", scope_id)?;
        self.send(&endpoint, Method::DELETE, None).await
    }

    fn scope_link(id: &str, kind: &str, scope_id: &str) -> Result<String> {
        require(scope_id, "client scope id")?;
        Self::client_path(id, &format!("/{}-client-scopes/{}", kind, segment(scope_id)))
    }

    // =========================================================================
    // Certificates
    // =========================================================================

    /// Generate and download a keystore for a certificate attribute (e.g. `jwt.credential`).
    ///
    /// `config` is the keystore request: `format`, `keyAlias`, `keyPassword`,
    /// `storePassword`. The response body is returned as raw bytes.
    #[instrument(skip(self, config))]
    pub async fn download_keystore(&self, id: &str, attribute: &str, config: &Value) -> Result<Bytes> {
        require(attribute, "certificate attribute")?;
        let endpoint = Self::client_path(
            id,
            &format!("/certificates/{}/download", segment(attribute)),
        )?;
        self.admin
            .request(
                &endpoint,
                Method::POST,
                Some(Body::Json(config.clone())),
                RequestOptions::new()
                    .with_header("Accept", "application/octet-stream")
                    .expect_binary(),
            )
            .await?
            .into_bytes()
    }

    /// Scope mappings of one client.
    pub fn scope_mappings(&self, id: &str) -> MappingsClient<'a> {
        client_scope_mappings(self.admin, id)
    }
}
