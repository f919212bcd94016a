// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Client scopes of the configured realm.

use tracing::{info, instrument};

use super::mappings::{MappingsClient, client_scope_scope_mappings};
use super::segment;
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, Method, RequestOptions};
use crate::types::{ClientScopeRepresentation, ProtocolMapperRepresentation};

/// `/client-scopes` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ClientScopesApi<'a> {
    admin: &'a KeycloakAdmin,
}

impl<'a> ClientScopesApi<'a> {
    pub(crate) fn new(admin: &'a KeycloakAdmin) -> Self {
        Self { admin }
    }

    fn scope_path(id: &str, suffix: &str) -> Result<String> {
        require(id, "client scope id")?;
        Ok(format!("/client-scopes/{}{}", segment(id), suffix))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ClientScopeRepresentation>> {
        self.admin
            .request("/client-scopes", Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<ClientScopeRepresentation> {
        let endpoint = Self::scope_path(id, "")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    /// Look a scope up by name. The server has no name filter, so this lists all scopes.
    #[instrument(skip(self))]
    pub async fn find_by_name(&self, name: &str) -> Result<Option<ClientScopeRepresentation>> {
        require(name, "client scope name")?;
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|scope| scope.name.as_deref() == Some(name)))
    }

    #[instrument(skip(self, scope), fields(name = ?scope.name))]
    pub async fn create(&self, scope: &ClientScopeRepresentation) -> Result<String> {
        if scope.name.as_deref().is_none_or(|name| name.trim().is_empty()) {
            return Err(AdminError::validation("client scope name is required"));
        }
        let id = self
            .admin
            .request(
                "/client-scopes",
                Method::POST,
                Some(Body::json(scope)?),
                RequestOptions::new(),
            )
            .await?
            .into_id()?;
        info!(scope_id = %id, "Client scope created");
        Ok(id)
    }

    #[instrument(skip(self, scope))]
    pub async fn update(&self, id: &str, scope: &ClientScopeRepresentation) -> Result<()> {
        let endpoint = Self::scope_path(id, "")?;
        self.admin
            .request(
                &endpoint,
                Method::PUT,
                Some(Body::json(scope)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let endpoint = Self::scope_path(id, "")?;
        self.admin
            .request(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await?;
        info!("Client scope deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn protocol_mappers(&self, id: &str) -> Result<Vec<ProtocolMapperRepresentation>> {
        let endpoint = Self::scope_path(id, "/protocol-mappers/models")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self, mapper), fields(name = ?mapper.name))]
    pub async fn add_protocol_mapper(
        &self,
        id: &str,
        mapper: &ProtocolMapperRepresentation,
    ) -> Result<()> {
        let endpoint = Self::scope_path(id, "/protocol-mappers/models")?;
        self.admin
            .request(
                &endpoint,
                Method::POST,
                Some(Body::json(mapper)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_protocol_mapper(&self, id: &str, mapper_id: &str) -> Result<()> {
        require(mapper_id, "protocol mapper id")?;
        let endpoint =
            Self::scope_path(id, &format!("/protocol-mappers/models/{}", segment(mapper_id)))?;
        self.admin
            .request(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await?;
        Ok(())
    }

    /// Roles granted to tokens carrying this scope.
    pub fn scope_mappings(&self, id: &str) -> MappingsClient<'a> {
        client_scope_scope_mappings(self.admin, id)
    }
}
