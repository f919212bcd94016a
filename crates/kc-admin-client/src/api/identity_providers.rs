// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Identity provider instances and their mappers.

use std::collections::HashMap;

use serde_json::json;
use tracing::{info, instrument};

use super::segment;
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, Method, RequestOptions};
use crate::types::{IdentityProviderMapperRepresentation, IdentityProviderRepresentation};

/// `/identity-provider` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct IdentityProvidersApi<'a> {
    admin: &'a KeycloakAdmin,
}

impl<'a> IdentityProvidersApi<'a> {
    pub(crate) fn new(admin: &'a KeycloakAdmin) -> Self {
        Self { admin }
    }

    fn instance_path(alias: &str, suffix: &str) -> Result<String> {
        require(alias, "identity provider alias")?;
        Ok(format!(
            "/identity-provider/instances/{}{}",
            segment(alias),
            suffix
        ))
    }

    async fn send(&self, endpoint: &str, method: Method, body: Option<Body>) -> Result<()> {
        self.admin
            .request(endpoint, method, body, RequestOptions::new())
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<IdentityProviderRepresentation>> {
        self.admin
            .request(
                "/identity-provider/instances",
                Method::GET,
                None,
                RequestOptions::new(),
            )
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, alias: &str) -> Result<IdentityProviderRepresentation> {
        let endpoint = Self::instance_path(alias, "")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    /// Create an identity provider. It is addressed by its alias afterwards.
    #[instrument(skip(self, provider), fields(alias = ?provider.alias))]
    pub async fn create(&self, provider: &IdentityProviderRepresentation) -> Result<()> {
        if provider.alias.as_deref().is_none_or(|alias| alias.trim().is_empty()) {
            return Err(AdminError::validation("identity provider alias is required"));
        }
        self.send(
            "/identity-provider/instances",
            Method::POST,
            Some(Body::json(provider)?),
        )
        .await?;
        info!("Identity provider created");
        Ok(())
    }

    #[instrument(skip(self, provider))]
    pub async fn update(&self, alias: &str, provider: &IdentityProviderRepresentation) -> Result<()> {
        let endpoint = Self::instance_path(alias, "")?;
        self.send(&endpoint, Method::PUT, Some(Body::json(provider)?))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, alias: &str) -> Result<()> {
        let endpoint = Self::instance_path(alias, "")?;
        self.send(&endpoint, Method::DELETE, None).await?;
        info!("Identity provider deleted");
        Ok(())
    }

    // =========================================================================
    // Mappers
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn mappers(&self, alias: &str) -> Result<Vec<IdentityProviderMapperRepresentation>> {
        let endpoint = Self::instance_path(alias, "/mappers")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    /// Create a mapper and return its id.
    #[instrument(skip(self, mapper), fields(name = ?mapper.name))]
    pub async fn create_mapper(
        &self,
        alias: &str,
        mapper: &IdentityProviderMapperRepresentation,
    ) -> Result<String> {
        let endpoint = Self::instance_path(alias, "/mappers")?;
        let mut mapper = mapper.clone();
        mapper
            .identity_provider_alias
            .get_or_insert_with(|| alias.to_string());
        self.admin
            .request(
                &endpoint,
                Method::POST,
                Some(Body::json(&mapper)?),
                RequestOptions::new(),
            )
            .await?
            .into_id()
    }

    #[instrument(skip(self))]
    pub async fn delete_mapper(&self, alias: &str, mapper_id: &str) -> Result<()> {
        require(mapper_id, "mapper id")?;
        let endpoint = Self::instance_path(alias, &format!("/mappers/{}", segment(mapper_id)))?;
        self.send(&endpoint, Method::DELETE, None).await
    }

    /// Fetch and parse a provider's discovery document (e.g. an OIDC
    /// `.well-known` URL) into identity provider config entries.
    #[instrument(skip(self))]
    pub async fn import_config(
        &self,
        provider_id: &str,
        from_url: &str,
    ) -> Result<HashMap<String, String>> {
        require(provider_id, "provider id")?;
        require(from_url, "discovery URL")?;
        let body = json!({ "providerId": provider_id, "fromUrl": from_url });
        self.admin
            .request(
                "/identity-provider/import-config",
                Method::POST,
                Some(Body::Json(body)),
                RequestOptions::new(),
            )
            .await?
            .into_json_or_default()
    }
}
