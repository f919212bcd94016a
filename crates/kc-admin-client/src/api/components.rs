// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Components: user storage providers, key providers and other pluggable parts.

use tracing::{info, instrument};

use super::segment;
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, Method, Query, RequestOptions};
use crate::types::{ComponentQuery, ComponentRepresentation, ComponentTypeRepresentation};

/// `/components` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ComponentsApi<'a> {
    admin: &'a KeycloakAdmin,
}

impl<'a> ComponentsApi<'a> {
    pub(crate) fn new(admin: &'a KeycloakAdmin) -> Self {
        Self { admin }
    }

    fn component_path(id: &str, suffix: &str) -> Result<String> {
        require(id, "component id")?;
        Ok(format!("/components/{}{}", segment(id), suffix))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: ComponentQuery) -> Result<Vec<ComponentRepresentation>> {
        self.admin
            .request("/components", Method::GET, None, query.to_query().into())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<ComponentRepresentation> {
        let endpoint = Self::component_path(id, "")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    /// Create a component. Look it up by name afterwards to learn its id.
    #[instrument(skip(self, component), fields(name = ?component.name))]
    pub async fn create(&self, component: &ComponentRepresentation) -> Result<()> {
        if component
            .provider_id
            .as_deref()
            .is_none_or(|id| id.trim().is_empty())
        {
            return Err(AdminError::validation("component providerId is required"));
        }
        self.admin
            .request(
                "/components",
                Method::POST,
                Some(Body::json(component)?),
                RequestOptions::new(),
            )
            .await?;
        info!("Component created");
        Ok(())
    }

    #[instrument(skip(self, component))]
    pub async fn update(&self, id: &str, component: &ComponentRepresentation) -> Result<()> {
        let endpoint = Self::component_path(id, "")?;
        self.admin
            .request(
                &endpoint,
                Method::PUT,
                Some(Body::json(component)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let endpoint = Self::component_path(id, "")?;
        self.admin
            .request(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await?;
        info!("Component deleted");
        Ok(())
    }

    /// Provider types that may be created beneath a component, e.g. LDAP
    /// mappers beneath an LDAP storage provider.
    #[instrument(skip(self))]
    pub async fn sub_component_types(
        &self,
        id: &str,
        component_type: &str,
    ) -> Result<Vec<ComponentTypeRepresentation>> {
        let endpoint = Self::component_path(id, "/sub-component-types")?;
        require(component_type, "component type")?;
        let query = Query::new().param("type", component_type);
        self.admin
            .request(&endpoint, Method::GET, None, query.into())
            .await?
            .into_json_or_default()
    }
}
