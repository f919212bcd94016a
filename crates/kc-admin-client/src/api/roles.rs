// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Realm roles and client roles.
//!
//! Both live under the same set of endpoints, rooted at `/roles` for the realm
//! and at `/clients/{id}/roles` for one client.

use tracing::{info, instrument};

use super::{require_roles, segment};
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, Method, Query, RequestOptions};
use crate::response::ApiResponse;
use crate::types::{GroupRepresentation, RoleQuery, RoleRepresentation, UserRepresentation};

/// Role endpoints of the realm or of one client.
#[derive(Debug, Clone)]
pub struct RolesApi<'a> {
    admin: &'a KeycloakAdmin,
    /// Internal id of the owning client; `None` for realm roles.
    client_uuid: Option<String>,
}

impl<'a> RolesApi<'a> {
    pub(crate) fn realm(admin: &'a KeycloakAdmin) -> Self {
        Self {
            admin,
            client_uuid: None,
        }
    }

    pub(crate) fn client(admin: &'a KeycloakAdmin, client_uuid: &str) -> Self {
        Self {
            admin,
            client_uuid: Some(client_uuid.to_string()),
        }
    }

    fn base(&self) -> Result<String> {
        match &self.client_uuid {
            None => Ok("/roles".to_string()),
            Some(uuid) => {
                require(uuid, "client id")?;
                Ok(format!("/clients/{}/roles", segment(uuid)))
            }
        }
    }

    fn role_path(&self, name: &str, suffix: &str) -> Result<String> {
        require(name, "role name")?;
        Ok(format!("{}/{}{}", self.base()?, segment(name), suffix))
    }

    #[instrument(skip(self), fields(client = ?self.client_uuid))]
    pub async fn list(&self, query: RoleQuery) -> Result<Vec<RoleRepresentation>> {
        let endpoint = self.base()?;
        self.admin
            .request(&endpoint, Method::GET, None, query.to_query().into())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self), fields(client = ?self.client_uuid))]
    pub async fn get(&self, name: &str) -> Result<RoleRepresentation> {
        let endpoint = self.role_path(name, "")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    /// Create a role and return its name as echoed by the server.
    #[instrument(skip(self, role), fields(client = ?self.client_uuid, name = ?role.name))]
    pub async fn create(&self, role: &RoleRepresentation) -> Result<String> {
        let name = role.name.as_deref().unwrap_or_default();
        require(name, "role name")?;
        let endpoint = self.base()?;
        let created = self
            .admin
            .request(
                &endpoint,
                Method::POST,
                Some(Body::json(role)?),
                RequestOptions::new(),
            )
            .await?;
        let name = match created {
            ApiResponse::Empty => name.to_string(),
            other => decode_segment(&other.into_id()?)?,
        };
        info!(role = %name, "Role created");
        Ok(name)
    }

    #[instrument(skip(self, role), fields(client = ?self.client_uuid))]
    pub async fn update(&self, name: &str, role: &RoleRepresentation) -> Result<()> {
        let endpoint = self.role_path(name, "")?;
        self.admin
            .request(
                &endpoint,
                Method::PUT,
                Some(Body::json(role)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(client = ?self.client_uuid))]
    pub async fn delete(&self, name: &str) -> Result<()> {
        let endpoint = self.role_path(name, "")?;
        self.admin
            .request(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await?;
        info!("Role deleted");
        Ok(())
    }

    /// Fetch any role of the realm by id, regardless of its container.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<RoleRepresentation> {
        require(id, "role id")?;
        self.admin
            .request(
                &format!("/roles-by-id/{}", segment(id)),
                Method::GET,
                None,
                RequestOptions::new(),
            )
            .await?
            .into_json()
    }

    // =========================================================================
    // Composites
    // =========================================================================

    #[instrument(skip(self), fields(client = ?self.client_uuid))]
    pub async fn composites(&self, name: &str) -> Result<Vec<RoleRepresentation>> {
        let endpoint = self.role_path(name, "/composites")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self, roles), fields(client = ?self.client_uuid, count = roles.len()))]
    pub async fn add_composites(&self, name: &str, roles: &[RoleRepresentation]) -> Result<()> {
        let endpoint = self.role_path(name, "/composites")?;
        require_roles(roles)?;
        self.admin
            .request(
                &endpoint,
                Method::POST,
                Some(Body::json(roles)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, roles), fields(client = ?self.client_uuid, count = roles.len()))]
    pub async fn remove_composites(&self, name: &str, roles: &[RoleRepresentation]) -> Result<()> {
        let endpoint = self.role_path(name, "/composites")?;
        require_roles(roles)?;
        self.admin
            .request(
                &endpoint,
                Method::DELETE,
                Some(Body::json(roles)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Holders
    // =========================================================================

    /// Users that have the role directly assigned.
    #[instrument(skip(self), fields(client = ?self.client_uuid))]
    pub async fn users_in_role(
        &self,
        name: &str,
        first: Option<u32>,
        max: Option<u32>,
    ) -> Result<Vec<UserRepresentation>> {
        let endpoint = self.role_path(name, "/users")?;
        let query = Query::new().opt("first", first).opt("max", max);
        self.admin
            .request(&endpoint, Method::GET, None, query.into())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self), fields(client = ?self.client_uuid))]
    pub async fn groups_in_role(
        &self,
        name: &str,
        first: Option<u32>,
        max: Option<u32>,
    ) -> Result<Vec<GroupRepresentation>> {
        let endpoint = self.role_path(name, "/groups")?;
        let query = Query::new().opt("first", first).opt("max", max);
        self.admin
            .request(&endpoint, Method::GET, None, query.into())
            .await?
            .into_json_or_default()
    }
}

/// Role names come back percent-encoded in the `Location` header.
fn decode_segment(raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|name| name.into_owned())
        .map_err(|e| AdminError::UnexpectedResponse(format!("invalid role name {}: {}", raw, e)))
}
