// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Role mappings and scope mappings.
//!
//! Users, groups, clients and client scopes expose the same mapping endpoints
//! under different owner paths. [`MappingsClient`] binds them once; the
//! factory functions pick the owner path.

use tracing::{info, instrument};

use super::{require_roles, segment};
use crate::client::KeycloakAdmin;
use crate::error::{Result, require};
use crate::request::{Body, Method, RequestOptions};
use crate::types::{MappingsRepresentation, RoleRepresentation};

/// Mapping endpoints of one owner, e.g. `/users/{id}/role-mappings`.
#[derive(Debug, Clone)]
pub struct MappingsClient<'a> {
    admin: &'a KeycloakAdmin,
    owner: &'static str,
    owner_id: String,
    kind: &'static str,
}

/// `/users/{user_id}/role-mappings`
pub fn user_role_mappings<'a>(admin: &'a KeycloakAdmin, user_id: &str) -> MappingsClient<'a> {
    MappingsClient::new(admin, "users", user_id, "role-mappings")
}

/// `/groups/{group_id}/role-mappings`
pub fn group_role_mappings<'a>(admin: &'a KeycloakAdmin, group_id: &str) -> MappingsClient<'a> {
    MappingsClient::new(admin, "groups", group_id, "role-mappings")
}

/// `/client-scopes/{scope_id}/scope-mappings`
pub fn client_scope_scope_mappings<'a>(
    admin: &'a KeycloakAdmin,
    scope_id: &str,
) -> MappingsClient<'a> {
    MappingsClient::new(admin, "client-scopes", scope_id, "scope-mappings")
}

/// `/clients/{client_uuid}/scope-mappings`
pub fn client_scope_mappings<'a>(
    admin: &'a KeycloakAdmin,
    client_uuid: &str,
) -> MappingsClient<'a> {
    MappingsClient::new(admin, "clients", client_uuid, "scope-mappings")
}

impl<'a> MappingsClient<'a> {
    fn new(
        admin: &'a KeycloakAdmin,
        owner: &'static str,
        owner_id: &str,
        kind: &'static str,
    ) -> Self {
        Self {
            admin,
            owner,
            owner_id: owner_id.to_string(),
            kind,
        }
    }

    fn path(&self, suffix: &str) -> Result<String> {
        require(&self.owner_id, "owner id")?;
        Ok(format!(
            "/{}/{}/{}{}",
            self.owner,
            segment(&self.owner_id),
            self.kind,
            suffix
        ))
    }

    fn client_path(&self, client_uuid: &str, suffix: &str) -> Result<String> {
        require(client_uuid, "client id")?;
        self.path(&format!("/clients/{}{}", segment(client_uuid), suffix))
    }

    async fn list_roles(&self, endpoint: String) -> Result<Vec<RoleRepresentation>> {
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    async fn send_roles(
        &self,
        endpoint: String,
        method: Method,
        roles: &[RoleRepresentation],
    ) -> Result<()> {
        require_roles(roles)?;
        self.admin
            .request(&endpoint, method, Some(Body::json(roles)?), RequestOptions::new())
            .await?;
        Ok(())
    }

    /// Realm and client mappings in one document.
    #[instrument(skip(self), fields(owner = self.owner, owner_id = %self.owner_id))]
    pub async fn all(&self) -> Result<MappingsRepresentation> {
        let endpoint = self.path("")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    // =========================================================================
    // Realm-level
    // =========================================================================

    #[instrument(skip(self), fields(owner = self.owner, owner_id = %self.owner_id))]
    pub async fn realm(&self) -> Result<Vec<RoleRepresentation>> {
        self.list_roles(self.path("/realm")?).await
    }

    /// Realm roles that can still be mapped.
    #[instrument(skip(self), fields(owner = self.owner, owner_id = %self.owner_id))]
    pub async fn realm_available(&self) -> Result<Vec<RoleRepresentation>> {
        self.list_roles(self.path("/realm/available")?).await
    }

    /// Effective realm roles, composites expanded.
    #[instrument(skip(self), fields(owner = self.owner, owner_id = %self.owner_id))]
    pub async fn realm_composite(&self) -> Result<Vec<RoleRepresentation>> {
        self.list_roles(self.path("/realm/composite")?).await
    }

    #[instrument(skip(self, roles), fields(owner = self.owner, owner_id = %self.owner_id, count = roles.len()))]
    pub async fn add_realm(&self, roles: &[RoleRepresentation]) -> Result<()> {
        self.send_roles(self.path("/realm")?, Method::POST, roles)
            .await?;
        info!("Realm roles mapped");
        Ok(())
    }

    #[instrument(skip(self, roles), fields(owner = self.owner, owner_id = %self.owner_id, count = roles.len()))]
    pub async fn remove_realm(&self, roles: &[RoleRepresentation]) -> Result<()> {
        self.send_roles(self.path("/realm")?, Method::DELETE, roles)
            .await?;
        info!("Realm roles unmapped");
        Ok(())
    }

    // =========================================================================
    // Client-level
    // =========================================================================

    #[instrument(skip(self), fields(owner = self.owner, owner_id = %self.owner_id))]
    pub async fn client(&self, client_uuid: &str) -> Result<Vec<RoleRepresentation>> {
        self.list_roles(self.client_path(client_uuid, "")?).await
    }

    #[instrument(skip(self), fields(owner = self.owner, owner_id = %self.owner_id))]
    pub async fn client_available(&self, client_uuid: &str) -> Result<Vec<RoleRepresentation>> {
        self.list_roles(self.client_path(client_uuid, "/available")?)
            .await
    }

    #[instrument(skip(self), fields(owner = self.owner, owner_id = %self.owner_id))]
    pub async fn client_composite(&self, client_uuid: &str) -> Result<Vec<RoleRepresentation>> {
        self.list_roles(self.client_path(client_uuid, "/composite")?)
            .await
    }

    #[instrument(skip(self, roles), fields(owner = self.owner, owner_id = %self.owner_id, count = roles.len()))]
    pub async fn add_client(&self, client_uuid: &str, roles: &[RoleRepresentation]) -> Result<()> {
        self.send_roles(self.client_path(client_uuid, "")?, Method::POST, roles)
            .await?;
        info!("Client roles mapped");
        Ok(())
    }

    #[instrument(skip(self, roles), fields(owner = self.owner, owner_id = %self.owner_id, count = roles.len()))]
    pub async fn remove_client(
        &self,
        client_uuid: &str,
        roles: &[RoleRepresentation],
    ) -> Result<()> {
        self.send_roles(self.client_path(client_uuid, "")?, Method::DELETE, roles)
            .await?;
        info!("Client roles unmapped");
        Ok(())
    }
}
