// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Authorization services of one client (resource server).

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, instrument};

use super::segment;
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, Method, Query, RequestOptions};
use crate::types::{
    AuthzQuery, PolicyRepresentation, ResourceRepresentation, ResourceServerRepresentation,
    ScopeRepresentation,
};

/// `/clients/{id}/authz/resource-server` endpoints.
#[derive(Debug, Clone)]
pub struct AuthorizationApi<'a> {
    admin: &'a KeycloakAdmin,
    client_uuid: String,
}

impl<'a> AuthorizationApi<'a> {
    pub(crate) fn new(admin: &'a KeycloakAdmin, client_uuid: &str) -> Self {
        Self {
            admin,
            client_uuid: client_uuid.to_string(),
        }
    }

    fn path(&self, suffix: &str) -> Result<String> {
        require(&self.client_uuid, "client id")?;
        Ok(format!(
            "/clients/{}/authz/resource-server{}",
            segment(&self.client_uuid),
            suffix
        ))
    }

    async fn get<T: DeserializeOwned + Default>(&self, suffix: &str, query: Query) -> Result<T> {
        let endpoint = self.path(suffix)?;
        self.admin
            .request(&endpoint, Method::GET, None, query.into())
            .await?
            .into_json_or_default()
    }

    async fn create<B, T>(&self, suffix: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self.path(suffix)?;
        self.admin
            .request(
                &endpoint,
                Method::POST,
                Some(Body::json(body)?),
                RequestOptions::new(),
            )
            .await?
            .into_json()
    }

    async fn send(&self, suffix: &str, method: Method, body: Option<Body>) -> Result<()> {
        let endpoint = self.path(suffix)?;
        self.admin
            .request(&endpoint, method, body, RequestOptions::new())
            .await?;
        Ok(())
    }

    fn named(kind: &str, name: Option<&str>) -> Result<()> {
        if name.is_none_or(|name| name.trim().is_empty()) {
            return Err(AdminError::validation(format!("{} name is required", kind)));
        }
        Ok(())
    }

    // =========================================================================
    // Resource server settings
    // =========================================================================

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn settings(&self) -> Result<ResourceServerRepresentation> {
        self.get("", Query::new()).await
    }

    #[instrument(skip(self, settings), fields(client = %self.client_uuid))]
    pub async fn update_settings(&self, settings: &ResourceServerRepresentation) -> Result<()> {
        self.send("", Method::PUT, Some(Body::json(settings)?)).await
    }

    // =========================================================================
    // Resources
    // =========================================================================

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn resources(&self, query: AuthzQuery) -> Result<Vec<ResourceRepresentation>> {
        self.get("/resource", query.to_query()).await
    }

    /// Create a resource; the server returns it with its `_id` assigned.
    #[instrument(skip(self, resource), fields(client = %self.client_uuid, name = ?resource.name))]
    pub async fn create_resource(
        &self,
        resource: &ResourceRepresentation,
    ) -> Result<ResourceRepresentation> {
        Self::named("resource", resource.name.as_deref())?;
        let created: ResourceRepresentation = self.create("/resource", resource).await?;
        info!(resource_id = ?created.id, "Authorization resource created");
        Ok(created)
    }

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn get_resource(&self, resource_id: &str) -> Result<ResourceRepresentation> {
        require(resource_id, "resource id")?;
        let endpoint = self.path(&format!("/resource/{}", segment(resource_id)))?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    #[instrument(skip(self, resource), fields(client = %self.client_uuid))]
    pub async fn update_resource(
        &self,
        resource_id: &str,
        resource: &ResourceRepresentation,
    ) -> Result<()> {
        require(resource_id, "resource id")?;
        self.send(
            &format!("/resource/{}", segment(resource_id)),
            Method::PUT,
            Some(Body::json(resource)?),
        )
        .await
    }

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn delete_resource(&self, resource_id: &str) -> Result<()> {
        require(resource_id, "resource id")?;
        self.send(
            &format!("/resource/{}", segment(resource_id)),
            Method::DELETE,
            None,
        )
        .await
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn scopes(&self, query: AuthzQuery) -> Result<Vec<ScopeRepresentation>> {
        self.get("/scope", query.to_query()).await
    }

    #[instrument(skip(self, scope), fields(client = %self.client_uuid, name = ?scope.name))]
    pub async fn create_scope(&self, scope: &ScopeRepresentation) -> Result<ScopeRepresentation> {
        Self::named("scope", scope.name.as_deref())?;
        self.create("/scope", scope).await
    }

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn delete_scope(&self, scope_id: &str) -> Result<()> {
        require(scope_id, "scope id")?;
        self.send(&format!("/scope/{}", segment(scope_id)), Method::DELETE, None)
            .await
    }

    // =========================================================================
    // Policies & permissions
    // =========================================================================

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn policies(&self, query: AuthzQuery) -> Result<Vec<PolicyRepresentation>> {
        self.get("/policy", query.to_query()).await
    }

    /// Create a policy of the given type (`role`, `user`, `group`, `js`, `time`, ...).
    #[instrument(skip(self, policy), fields(client = %self.client_uuid, name = ?policy.name))]
    pub async fn create_policy(
        &self,
        policy_type: &str,
        policy: &PolicyRepresentation,
    ) -> Result<PolicyRepresentation> {
        require(policy_type, "policy type")?;
        Self::named("policy", policy.name.as_deref())?;
        self.create(&format!("/policy/{}", segment(policy_type)), policy)
            .await
    }

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn delete_policy(&self, policy_id: &str) -> Result<()> {
        require(policy_id, "policy id")?;
        self.send(&format!("/policy/{}", segment(policy_id)), Method::DELETE, None)
            .await
    }

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn permissions(&self, query: AuthzQuery) -> Result<Vec<PolicyRepresentation>> {
        self.get("/permission", query.to_query()).await
    }

    /// Create a permission of the given type, `resource` or `scope`.
    #[instrument(skip(self, permission), fields(client = %self.client_uuid, name = ?permission.name))]
    pub async fn create_permission(
        &self,
        permission_type: &str,
        permission: &PolicyRepresentation,
    ) -> Result<PolicyRepresentation> {
        require(permission_type, "permission type")?;
        Self::named("permission", permission.name.as_deref())?;
        self.create(
            &format!("/permission/{}", segment(permission_type)),
            permission,
        )
        .await
    }

    #[instrument(skip(self), fields(client = %self.client_uuid))]
    pub async fn delete_permission(&self, permission_id: &str) -> Result<()> {
        require(permission_id, "permission id")?;
        self.send(
            &format!("/permission/{}", segment(permission_id)),
            Method::DELETE,
            None,
        )
        .await
    }

    /// Evaluate policies for a user and resources. The request and result
    /// documents are passed through untyped.
    #[instrument(skip(self, request), fields(client = %self.client_uuid))]
    pub async fn evaluate(&self, request: &Value) -> Result<Value> {
        self.create("/policy/evaluate", request).await
    }
}
