// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Organizations of the configured realm.

use serde_json::Value;
use tracing::{info, instrument};

use super::segment;
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, CONTENT_TYPE_FORM, Method, Query, RequestOptions};
use crate::types::{
    IdentityProviderRepresentation, OrganizationQuery, OrganizationRepresentation,
    UserRepresentation,
};

/// `/organizations` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct OrganizationsApi<'a> {
    admin: &'a KeycloakAdmin,
}

impl<'a> OrganizationsApi<'a> {
    pub(crate) fn new(admin: &'a KeycloakAdmin) -> Self {
        Self { admin }
    }

    fn org_path(id: &str, suffix: &str) -> Result<String> {
        require(id, "organization id")?;
        Ok(format!("/organizations/{}{}", segment(id), suffix))
    }

    async fn send(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<()> {
        self.admin.request(endpoint, method, body, options).await?;
        Ok(())
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list(&self, query: OrganizationQuery) -> Result<Vec<OrganizationRepresentation>> {
        self.admin
            .request("/organizations", Method::GET, None, query.to_query().into())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<OrganizationRepresentation> {
        let endpoint = Self::org_path(id, "")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    #[instrument(skip(self, org), fields(name = ?org.name))]
    pub async fn create(&self, org: &OrganizationRepresentation) -> Result<String> {
        if org.name.as_deref().is_none_or(|name| name.trim().is_empty()) {
            return Err(AdminError::validation("organization name is required"));
        }
        let id = self
            .admin
            .request(
                "/organizations",
                Method::POST,
                Some(Body::json(org)?),
                RequestOptions::new(),
            )
            .await?
            .into_id()?;
        info!(organization_id = %id, "Organization created");
        Ok(id)
    }

    #[instrument(skip(self, org))]
    pub async fn update(&self, id: &str, org: &OrganizationRepresentation) -> Result<()> {
        let endpoint = Self::org_path(id, "")?;
        self.send(&endpoint, Method::PUT, Some(Body::json(org)?), RequestOptions::new())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let endpoint = Self::org_path(id, "")?;
        self.send(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await?;
        info!("Organization deleted");
        Ok(())
    }

    // =========================================================================
    // Members
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn members(
        &self,
        id: &str,
        first: Option<u32>,
        max: Option<u32>,
    ) -> Result<Vec<UserRepresentation>> {
        let endpoint = Self::org_path(id, "/members")?;
        let query = Query::new().opt("first", first).opt("max", max);
        self.admin
            .request(&endpoint, Method::GET, None, query.into())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn members_count(&self, id: &str) -> Result<u64> {
        let endpoint = Self::org_path(id, "/members/count")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    /// Add an existing realm user as a member. The body is the bare user id.
    #[instrument(skip(self))]
    pub async fn add_member(&self, id: &str, user_id: &str) -> Result<()> {
        let endpoint = Self::org_path(id, "/members")?;
        require(user_id, "user id")?;
        self.send(
            &endpoint,
            Method::POST,
            Some(Body::Json(Value::String(user_id.to_string()))),
            RequestOptions::new(),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_member(&self, id: &str, user_id: &str) -> Result<()> {
        require(user_id, "user id")?;
        let endpoint = Self::org_path(id, &format!("/members/{}", segment(user_id)))?;
        self.send(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await
    }

    /// Email an invitation to an existing realm user.
    #[instrument(skip(self))]
    pub async fn invite_existing_user(&self, id: &str, user_id: &str) -> Result<()> {
        let endpoint = Self::org_path(id, "/members/invite-existing-user")?;
        require(user_id, "user id")?;
        self.send(
            &endpoint,
            Method::POST,
            Some(Body::form([("id", user_id)])),
            RequestOptions::new().with_content_type(CONTENT_TYPE_FORM),
        )
        .await
    }

    /// Email an invitation to register. Names are optional.
    #[instrument(skip(self))]
    pub async fn invite_user(
        &self,
        id: &str,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<()> {
        let endpoint = Self::org_path(id, "/members/invite-user")?;
        require(email, "email")?;
        let mut form = vec![("email", email)];
        if let Some(first_name) = first_name {
            form.push(("firstName", first_name));
        }
        if let Some(last_name) = last_name {
            form.push(("lastName", last_name));
        }
        self.send(
            &endpoint,
            Method::POST,
            Some(Body::form(form)),
            RequestOptions::new().with_content_type(CONTENT_TYPE_FORM),
        )
        .await
    }

    // =========================================================================
    // Identity providers
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn identity_providers(&self, id: &str) -> Result<Vec<IdentityProviderRepresentation>> {
        let endpoint = Self::org_path(id, "/identity-providers")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    /// Link an identity provider by alias. The body is the bare alias.
    #[instrument(skip(self))]
    pub async fn link_identity_provider(&self, id: &str, alias: &str) -> Result<()> {
        let endpoint = Self::org_path(id, "/identity-providers")?;
        require(alias, "identity provider alias")?;
        self.send(
            &endpoint,
            Method::POST,
            Some(Body::Json(Value::String(alias.to_string()))),
            RequestOptions::new(),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn unlink_identity_provider(&self, id: &str, alias: &str) -> Result<()> {
        require(alias, "identity provider alias")?;
        let endpoint = Self::org_path(id, &format!("/identity-providers/{}", segment(alias)))?;
        self.send(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await
    }
}
