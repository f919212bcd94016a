// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Users of the configured realm.

use tracing::{debug, info, instrument};

use super::mappings::{MappingsClient, user_role_mappings};
use super::segment;
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, Method, Query, RequestOptions};
use crate::types::{
    CredentialRepresentation, GroupQuery, GroupRepresentation, UserQuery, UserRepresentation,
    UserSessionRepresentation,
};

/// `/users` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct UsersApi<'a> {
    admin: &'a KeycloakAdmin,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(admin: &'a KeycloakAdmin) -> Self {
        Self { admin }
    }

    fn user_path(id: &str, suffix: &str) -> Result<String> {
        require(id, "user id")?;
        Ok(format!("/users/{}{}", segment(id), suffix))
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn list(&self, query: UserQuery) -> Result<Vec<UserRepresentation>> {
        self.admin
            .request("/users", Method::GET, None, query.to_query().into())
            .await?
            .into_json_or_default()
    }

    /// Number of users matching the query; paging fields are ignored by the server.
    #[instrument(skip(self))]
    pub async fn count(&self, query: UserQuery) -> Result<u64> {
        self.admin
            .request("/users/count", Method::GET, None, query.to_query().into())
            .await?
            .into_json()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<UserRepresentation> {
        let endpoint = Self::user_path(id, "")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    /// Exact username lookup.
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserRepresentation>> {
        require(username, "username")?;
        let users = self
            .list(UserQuery::new().with_username(username, true))
            .await?;
        Ok(users.into_iter().next())
    }

    /// Create a user and return its id.
    #[instrument(skip(self, user), fields(username = ?user.username))]
    pub async fn create(&self, user: &UserRepresentation) -> Result<String> {
        if user.username.as_deref().is_none_or(|name| name.trim().is_empty()) {
            return Err(AdminError::validation("username is required"));
        }
        let id = self
            .admin
            .request(
                "/users",
                Method::POST,
                Some(Body::json(user)?),
                RequestOptions::new(),
            )
            .await?
            .into_id()?;
        info!(user_id = %id, "User created");
        Ok(id)
    }

    #[instrument(skip(self, user))]
    pub async fn update(&self, id: &str, user: &UserRepresentation) -> Result<()> {
        let endpoint = Self::user_path(id, "")?;
        self.admin
            .request(
                &endpoint,
                Method::PUT,
                Some(Body::json(user)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let endpoint = Self::user_path(id, "")?;
        self.admin
            .request(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await?;
        info!("User deleted");
        Ok(())
    }

    // =========================================================================
    // Credentials
    // =========================================================================

    #[instrument(skip(self, password))]
    pub async fn reset_password(&self, id: &str, password: &str, temporary: bool) -> Result<()> {
        let endpoint = Self::user_path(id, "/reset-password")?;
        require(password, "password")?;
        let credential = CredentialRepresentation::password(password, temporary);
        self.admin
            .request(
                &endpoint,
                Method::PUT,
                Some(Body::json(&credential)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn credentials(&self, id: &str) -> Result<Vec<CredentialRepresentation>> {
        let endpoint = Self::user_path(id, "/credentials")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn delete_credential(&self, id: &str, credential_id: &str) -> Result<()> {
        require(credential_id, "credential id")?;
        let endpoint =
            Self::user_path(id, &format!("/credentials/{}", segment(credential_id)))?;
        self.admin
            .request(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await?;
        Ok(())
    }

    // =========================================================================
    // Groups
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn groups(&self, id: &str, query: GroupQuery) -> Result<Vec<GroupRepresentation>> {
        let endpoint = Self::user_path(id, "/groups")?;
        self.admin
            .request(&endpoint, Method::GET, None, query.to_query().into())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn join_group(&self, id: &str, group_id: &str) -> Result<()> {
        require(group_id, "group id")?;
        let endpoint = Self::user_path(id, &format!("/groups/{}", segment(group_id)))?;
        self.admin
            .request(&endpoint, Method::PUT, None, RequestOptions::new())
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn leave_group(&self, id: &str, group_id: &str) -> Result<()> {
        require(group_id, "group id")?;
        let endpoint = Self::user_path(id, &format!("/groups/{}", segment(group_id)))?;
        self.admin
            .request(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await?;
        Ok(())
    }

    // =========================================================================
    // Emails & sessions
    // =========================================================================

    /// Email the user a link to perform required actions (e.g. `UPDATE_PASSWORD`).
    #[instrument(skip(self))]
    pub async fn execute_actions_email(
        &self,
        id: &str,
        actions: &[String],
        lifespan_secs: Option<u32>,
        client_id: Option<&str>,
        redirect_uri: Option<&str>,
    ) -> Result<()> {
        let endpoint = Self::user_path(id, "/execute-actions-email")?;
        if actions.is_empty() {
            return Err(AdminError::validation("at least one action is required"));
        }
        let query = Query::new()
            .opt("lifespan", lifespan_secs)
            .opt("client_id", client_id)
            .opt("redirect_uri", redirect_uri);
        self.admin
            .request(
                &endpoint,
                Method::PUT,
                Some(Body::json(actions)?),
                query.into(),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn send_verify_email(
        &self,
        id: &str,
        client_id: Option<&str>,
        redirect_uri: Option<&str>,
    ) -> Result<()> {
        let endpoint = Self::user_path(id, "/send-verify-email")?;
        let query = Query::new()
            .opt("client_id", client_id)
            .opt("redirect_uri", redirect_uri);
        self.admin
            .request(&endpoint, Method::PUT, None, query.into())
            .await?;
        Ok(())
    }

    /// End all sessions of the user.
    #[instrument(skip(self))]
    pub async fn logout(&self, id: &str) -> Result<()> {
        let endpoint = Self::user_path(id, "/logout")?;
        self.admin
            .request(&endpoint, Method::POST, None, RequestOptions::new())
            .await?;
        debug!("User sessions ended");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn sessions(&self, id: &str) -> Result<Vec<UserSessionRepresentation>> {
        let endpoint = Self::user_path(id, "/sessions")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    /// Role mappings of one user.
    pub fn role_mappings(&self, id: &str) -> MappingsClient<'a> {
        user_role_mappings(self.admin, id)
    }
}
