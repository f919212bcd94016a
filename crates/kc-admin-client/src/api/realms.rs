// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Realm management.
//!
//! Unlike the other sub-APIs these calls name the realm explicitly, so one
//! client authenticated against `master` can manage every realm.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, instrument};

use super::segment;
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, CONTENT_TYPE_TEXT, Method, Query, RequestOptions};
use crate::types::{
    ClientScopeRepresentation, EventQuery, EventRepresentation, KeysMetadataRepresentation,
    PartialImportResult, RealmRepresentation,
};

/// `/admin/realms` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RealmsApi<'a> {
    admin: &'a KeycloakAdmin,
}

impl<'a> RealmsApi<'a> {
    pub(crate) fn new(admin: &'a KeycloakAdmin) -> Self {
        Self { admin }
    }

    async fn get_in<T: DeserializeOwned + Default>(
        &self,
        realm: &str,
        endpoint: &str,
        query: Query,
    ) -> Result<T> {
        self.admin
            .request_for_realm(realm, endpoint, Method::GET, None, query.into())
            .await?
            .into_json_or_default()
    }

    async fn send_in(
        &self,
        realm: &str,
        endpoint: &str,
        method: Method,
        body: Option<Body>,
    ) -> Result<()> {
        self.admin
            .request_for_realm(realm, endpoint, method, body, RequestOptions::new())
            .await?;
        Ok(())
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// All realms visible to the authenticated user.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<RealmRepresentation>> {
        self.admin
            .request_without_realm("", Method::GET, None, RequestOptions::new())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn get(&self, realm: &str) -> Result<RealmRepresentation> {
        self.admin
            .request_for_realm(realm, "", Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    #[instrument(skip(self, rep), fields(realm = ?rep.realm))]
    pub async fn create(&self, rep: &RealmRepresentation) -> Result<()> {
        if rep.realm.as_deref().is_none_or(|name| name.trim().is_empty()) {
            return Err(AdminError::validation("realm name is required"));
        }
        self.admin
            .request_without_realm("", Method::POST, Some(Body::json(rep)?), RequestOptions::new())
            .await?;
        info!("Realm created");
        Ok(())
    }

    #[instrument(skip(self, rep))]
    pub async fn update(&self, realm: &str, rep: &RealmRepresentation) -> Result<()> {
        self.send_in(realm, "", Method::PUT, Some(Body::json(rep)?))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, realm: &str) -> Result<()> {
        self.send_in(realm, "", Method::DELETE, None).await?;
        info!("Realm deleted");
        Ok(())
    }

    // =========================================================================
    // Import / export
    // =========================================================================

    /// Export realm settings, optionally with clients, groups and roles.
    #[instrument(skip(self))]
    pub async fn partial_export(
        &self,
        realm: &str,
        export_clients: bool,
        export_groups_and_roles: bool,
    ) -> Result<RealmRepresentation> {
        let query = Query::new()
            .param("exportClients", export_clients)
            .param("exportGroupsAndRoles", export_groups_and_roles);
        self.admin
            .request_for_realm(realm, "/partial-export", Method::POST, None, query.into())
            .await?
            .into_json()
    }

    /// Import users, clients, groups, roles and identity providers into an
    /// existing realm. `payload` follows the partial-import document format
    /// (`ifResourceExists`, `users`, `clients`, ...).
    #[instrument(skip(self, payload))]
    pub async fn partial_import(&self, realm: &str, payload: &Value) -> Result<PartialImportResult> {
        self.admin
            .request_for_realm(
                realm,
                "/partial-import",
                Method::POST,
                Some(Body::Json(payload.clone())),
                RequestOptions::new(),
            )
            .await?
            .into_json_or_default()
    }

    // =========================================================================
    // Events
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn events(&self, realm: &str, query: EventQuery) -> Result<Vec<EventRepresentation>> {
        self.get_in(realm, "/events", query.to_query()).await
    }

    #[instrument(skip(self))]
    pub async fn admin_events(
        &self,
        realm: &str,
        query: EventQuery,
    ) -> Result<Vec<EventRepresentation>> {
        self.get_in(realm, "/admin-events", query.to_query()).await
    }

    #[instrument(skip(self))]
    pub async fn clear_events(&self, realm: &str) -> Result<()> {
        self.send_in(realm, "/events", Method::DELETE, None).await
    }

    // =========================================================================
    // Keys, default scopes, localization
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn keys(&self, realm: &str) -> Result<KeysMetadataRepresentation> {
        self.admin
            .request_for_realm(realm, "/keys", Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    /// Client scopes assigned by default to new clients.
    #[instrument(skip(self))]
    pub async fn default_default_client_scopes(
        &self,
        realm: &str,
    ) -> Result<Vec<ClientScopeRepresentation>> {
        self.get_in(realm, "/default-default-client-scopes", Query::new())
            .await
    }

    #[instrument(skip(self))]
    pub async fn add_default_default_client_scope(&self, realm: &str, scope_id: &str) -> Result<()> {
        require(scope_id, "client scope id")?;
        let endpoint = format!("/default-default-client-scopes/{}", segment(scope_id));
        self.send_in(realm, &endpoint, Method::PUT, None).await
    }

    #[instrument(skip(self))]
    pub async fn remove_default_default_client_scope(
        &self,
        realm: &str,
        scope_id: &str,
    ) -> Result<()> {
        require(scope_id, "client scope id")?;
        let endpoint = format!("/default-default-client-scopes/{}", segment(scope_id));
        self.send_in(realm, &endpoint, Method::DELETE, None).await
    }

    /// Realm-level translation overrides for one locale.
    #[instrument(skip(self))]
    pub async fn localization_texts(
        &self,
        realm: &str,
        locale: &str,
    ) -> Result<HashMap<String, String>> {
        require(locale, "locale")?;
        let endpoint = format!("/localization/{}", segment(locale));
        self.get_in(realm, &endpoint, Query::new()).await
    }

    /// One translation override, served as `text/plain`.
    #[instrument(skip(self))]
    pub async fn get_localization_text(
        &self,
        realm: &str,
        locale: &str,
        key: &str,
    ) -> Result<String> {
        let endpoint = localization_key_path(locale, key)?;
        self.admin
            .request_for_realm(realm, &endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_text()
    }

    /// Set one translation override. The text is sent as `text/plain`.
    #[instrument(skip(self, text))]
    pub async fn put_localization_text(
        &self,
        realm: &str,
        locale: &str,
        key: &str,
        text: &str,
    ) -> Result<()> {
        let endpoint = localization_key_path(locale, key)?;
        self.admin
            .request_for_realm(
                realm,
                &endpoint,
                Method::PUT,
                Some(Body::Raw(text.to_string())),
                RequestOptions::new().with_content_type(CONTENT_TYPE_TEXT),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_localization_text(
        &self,
        realm: &str,
        locale: &str,
        key: &str,
    ) -> Result<()> {
        let endpoint = localization_key_path(locale, key)?;
        self.send_in(realm, &endpoint, Method::DELETE, None).await
    }
}

fn localization_key_path(locale: &str, key: &str) -> Result<String> {
    require(locale, "locale")?;
    require(key, "localization key")?;
    Ok(format!("/localization/{}/{}", segment(locale), segment(key)))
}
