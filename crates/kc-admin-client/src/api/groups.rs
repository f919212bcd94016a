// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Groups of the configured realm.

use tracing::{info, instrument};

use super::mappings::{MappingsClient, group_role_mappings};
use super::segment;
use crate::client::KeycloakAdmin;
use crate::error::{AdminError, Result, require};
use crate::request::{Body, Method, Query, RequestOptions};
use crate::types::{CountResponse, GroupQuery, GroupRepresentation, UserRepresentation};

/// `/groups` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct GroupsApi<'a> {
    admin: &'a KeycloakAdmin,
}

fn require_name(group: &GroupRepresentation) -> Result<()> {
    if group.name.as_deref().is_none_or(|name| name.trim().is_empty()) {
        return Err(AdminError::validation("group name is required"));
    }
    Ok(())
}

impl<'a> GroupsApi<'a> {
    pub(crate) fn new(admin: &'a KeycloakAdmin) -> Self {
        Self { admin }
    }

    fn group_path(id: &str, suffix: &str) -> Result<String> {
        require(id, "group id")?;
        Ok(format!("/groups/{}{}", segment(id), suffix))
    }

    /// Top-level groups.
    #[instrument(skip(self))]
    pub async fn list(&self, query: GroupQuery) -> Result<Vec<GroupRepresentation>> {
        self.admin
            .request("/groups", Method::GET, None, query.to_query().into())
            .await?
            .into_json_or_default()
    }

    #[instrument(skip(self))]
    pub async fn count(&self, search: Option<&str>) -> Result<u64> {
        let query = Query::new().opt("search", search);
        let count: CountResponse = self
            .admin
            .request("/groups/count", Method::GET, None, query.into())
            .await?
            .into_json()?;
        Ok(count.count)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<GroupRepresentation> {
        let endpoint = Self::group_path(id, "")?;
        self.admin
            .request(&endpoint, Method::GET, None, RequestOptions::new())
            .await?
            .into_json()
    }

    /// Create a top-level group and return its id.
    #[instrument(skip(self, group), fields(name = ?group.name))]
    pub async fn create(&self, group: &GroupRepresentation) -> Result<String> {
        require_name(group)?;
        let id = self
            .admin
            .request(
                "/groups",
                Method::POST,
                Some(Body::json(group)?),
                RequestOptions::new(),
            )
            .await?
            .into_id()?;
        info!(group_id = %id, "Group created");
        Ok(id)
    }

    #[instrument(skip(self, group))]
    pub async fn update(&self, id: &str, group: &GroupRepresentation) -> Result<()> {
        let endpoint = Self::group_path(id, "")?;
        self.admin
            .request(
                &endpoint,
                Method::PUT,
                Some(Body::json(group)?),
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let endpoint = Self::group_path(id, "")?;
        self.admin
            .request(&endpoint, Method::DELETE, None, RequestOptions::new())
            .await?;
        info!("Group deleted");
        Ok(())
    }

    // =========================================================================
    // Hierarchy & members
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn children(&self, id: &str, query: GroupQuery) -> Result<Vec<GroupRepresentation>> {
        let endpoint = Self::group_path(id, "/children")?;
        self.admin
            .request(&endpoint, Method::GET, None, query.to_query().into())
            .await?
            .into_json_or_default()
    }

    /// Create a subgroup. The server answers with the created group, whose id is returned.
    #[instrument(skip(self, group), fields(name = ?group.name))]
    pub async fn create_child(&self, parent_id: &str, group: &GroupRepresentation) -> Result<String> {
        let endpoint = Self::group_path(parent_id, "/children")?;
        require_name(group)?;
        let id = self
            .admin
            .request(
                &endpoint,
                Method::POST,
                Some(Body::json(group)?),
                RequestOptions::new(),
            )
            .await?
            .into_id()?;
        info!(group_id = %id, "Subgroup created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn members(
        &self,
        id: &str,
        first: Option<u32>,
        max: Option<u32>,
    ) -> Result<Vec<UserRepresentation>> {
        let endpoint = Self::group_path(id, "/members")?;
        let query = Query::new().opt("first", first).opt("max", max);
        self.admin
            .request(&endpoint, Method::GET, None, query.into())
            .await?
            .into_json_or_default()
    }

    /// Role mappings of one group.
    pub fn role_mappings(&self, id: &str) -> MappingsClient<'a> {
        group_role_mappings(self.admin, id)
    }
}
