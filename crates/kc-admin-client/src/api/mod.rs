// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource sub-APIs.
//!
//! Each sub-API borrows a [`KeycloakAdmin`](crate::KeycloakAdmin) and binds one
//! family of admin endpoints. Identifiers are validated before any request is
//! sent, and path segments are percent-encoded.

mod authorization;
mod client_scopes;
mod clients;
mod components;
mod groups;
mod identity_providers;
mod mappings;
mod organizations;
mod realms;
mod roles;
mod users;

pub use authorization::AuthorizationApi;
pub use client_scopes::ClientScopesApi;
pub use clients::ClientsApi;
pub use components::ComponentsApi;
pub use groups::GroupsApi;
pub use identity_providers::IdentityProvidersApi;
pub use mappings::{
    MappingsClient, client_scope_mappings, client_scope_scope_mappings, group_role_mappings,
    user_role_mappings,
};
pub use organizations::OrganizationsApi;
pub use realms::RealmsApi;
pub use roles::RolesApi;
pub use users::UsersApi;

use crate::error::{AdminError, Result};
use crate::types::RoleRepresentation;

/// Percent-encode one path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Role-mapping endpoints take a non-empty list of role references.
pub(crate) fn require_roles(roles: &[RoleRepresentation]) -> Result<()> {
    if roles.is_empty() {
        return Err(AdminError::validation("at least one role is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("plain-id"), "plain-id");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }

    #[test]
    fn test_require_roles() {
        assert!(matches!(
            require_roles(&[]),
            Err(AdminError::Validation(_))
        ));
        assert!(require_roles(&[RoleRepresentation::new("admin")]).is_ok());
    }
}
