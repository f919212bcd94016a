// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the admin client.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{AdminError, Result};

/// Client id used by the Keycloak admin console for password logins.
pub const DEFAULT_ADMIN_CLIENT_ID: &str = "admin-cli";

/// How the client authenticates against the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// A pre-issued bearer token, used verbatim.
    Bearer,
    /// OAuth2 `client_credentials` grant.
    ClientCredentials,
    /// OAuth2 resource owner `password` grant.
    Password,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Bearer => "bearer",
            AuthMethod::ClientCredentials => "client-credentials",
            AuthMethod::Password => "password",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bearer" => Ok(AuthMethod::Bearer),
            "client-credentials" | "client_credentials" => Ok(AuthMethod::ClientCredentials),
            "password" => Ok(AuthMethod::Password),
            other => Err(AdminError::Config(format!(
                "unsupported auth method '{}' (expected bearer, client-credentials or password)",
                other
            ))),
        }
    }
}

/// Credential payload. Each variant carries exactly the fields its grant needs.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Bearer {
        token: String,
    },
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    Password {
        username: String,
        password: String,
        client_id: String,
    },
}

impl Credentials {
    /// Authentication method implied by the credential shape.
    pub fn method(&self) -> AuthMethod {
        match self {
            Credentials::Bearer { .. } => AuthMethod::Bearer,
            Credentials::ClientCredentials { .. } => AuthMethod::ClientCredentials,
            Credentials::Password { .. } => AuthMethod::Password,
        }
    }
}

// Secrets never reach logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
            Credentials::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
            Credentials::Password {
                username,
                client_id,
                ..
            } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("client_id", client_id)
                .finish(),
        }
    }
}

/// Configuration for [`KeycloakAdmin`](crate::KeycloakAdmin).
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the Keycloak server, without a trailing slash.
    pub base_url: String,
    /// Realm the client operates on (and authenticates against).
    pub realm: String,
    /// Credentials used to obtain the admin token.
    pub credentials: Credentials,
    /// Transport timeout applied to every HTTP call. `None` leaves it to reqwest.
    pub request_timeout: Option<Duration>,
    /// How long before expiry a cached token is considered stale.
    pub token_expiry_skew: Duration,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl AdminConfig {
    /// Create a configuration for the given server, realm and credentials.
    pub fn new(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            realm: realm.into(),
            credentials,
            request_timeout: None,
            token_expiry_skew: Duration::from_secs(30),
            user_agent: format!("kc-admin-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Authenticate with a pre-issued bearer token.
    pub fn bearer(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self::new(
            base_url,
            realm,
            Credentials::Bearer {
                token: token.into(),
            },
        )
    }

    /// Authenticate with the `client_credentials` grant.
    pub fn client_credentials(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self::new(
            base_url,
            realm,
            Credentials::ClientCredentials {
                client_id: client_id.into(),
                client_secret: client_secret.into(),
            },
        )
    }

    /// Authenticate with the `password` grant.
    pub fn password(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self::new(
            base_url,
            realm,
            Credentials::Password {
                username: username.into(),
                password: password.into(),
                client_id: client_id.into(),
            },
        )
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `KEYCLOAK_BASE_URL`: Server base URL (required)
    /// - `KEYCLOAK_REALM`: Realm (default: "master")
    /// - `KEYCLOAK_AUTH_METHOD`: bearer | client-credentials | password (default: "password")
    /// - `KEYCLOAK_ADMIN_USERNAME` / `KEYCLOAK_ADMIN_PASSWORD`: password grant
    /// - `KEYCLOAK_ADMIN_CLIENT_ID`: client for the password grant (default: "admin-cli")
    /// - `KEYCLOAK_CLIENT_ID` / `KEYCLOAK_CLIENT_SECRET`: client credentials grant
    /// - `KEYCLOAK_TOKEN`: bearer token
    /// - `KEYCLOAK_REQUEST_TIMEOUT_MS`: Transport timeout in milliseconds (optional)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AdminError::Config(format!("{} is required", key)))
        };

        let base_url = required("KEYCLOAK_BASE_URL")?;
        let realm = lookup("KEYCLOAK_REALM").unwrap_or_else(|| "master".to_string());

        let method: AuthMethod = lookup("KEYCLOAK_AUTH_METHOD")
            .unwrap_or_else(|| "password".to_string())
            .parse()?;

        let credentials = match method {
            AuthMethod::Bearer => Credentials::Bearer {
                token: required("KEYCLOAK_TOKEN")?,
            },
            AuthMethod::ClientCredentials => Credentials::ClientCredentials {
                client_id: required("KEYCLOAK_CLIENT_ID")?,
                client_secret: required("KEYCLOAK_CLIENT_SECRET")?,
            },
            AuthMethod::Password => Credentials::Password {
                username: required("KEYCLOAK_ADMIN_USERNAME")?,
                password: required("KEYCLOAK_ADMIN_PASSWORD")?,
                client_id: lookup("KEYCLOAK_ADMIN_CLIENT_ID")
                    .unwrap_or_else(|| DEFAULT_ADMIN_CLIENT_ID.to_string()),
            },
        };

        let mut config = Self::new(base_url, realm, credentials);

        if let Some(raw) = lookup("KEYCLOAK_REQUEST_TIMEOUT_MS") {
            let ms: u64 = raw.parse().map_err(|e| {
                AdminError::Config(format!("invalid KEYCLOAK_REQUEST_TIMEOUT_MS: {}", e))
            })?;
            config.request_timeout = Some(Duration::from_millis(ms));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is usable and the realm is set.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(AdminError::Config(format!(
                "base url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.realm.trim().is_empty() {
            return Err(AdminError::Config("realm is required".to_string()));
        }
        Ok(())
    }

    /// Authentication method implied by the configured credentials.
    pub fn auth_method(&self) -> AuthMethod {
        self.credentials.method()
    }

    /// `{base_url}/admin`
    pub fn admin_url(&self) -> String {
        format!("{}/admin", self.base_url)
    }

    /// OpenID Connect token endpoint of the configured realm.
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url,
            urlencoding::encode(&self.realm)
        )
    }

    /// Set the realm.
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Set the transport timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set how early a cached token is refreshed before it expires.
    pub fn with_token_expiry_skew(mut self, skew: Duration) -> Self {
        self.token_expiry_skew = skew;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
