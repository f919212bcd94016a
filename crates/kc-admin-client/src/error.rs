// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for kc-admin-client.

use thiserror::Error;

/// Result type using AdminError.
pub type Result<T> = std::result::Result<T, AdminError>;

/// Errors that can occur when talking to the admin API.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Configuration error (missing or invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Token could not be obtained from the token endpoint.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Admin endpoint answered with a non-2xx status.
    #[error("request failed with status {status} {status_text}: {body}")]
    Request {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Transport-level failure (DNS, connection refused, TLS, ...).
    #[error("network error: {0}")]
    Network(String),

    /// A required argument was missing or empty.
    #[error("validation error: {0}")]
    Validation(String),

    /// Response was declared as JSON but could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request body could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Response had a different shape than the caller expected.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl AdminError {
    /// HTTP status of a failed admin request, if this is a request error.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdminError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the admin API reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AdminError::Validation(message.into())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for AdminError {
    fn from(err: url::ParseError) -> Self {
        AdminError::Config(format!("invalid url: {}", err))
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        AdminError::Network(err.to_string())
    }
}

/// Reject an empty identifier before any request is issued.
pub(crate) fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdminError::validation(format!("{} is required", what)));
    }
    Ok(())
}
