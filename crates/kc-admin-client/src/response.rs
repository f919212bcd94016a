// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Response shaping.
//!
//! Every successful admin call ends up as one [`ApiResponse`] variant. The
//! variant is chosen by [`interpret`] from the status, method, request path,
//! a few headers and the body bytes; callers then convert it into the type
//! they expect with the `into_*` helpers.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{AdminError, Result};
use crate::request::Method;

/// Collections whose `POST` answers `201 Created` with the new id in `Location`.
pub const ID_RETURNING_COLLECTIONS: &[&str] = &[
    "users",
    "groups",
    "clients",
    "roles",
    "client-scopes",
    "organizations",
    "mappers",
];

/// Shape of a successful admin API response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Parsed JSON body.
    Json(Value),
    /// Identifier taken from the `Location` header of a create.
    ExtractedId(String),
    /// No content.
    Empty,
    /// Non-JSON body as text.
    Text(String),
    /// Raw bytes, only when the caller asked for them.
    Binary(Bytes),
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, ApiResponse::Empty)
    }

    /// Deserialize a JSON response. An empty response is an error.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            ApiResponse::Json(value) => serde_json::from_value(value)
                .map_err(|e| AdminError::Parse(format!("unexpected JSON shape: {}", e))),
            other => Err(AdminError::UnexpectedResponse(format!(
                "expected a JSON body, got {}",
                other.kind()
            ))),
        }
    }

    /// Deserialize a JSON response, mapping an empty response to `None`.
    pub fn into_json_opt<T: DeserializeOwned>(self) -> Result<Option<T>> {
        match self {
            ApiResponse::Empty => Ok(None),
            other => other.into_json().map(Some),
        }
    }

    /// Deserialize a JSON response, mapping an empty response to `T::default()`.
    pub fn into_json_or_default<T: DeserializeOwned + Default>(self) -> Result<T> {
        Ok(self.into_json_opt()?.unwrap_or_default())
    }

    /// Identifier of a created resource.
    pub fn into_id(self) -> Result<String> {
        match self {
            ApiResponse::ExtractedId(id) => Ok(id),
            ApiResponse::Json(Value::Object(map)) => match map.get("id") {
                Some(Value::String(id)) => Ok(id.clone()),
                _ => Err(AdminError::UnexpectedResponse(
                    "created resource has no id".to_string(),
                )),
            },
            other => Err(AdminError::UnexpectedResponse(format!(
                "expected a created resource id, got {}",
                other.kind()
            ))),
        }
    }

    /// Body as text.
    pub fn into_text(self) -> Result<String> {
        match self {
            ApiResponse::Text(text) => Ok(text),
            ApiResponse::Json(Value::String(text)) => Ok(text),
            ApiResponse::Json(value) => Ok(value.to_string()),
            ApiResponse::Empty => Ok(String::new()),
            other => Err(AdminError::UnexpectedResponse(format!(
                "expected text, got {}",
                other.kind()
            ))),
        }
    }

    /// Body as bytes.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            ApiResponse::Binary(bytes) => Ok(bytes),
            ApiResponse::Text(text) => Ok(Bytes::from(text)),
            ApiResponse::Empty => Ok(Bytes::new()),
            other => Err(AdminError::UnexpectedResponse(format!(
                "expected binary content, got {}",
                other.kind()
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiResponse::Json(_) => "JSON",
            ApiResponse::ExtractedId(_) => "an extracted id",
            ApiResponse::Empty => "an empty response",
            ApiResponse::Text(_) => "text",
            ApiResponse::Binary(_) => "binary content",
        }
    }
}

/// Everything [`interpret`] looks at besides the body.
#[derive(Debug, Clone)]
pub struct ResponseParts<'a> {
    pub status: u16,
    pub method: &'a Method,
    /// Path of the request URL (no query).
    pub request_path: &'a str,
    pub content_type: Option<&'a str>,
    pub location: Option<&'a str>,
    pub content_length: Option<u64>,
    pub expect_binary: bool,
}

/// Decide the shape of a successful (2xx) response.
pub fn interpret(parts: &ResponseParts<'_>, body: Bytes) -> Result<ApiResponse> {
    let is_json = parts.content_type.map(is_json_content_type).unwrap_or(false);

    if parts.status == 201 {
        if is_json
            && let Some(value) = parse_json_body(&body)?
        {
            return Ok(ApiResponse::Json(value));
        }

        if let Some(location) = parts.location
            && *parts.method == Method::POST
            && returns_created_id(parts.request_path)
            && let Some(id) = location_id(location)
        {
            return Ok(ApiResponse::ExtractedId(id));
        }

        return Ok(ApiResponse::Empty);
    }

    if parts.status == 204 || parts.content_length == Some(0) {
        return Ok(ApiResponse::Empty);
    }

    if parts.expect_binary {
        return Ok(ApiResponse::Binary(body));
    }

    if is_json {
        return Ok(match parse_json_body(&body)? {
            Some(value) => ApiResponse::Json(value),
            None => ApiResponse::Empty,
        });
    }

    Ok(ApiResponse::Text(String::from_utf8_lossy(&body).into_owned()))
}

/// Blank and `null` bodies yield `None`; anything unparsable is an error.
fn parse_json_body(body: &[u8]) -> Result<Option<Value>> {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(AdminError::Parse(format!(
            "response declared as JSON could not be parsed: {}",
            e
        ))),
    }
}

pub(crate) fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

fn returns_created_id(request_path: &str) -> bool {
    last_segment(request_path)
        .map(|segment| ID_RETURNING_COLLECTIONS.contains(&segment))
        .unwrap_or(false)
}

/// Trailing path segment of a `Location` value. Absolute URLs contribute
/// only their path; anything else is treated as a path.
fn location_id(location: &str) -> Option<String> {
    match Url::parse(location) {
        Ok(url) if url.has_host() => last_segment(url.path()).map(str::to_string),
        _ => last_segment(location).map(str::to_string),
    }
}

/// Last non-empty segment of a path, ignoring any query or fragment.
fn last_segment(path: &str) -> Option<&str> {
    let without_query = path.split(['?', '#']).next().unwrap_or_default();
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
