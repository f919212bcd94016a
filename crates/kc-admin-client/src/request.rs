// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Request descriptors: body, query string and per-call options.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

pub use reqwest::Method;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Serialized as JSON, or form-encoded when the content type says so.
    Json(Value),
    /// Sent verbatim.
    Raw(String),
}

impl Body {
    /// Serialize any value into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }

    /// A form body built from key/value pairs.
    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in pairs {
            serializer.append_pair(k.as_ref(), v.as_ref());
        }
        Body::Raw(serializer.finish())
    }

    /// Render the body for the wire given the effective content type.
    pub(crate) fn encode(&self, content_type: &str) -> Result<String> {
        match self {
            Body::Raw(text) => Ok(text.clone()),
            Body::Json(Value::String(text)) if is_form(content_type) => Ok(text.clone()),
            Body::Json(Value::Object(map)) if is_form(content_type) => {
                let mut serializer = url::form_urlencoded::Serializer::new(String::new());
                for (k, v) in map {
                    match v {
                        Value::Null => {}
                        Value::String(s) => {
                            serializer.append_pair(k, s);
                        }
                        other => {
                            serializer.append_pair(k, &other.to_string());
                        }
                    }
                }
                Ok(serializer.finish())
            }
            Body::Json(value) => Ok(serde_json::to_string(value)?),
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

fn is_form(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case(CONTENT_TYPE_FORM))
        .unwrap_or(false)
}

/// Ordered query parameters. Entries without a value are dropped on render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, Option<String>)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), Some(value.to_string())));
        self
    }

    /// Append a parameter that may be unset.
    pub fn opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.params
            .push((key.into(), value.map(|v| v.to_string())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.iter().all(|(_, v)| v.is_none())
    }

    /// `key=value&...` with both sides percent-encoded, in insertion order.
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .filter_map(|(k, v)| {
                v.as_ref().map(|v| {
                    format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))
                })
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append the rendered query to an endpoint path.
    pub fn append_to(&self, endpoint: &str) -> String {
        if self.is_empty() {
            return endpoint.to_string();
        }
        let query = self.to_query_string();
        if endpoint.contains('?') {
            format!("{}&{}", endpoint, query)
        } else {
            format!("{}?{}", endpoint, query)
        }
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Query,
    /// Header overrides, applied after the defaults (caller wins).
    pub headers: Vec<(String, String)>,
    /// Return the body as bytes instead of interpreting it.
    pub expect_binary: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    pub fn expect_binary(mut self) -> Self {
        self.expect_binary = true;
        self
    }

    /// Effective content type after overrides.
    pub(crate) fn content_type(&self) -> &str {
        self.headers
            .iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
            .unwrap_or(CONTENT_TYPE_JSON)
    }
}

impl From<Query> for RequestOptions {
    fn from(query: Query) -> Self {
        Self::new().with_query(query)
    }
}
