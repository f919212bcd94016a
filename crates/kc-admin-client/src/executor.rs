// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Single HTTP call against an admin endpoint.

use reqwest::header::{
    AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, LOCATION,
};
use tracing::{debug, warn};
use url::Url;

use crate::error::{AdminError, Result};
use crate::request::{Body, CONTENT_TYPE_JSON, Method, RequestOptions};
use crate::response::{ApiResponse, ResponseParts, interpret};

const UNREADABLE_BODY: &str = "<unreadable response body>";

/// Issue one request with a bearer token and shape the response.
///
/// Non-2xx answers become [`AdminError::Request`] carrying the status and the
/// raw body; transport failures become [`AdminError::Network`].
pub async fn execute(
    http: &reqwest::Client,
    url: &str,
    method: Method,
    token: &str,
    body: Option<&Body>,
    options: &RequestOptions,
) -> Result<ApiResponse> {
    let parsed_url = Url::parse(url)?;
    let content_type = options.content_type();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| AdminError::Authentication(format!("token is not a valid header: {}", e)))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));

    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AdminError::validation(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            AdminError::validation(format!("invalid header value for {}: {}", name, e))
        })?;
        headers.insert(name, value);
    }

    let mut request = http
        .request(method.clone(), parsed_url.clone())
        .headers(headers);

    if let Some(body) = body {
        request = request.body(body.encode(content_type)?);
    }

    debug!(method = %method, url = %parsed_url, "Sending admin request");

    let response = request.send().await.map_err(|e| {
        AdminError::Network(format!("{} {} failed: {}", method, parsed_url, e))
    })?;

    let status = response.status();

    if !status.is_success() {
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| UNREADABLE_BODY.to_string());
        warn!(status = status.as_u16(), url = %parsed_url, "Admin request failed");
        return Err(AdminError::Request {
            status: status.as_u16(),
            status_text,
            body,
        });
    }

    let headers = response.headers().clone();
    let header_str = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
    let content_length = header_str(CONTENT_LENGTH).and_then(|v| v.parse::<u64>().ok());

    let bytes = response.bytes().await.map_err(|e| {
        AdminError::Network(format!("failed to read response from {}: {}", parsed_url, e))
    })?;

    let parts = ResponseParts {
        status: status.as_u16(),
        method: &method,
        request_path: parsed_url.path(),
        content_type: header_str(CONTENT_TYPE),
        location: header_str(LOCATION),
        content_length,
        expect_binary: options.expect_binary,
    };

    interpret(&parts, bytes)
}
