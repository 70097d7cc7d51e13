//! Response type shared by the views

use crate::core::error::{HalError, HalResult};
use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// Content type of resource and collection representations
pub const HAL_CONTENT_TYPE: &str = "application/hal+json";

/// Content type of form schema documents
pub const SCHEMA_CONTENT_TYPE: &str = "application/schema+json";

/// Status, headers and optional JSON body produced by a view
///
/// Kept as plain data so views can be exercised without an HTTP stack;
/// converts into an axum [`Response`] at the edge.
#[derive(Debug, Clone)]
pub struct HalResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl HalResponse {
    /// 200 response with an `application/hal+json` body
    pub fn hal(body: Value) -> Self {
        Self::with_content_type(body, HAL_CONTENT_TYPE)
    }

    /// 200 response with an `application/json` body
    pub fn json(body: Value) -> Self {
        Self::with_content_type(body, "application/json")
    }

    /// 200 response with an `application/schema+json` body
    pub fn schema(body: Value) -> Self {
        Self::with_content_type(body, SCHEMA_CONTENT_TYPE)
    }

    /// Response without a body
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    fn with_content_type(body: Value, content_type: &'static str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status: StatusCode::OK,
            headers,
            body: Some(body),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set a header, replacing any previous value
    pub fn with_header(mut self, name: HeaderName, value: &str) -> HalResult<Self> {
        let value = HeaderValue::from_str(value).map_err(|e| {
            HalError::Internal(format!("invalid value for header '{}': {}", name, e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Header value as text, if present and printable
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl IntoResponse for HalResponse {
    fn into_response(self) -> Response {
        let body = match self.body {
            Some(value) => match serde_json::to_vec(&value) {
                Ok(bytes) => Body::from(bytes),
                Err(e) => {
                    return HalError::Internal(format!("unserializable body: {}", e))
                        .into_response();
                }
            },
            None => Body::empty(),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
