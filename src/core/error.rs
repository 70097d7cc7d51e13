//! Typed error handling for hal-rs
//!
//! Every view operation returns a [`HalResult`]. Each [`HalError`] variant knows
//! the HTTP status it maps to, so handlers can simply bubble errors up with `?`
//! and let [`IntoResponse`] build the response.
//!
//! # Error Categories
//!
//! - [`HalError::NotFound`]: no record matches the resource/query filter
//! - [`HalError::Validation`]: one or more field failures, carrying every failure
//! - [`HalError::UnresolvableRoute`]: endpoint/attribute wiring defect
//! - [`HalError::BadRequest`]: malformed body or query parameters
//!
//! # Example
//!
//! ```rust,ignore
//! async fn show(view: &ResourceView<Store>, params: &PathParams) -> HalResult<HalResponse> {
//!     let workout = view.query(params).await?; // 404 when absent
//!     Ok(Resource::new("/workouts/1", params.clone(), workout).into_response())
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};

/// Content type of every error body
pub const ERROR_CONTENT_TYPE: &str = "application/json";

/// The main error type for hal-rs
#[derive(Debug, thiserror::Error)]
pub enum HalError {
    /// No record matches the filter derived from the request
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// One or more fields failed validation
    #[error("Validation error")]
    Validation(ValidationErrors),

    /// No route could be resolved for an endpoint and an instance
    ///
    /// This is a wiring defect (endpoint name and instance attributes do not
    /// match), not a fault of the API consumer.
    #[error("Cannot resolve a route for endpoint '{endpoint}': {reason}")]
    UnresolvableRoute { endpoint: String, reason: String },

    /// Malformed request (body or query parameters)
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// The verb is not served by this view
    #[error("Method {method} not allowed")]
    MethodNotAllowed { method: String },

    /// Invalid view or route configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage collaborator failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal framework errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HalError {
    /// Shorthand for [`HalError::NotFound`]
    pub fn not_found(resource: impl Into<String>) -> Self {
        HalError::NotFound {
            resource: resource.into(),
        }
    }

    /// Shorthand for [`HalError::BadRequest`]
    pub fn bad_request(message: impl Into<String>) -> Self {
        HalError::BadRequest {
            message: message.into(),
        }
    }

    /// Shorthand for [`HalError::UnresolvableRoute`]
    pub fn unresolvable(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        HalError::UnresolvableRoute {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HalError::NotFound { .. } => StatusCode::NOT_FOUND,
            HalError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HalError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HalError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            HalError::UnresolvableRoute { .. }
            | HalError::Config(_)
            | HalError::Storage(_)
            | HalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HalError::NotFound { .. } => "NOT_FOUND",
            HalError::Validation(_) => "VALIDATION_ERROR",
            HalError::UnresolvableRoute { .. } => "UNRESOLVABLE_ROUTE",
            HalError::BadRequest { .. } => "BAD_REQUEST",
            HalError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            HalError::Config(_) => "CONFIG_ERROR",
            HalError::Storage(_) => "STORAGE_ERROR",
            HalError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Build the JSON error body
    ///
    /// Validation errors use the `{ message, errors: { field: reason } }` shape,
    /// every other error `{ message, code }`.
    pub fn to_body(&self) -> Value {
        match self {
            HalError::Validation(errors) => serde_json::json!({
                "message": "Validation error",
                "errors": errors.to_map(),
            }),
            other => serde_json::json!({
                "message": other.to_string(),
                "code": other.error_code(),
            }),
        }
    }
}

impl IntoResponse for HalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            HalError::UnresolvableRoute { .. } | HalError::Config(_) | HalError::Internal(_) => {
                tracing::error!(code = self.error_code(), "{}", self);
            }
            HalError::Storage(_) => tracing::warn!(code = self.error_code(), "{}", self),
            _ => tracing::debug!(status = %status.as_u16(), "{}", self),
        }
        (
            status,
            [(CONTENT_TYPE, ERROR_CONTENT_TYPE)],
            Json(self.to_body()),
        )
            .into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single field failure, keyed by the externally exposed field name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

/// Ordered collection of field failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a failure for `field`
    pub fn push(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            reason: reason.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Reason recorded for `field`, if any
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.reason.as_str())
    }

    /// `{ field: reason }` map, keeping the first reason of each field
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for error in &self.0 {
            if !map.contains_key(&error.field) {
                map.insert(error.field.clone(), Value::String(error.reason.clone()));
            }
        }
        map
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msgs: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.reason))
            .collect();
        write!(f, "{}", msgs.join(", "))
    }
}

impl From<ValidationErrors> for HalError {
    fn from(errors: ValidationErrors) -> Self {
        HalError::Validation(errors)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for HalError {
    fn from(err: serde_json::Error) -> Self {
        HalError::bad_request(format!("Invalid JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for HalError {
    fn from(err: serde_yaml::Error) -> Self {
        HalError::Config(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for hal-rs operations
pub type HalResult<T> = Result<T, HalError>;

// =============================================================================
// Tests
// =============================================================================
