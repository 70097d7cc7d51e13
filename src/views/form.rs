//! Validated create/update form view

use crate::config::CollectionConfig;
use crate::core::error::{HalError, HalResult, ValidationErrors};
use crate::core::object::DomainObject;
use crate::core::query::PathParams;
use crate::core::validation::{CleanData, FormSchema, ValidationMode, ValidationResult};
use crate::routing::Routing;
use crate::views::resource::{Resource, as_resource};
use crate::views::response::{HalResponse, SCHEMA_CONTENT_TYPE};
use async_trait::async_trait;
use axum::http::{HeaderValue, Method, StatusCode, header};
use serde_json::Value;
use std::sync::Arc;

/// Media type accepted for partial updates
pub const ACCEPT_PATCH: &str = "application/json;charset=utf-8";

/// Media type accepted for submissions, advertised with the schema
pub const ACCEPT_JSON: &str = "application/json; charset=utf-8";

/// Request-scoped context handed to a [`FormHandler`]
pub struct FormContext<'a> {
    routing: &'a dyn Routing,
    params: &'a PathParams,
    method: Method,
}

impl<'a> FormContext<'a> {
    pub fn new(routing: &'a dyn Routing, params: &'a PathParams, method: Method) -> Self {
        Self {
            routing,
            params,
            method,
        }
    }

    pub fn params(&self) -> &PathParams {
        self.params
    }

    /// Path parameter by name
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn routing(&self) -> &dyn Routing {
        self.routing
    }

    /// Pin `instance` to its URL at `endpoint`
    pub fn as_resource<T: DomainObject>(&self, endpoint: &str, instance: T) -> HalResult<Resource<T>> {
        as_resource(self.routing, endpoint, instance)
    }
}

/// Create/update logic run once a submission is valid
///
/// `clean` is keyed by internal field names.
#[async_trait]
pub trait FormHandler: Send + Sync + 'static {
    async fn create(&self, ctx: &FormContext<'_>, clean: CleanData) -> HalResult<HalResponse>;

    async fn update(&self, ctx: &FormContext<'_>, clean: CleanData) -> HalResult<HalResponse>;
}

/// Where a submission ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Received,
    Validated,
    Dispatched,
    Rejected,
}

/// Validates submissions against a [`FormSchema`] and dispatches them
///
/// POST and PUT are validated in full, PATCH partially. A rejected submission
/// never reaches the handler.
pub struct FormView<H: FormHandler> {
    endpoint: String,
    schema: FormSchema,
    handler: Arc<H>,
}

impl<H: FormHandler> FormView<H> {
    pub fn new(endpoint: impl Into<String>, schema: FormSchema, handler: Arc<H>) -> Self {
        Self {
            endpoint: endpoint.into(),
            schema,
            handler,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Apply the unknown-field policy of a configuration entry
    pub fn with_config(mut self, config: &CollectionConfig) -> Self {
        if let Some(policy) = config.unknown_fields {
            self.schema = self.schema.with_unknown_fields(policy);
        }
        self
    }

    /// Validate `payload` in the mode implied by `method`
    pub fn validate(&self, method: &Method, payload: Option<&Value>) -> HalResult<ValidationResult> {
        let mode = ValidationMode::for_method(method)?;
        let document = payload
            .ok_or_else(|| HalError::bad_request("Request body must be a JSON object"))?
            .as_object()
            .ok_or_else(|| HalError::bad_request("Request body must be a JSON object"))?;
        Ok(self.schema.validate(document, mode))
    }

    /// 422 response listing every field failure
    pub fn error_response(&self, errors: &ValidationErrors) -> HalResponse {
        HalResponse::json(HalError::Validation(errors.clone()).to_body())
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
    }

    /// Validate, then hand the clean data to the handler exactly once
    pub async fn dispatch(
        &self,
        routing: &dyn Routing,
        method: &Method,
        params: &PathParams,
        payload: Option<Value>,
    ) -> HalResult<HalResponse> {
        let mut state = FormState::Received;
        tracing::debug!(form = %self.endpoint, %method, ?state, "form submission");

        let result = self.validate(method, payload.as_ref())?;
        state = FormState::Validated;

        if !result.is_valid() {
            state = FormState::Rejected;
            tracing::debug!(
                form = %self.endpoint,
                ?state,
                errors = %result.errors,
                "form submission rejected"
            );
            return Ok(self.error_response(&result.errors));
        }
        tracing::trace!(form = %self.endpoint, ?state, fields = result.clean.len());

        let ctx = FormContext::new(routing, params, method.clone());
        let response = if *method == Method::POST {
            self.handler.create(&ctx, result.clean).await
        } else {
            self.handler.update(&ctx, result.clean).await
        };
        state = FormState::Dispatched;
        tracing::debug!(form = %self.endpoint, ?state, ok = response.is_ok());
        response
    }

    /// Capability advertisement for OPTIONS
    pub fn options_response(&self, allowed: &[Method]) -> HalResult<HalResponse> {
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let mut response = HalResponse::empty(StatusCode::OK);
        if allowed.contains(&Method::PATCH) {
            response
                .headers
                .insert("accept-patch", HeaderValue::from_static(ACCEPT_PATCH));
        }
        response.with_header(header::ALLOW, &allow)
    }

    /// JSON schema of the field table
    pub fn schema_response(&self) -> HalResponse {
        let mut response = HalResponse::schema(self.schema.json_schema());
        response
            .headers
            .insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        response
    }

    /// OPTIONS answer: the schema when the client accepts it, else the advertisement
    pub fn options(&self, accept: Option<&str>, allowed: &[Method]) -> HalResult<HalResponse> {
        match accept {
            Some(accept) if accept.contains(SCHEMA_CONTENT_TYPE) => Ok(self.schema_response()),
            _ => self.options_response(allowed),
        }
    }
}
