//! Axum extractor for form submissions
//!
//! This module provides the [`Submission`] extractor that reads the HTTP verb
//! and the JSON body of a create/update request. A malformed body is rejected
//! as a bad request before any validation or handler logic runs.

use crate::core::error::HalError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::Method,
};
use serde_json::Value;

/// Raw form submission: verb plus the decoded JSON body, if any
///
/// # Usage
///
/// ```rust,ignore
/// async fn create(submission: Submission) -> HalResult<HalResponse> {
///     form.dispatch(&submission.method, &PathParams::new(), submission.payload).await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Submission {
    pub method: Method,
    /// `None` when the request carried no body
    pub payload: Option<Value>,
}

impl Submission {
    pub fn new(method: Method, payload: Option<Value>) -> Self {
        Self { method, payload }
    }

    /// Decode a raw body; blank bodies yield no payload
    pub fn parse(method: Method, body: &[u8]) -> Result<Self, HalError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new(method, None));
        }
        let payload: Value = serde_json::from_slice(body)?;
        Ok(Self::new(method, Some(payload)))
    }
}

impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = HalError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| HalError::bad_request(format!("Unreadable body: {}", e)))?;

        Submission::parse(method, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    #[test]
    fn test_parse_json_body() {
        let submission = Submission::parse(Method::POST, br#"{"score": 3}"#).unwrap();
        assert_eq!(submission.payload, Some(json!({"score": 3})));
    }

    #[test]
    fn test_parse_empty_body() {
        let submission = Submission::parse(Method::PATCH, b"  \n").unwrap();
        assert!(submission.payload.is_none());
    }

    #[test]
    fn test_parse_malformed_body_is_bad_request() {
        let err = Submission::parse(Method::POST, b"{score: 3").unwrap_err();
        assert!(matches!(err, HalError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_from_request() {
        let req = Request::builder()
            .method(Method::PATCH)
            .uri("/workouts/1")
            .body(Body::from(r#"{"title": "X"}"#))
            .unwrap();

        let submission = Submission::from_request(req, &()).await.unwrap();
        assert_eq!(submission.method, Method::PATCH);
        assert_eq!(submission.payload.unwrap()["title"], "X");
    }
}
