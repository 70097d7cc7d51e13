//! Single-resource HAL view

use crate::core::error::{HalError, HalResult};
use crate::core::object::DomainObject;
use crate::core::query::PathParams;
use crate::core::service::QuerySource;
use crate::routing::{ResourceHandle, RouteResolver, Routing};
use crate::views::response::HalResponse;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// One domain object pinned to its URL
///
/// Rendering a `Resource` never touches storage: the object is already
/// loaded, either by a query or from a handle's cached instance.
#[derive(Debug, Clone)]
pub struct Resource<T> {
    pub url: String,
    pub params: PathParams,
    pub object: T,
}

impl<T: DomainObject> Resource<T> {
    pub fn new(url: impl Into<String>, params: PathParams, object: T) -> Self {
        Self {
            url: url.into(),
            params,
            object,
        }
    }

    /// Build from a resolved handle; the handle must carry its instance
    pub fn from_handle(handle: ResourceHandle<T>) -> HalResult<Self> {
        let ResourceHandle {
            endpoint,
            params,
            url,
            cached,
        } = handle;
        let object = cached.ok_or_else(|| {
            HalError::Internal(format!("handle for '{}' carries no instance", endpoint))
        })?;
        Ok(Self::new(url, params, object))
    }

    /// `self` plus the object's own links; `self` is never overwritten
    pub fn links(&self) -> Map<String, Value> {
        let mut links = Map::new();
        links.insert("self".to_string(), json!({ "href": self.url }));
        if let Some(extra) = self.object.links() {
            for (rel, link) in extra {
                if !links.contains_key(&rel) {
                    links.insert(rel, link);
                }
            }
        }
        links
    }

    /// `{ _links, ...projection }`
    pub fn json(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("_links".to_string(), Value::Object(self.links()));
        for (key, value) in self.object.json() {
            if key != "_links" {
                body.insert(key, value);
            }
        }
        body
    }

    pub fn into_response(self) -> HalResponse {
        HalResponse::hal(Value::Object(self.json()))
    }
}

/// Resolve `instance` at `endpoint` and pin it as a renderable resource
pub fn as_resource<T: DomainObject>(
    routing: &dyn Routing,
    endpoint: &str,
    instance: T,
) -> HalResult<Resource<T>> {
    let handle = RouteResolver::new(routing).resolve(endpoint, instance)?;
    Resource::from_handle(handle)
}

/// Renders one object of a [`QuerySource`] as a HAL resource
pub struct ResourceView<S: QuerySource> {
    endpoint: String,
    source: Arc<S>,
}

impl<S: QuerySource> Clone for ResourceView<S> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            source: self.source.clone(),
        }
    }
}

impl<S: QuerySource> ResourceView<S> {
    pub fn new(endpoint: impl Into<String>, source: Arc<S>) -> Self {
        Self {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// The object matching `params`, or NotFound
    pub async fn query(&self, params: &PathParams) -> HalResult<S::Object> {
        self.source
            .filter_by(params)
            .await?
            .ok_or_else(|| HalError::not_found(&self.endpoint))
    }

    /// Render a handle, reusing its cached instance when present
    pub async fn render(&self, handle: ResourceHandle<S::Object>) -> HalResult<Resource<S::Object>> {
        match handle.cached {
            Some(object) => Ok(Resource::new(handle.url, handle.params, object)),
            None => {
                let object = self.query(&handle.params).await?;
                Ok(Resource::new(handle.url, handle.params, object))
            }
        }
    }

    /// Serve the object at `url`
    pub async fn get(&self, url: &str, params: &PathParams) -> HalResult<HalResponse> {
        let object = self.query(params).await?;
        tracing::debug!(endpoint = %self.endpoint, url, "rendering resource");
        Ok(Resource::new(url, params.clone(), object).into_response())
    }
}
