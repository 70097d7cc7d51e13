//! Reverse route resolution
//!
//! Turns an endpoint name plus a domain instance into the canonical URL of
//! that instance, reading path parameters from the instance's attributes.

use crate::core::error::{HalError, HalResult};
use crate::core::object::DomainObject;
use crate::core::query::PathParams;
use crate::routing::registry::{RouteDefinition, Routing};
use axum::http::Method;

/// Resolved identity of one domain instance at an endpoint
///
/// Built once per render and never persisted. `cached` holds the instance the
/// handle was resolved from, so rendering it does not query storage again.
#[derive(Debug, Clone)]
pub struct ResourceHandle<T> {
    pub endpoint: String,
    pub params: PathParams,
    pub url: String,
    pub cached: Option<T>,
}

/// Resolves resource handles through a [`Routing`] collaborator
pub struct RouteResolver<'a> {
    routing: &'a dyn Routing,
}

impl<'a> RouteResolver<'a> {
    pub fn new(routing: &'a dyn Routing) -> Self {
        Self { routing }
    }

    /// First route of `endpoint` that serves GET and takes at least one parameter
    ///
    /// When several routes qualify, registration order decides.
    pub fn qualifying_route(&self, endpoint: &str) -> HalResult<&'a RouteDefinition> {
        self.routing
            .routes_for(endpoint)
            .into_iter()
            .find(|route| route.accepts(&Method::GET) && route.template.has_arguments())
            .ok_or_else(|| {
                tracing::warn!(endpoint, "no GET route with path parameters");
                HalError::unresolvable(endpoint, "no GET route with path parameters")
            })
    }

    /// Build the handle of `instance` at `endpoint`
    ///
    /// Every path parameter of the selected route must be an attribute of the
    /// instance; a partially substituted URL is never produced.
    pub fn resolve<T: DomainObject>(
        &self,
        endpoint: &str,
        instance: T,
    ) -> HalResult<ResourceHandle<T>> {
        let route = self.qualifying_route(endpoint)?;

        let mut params = PathParams::new();
        for argument in route.template.arguments() {
            let value = instance
                .attribute(argument)
                .and_then(|value| value.to_path_segment())
                .ok_or_else(|| {
                    tracing::warn!(endpoint, argument, "instance lacks route attribute");
                    HalError::unresolvable(
                        endpoint,
                        format!("instance has no attribute '{}'", argument),
                    )
                })?;
            params.insert(argument.to_string(), value);
        }

        let url = route
            .template
            .render(&params)
            .map_err(|reason| HalError::unresolvable(endpoint, reason))?;

        tracing::debug!(endpoint, url = %url, "resolved resource handle");
        Ok(ResourceHandle {
            endpoint: endpoint.to_string(),
            params,
            url,
            cached: Some(instance),
        })
    }
}
