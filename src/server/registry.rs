//! Collection registry for route registration and router assembly

use super::collection::CollectionDescriptor;
use crate::core::error::{HalError, HalResult};
use crate::routing::RouteTable;
use axum::Router;
use std::sync::Arc;

/// Registry for all collections in the application
///
/// Keeps collections in registration order, which is also the order their
/// routes enter the [`RouteTable`].
#[derive(Default)]
pub struct CollectionRegistry {
    collections: Vec<Box<dyn CollectionDescriptor>>,
}

impl CollectionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            collections: Vec::new(),
        }
    }

    /// Register a collection and record its routes in `table`
    pub fn register(
        &mut self,
        collection: Box<dyn CollectionDescriptor>,
        table: &mut RouteTable,
    ) -> HalResult<()> {
        if self.collections.iter().any(|c| c.name() == collection.name()) {
            return Err(HalError::Config(format!(
                "collection '{}' is already registered",
                collection.name()
            )));
        }
        collection.register_routes(table)?;
        tracing::debug!(collection = collection.name(), "collection registered");
        self.collections.push(collection);
        Ok(())
    }

    /// Build a router with the routes of every registered collection
    pub fn build_routes(&self, routing: Arc<RouteTable>) -> Router {
        self.collections
            .iter()
            .fold(Router::new(), |router, collection| {
                router.merge(collection.build_routes(routing.clone()))
            })
    }

    /// Registered collection names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.collections.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    /// Minimal descriptor registering a single GET route
    struct MockCollection {
        name: String,
    }

    impl MockCollection {
        fn boxed(name: &str) -> Box<dyn CollectionDescriptor> {
            Box::new(Self {
                name: name.to_string(),
            })
        }
    }

    impl CollectionDescriptor for MockCollection {
        fn name(&self) -> &str {
            &self.name
        }

        fn register_routes(&self, table: &mut RouteTable) -> HalResult<()> {
            table.add(self.name.clone(), &format!("/{}", self.name), &[Method::GET])?;
            Ok(())
        }

        fn build_routes(&self, _routing: Arc<RouteTable>) -> Router {
            Router::new()
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = CollectionRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_register_keeps_order_and_routes() {
        let mut registry = CollectionRegistry::new();
        let mut table = RouteTable::new();
        registry
            .register(MockCollection::boxed("workouts"), &mut table)
            .unwrap();
        registry
            .register(MockCollection::boxed("athletes"), &mut table)
            .unwrap();

        assert_eq!(registry.names(), vec!["workouts", "athletes"]);
        assert_eq!(table.endpoints(), vec!["workouts", "athletes"]);
    }

    #[test]
    fn test_duplicate_collection_rejected() {
        let mut registry = CollectionRegistry::new();
        let mut table = RouteTable::new();
        registry
            .register(MockCollection::boxed("workouts"), &mut table)
            .unwrap();
        let err = registry
            .register(MockCollection::boxed("workouts"), &mut table)
            .unwrap_err();

        assert!(matches!(err, HalError::Config(_)));
        assert_eq!(registry.len(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_build_routes_merges_all() {
        let mut registry = CollectionRegistry::new();
        let mut table = RouteTable::new();
        registry
            .register(MockCollection::boxed("a"), &mut table)
            .unwrap();
        registry
            .register(MockCollection::boxed("b"), &mut table)
            .unwrap();

        let _router = registry.build_routes(Arc::new(table));
    }
}
