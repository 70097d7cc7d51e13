//! ServerBuilder for fluent API to build HTTP servers

use super::collection::CollectionDescriptor;
use super::registry::CollectionRegistry;
use crate::config::ViewsConfig;
use crate::routing::RouteTable;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for creating HTTP servers from HAL collections
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(ViewsConfig::from_yaml_file("config.yaml")?)
///     .register(workouts)?
///     .build()?;
/// ```
pub struct ServerBuilder {
    registry: CollectionRegistry,
    routes: RouteTable,
    config: ViewsConfig,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            registry: CollectionRegistry::new(),
            routes: RouteTable::new(),
            config: ViewsConfig::default(),
            custom_routes: Vec::new(),
        }
    }

    /// Use `config` for server settings
    ///
    /// Collection settings are applied by each collection's builder
    /// (`HalCollectionBuilder::with_config`).
    pub fn with_config(mut self, config: ViewsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ViewsConfig {
        &self.config
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints that are not HAL collections. Routes added here
    /// do not take part in URL building.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{Router, routing::get};
    ///
    /// let extra = Router::new().route("/version", get(|| async { "1.0" }));
    ///
    /// ServerBuilder::new()
    ///     .with_custom_routes(extra)
    ///     .register(workouts)?
    ///     .build()?;
    /// ```
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register a collection
    ///
    /// Its routes enter the route table immediately, so collections can embed
    /// each other's items regardless of registration order.
    pub fn register(mut self, collection: impl CollectionDescriptor + 'static) -> Result<Self> {
        self.registry
            .register(Box::new(collection), &mut self.routes)?;
        Ok(self)
    }

    /// The routes registered so far
    pub fn route_table(&self) -> &RouteTable {
        &self.routes
    }

    /// Build the final router
    ///
    /// This generates:
    /// - Health check routes
    /// - Index, resource and form routes of every collection
    /// - Custom routes
    pub fn build(self) -> Result<Router> {
        if self.registry.is_empty() && self.custom_routes.is_empty() {
            tracing::warn!("building a server without collections or custom routes");
        }

        let routing = Arc::new(self.routes);
        let mut app = health_routes().merge(self.registry.build_routes(routing));
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app.layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .register(workouts)?
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on the address from the configuration
    pub async fn serve_configured(self) -> Result<()> {
        let addr = self.config.bind_address().to_string();
        self.serve(&addr).await
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build health check routes
fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "hal-rs"
    }))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::collection::HalCollection;
    use crate::storage::InMemoryStore;
    use axum_test::TestServer;
    use serde_json::Map;

    type Store = InMemoryStore<Map<String, Value>>;

    fn notes() -> HalCollection<Store> {
        HalCollection::builder("notes", "note", Arc::new(Store::new()))
            .build()
            .unwrap()
    }

    // ── Constructor tests ────────────────────────────────────────────────

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.registry.is_empty());
        assert!(builder.routes.is_empty());
        assert!(builder.custom_routes.is_empty());
    }

    #[test]
    fn test_default_is_same_as_new() {
        let builder = ServerBuilder::default();
        assert!(builder.registry.is_empty());
        assert_eq!(builder.config().bind_address(), "127.0.0.1:3000");
    }

    // ── register ─────────────────────────────────────────────────────────

    #[test]
    fn test_register_records_routes() {
        let builder = ServerBuilder::new().register(notes()).unwrap();
        assert_eq!(builder.registry.names(), vec!["notes"]);
        assert_eq!(builder.route_table().endpoints(), vec!["notes", "note"]);
    }

    #[test]
    fn test_register_duplicate_fails() {
        let result = ServerBuilder::new()
            .register(notes())
            .unwrap()
            .register(notes());
        let err_msg = format!("{}", result.err().expect("should be Err"));
        assert!(err_msg.contains("already registered"), "{}", err_msg);
    }

    // ── with_custom_routes / with_config ─────────────────────────────────

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new()
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    #[test]
    fn test_with_config() {
        let config = ViewsConfig::from_yaml_str("server:\n  bind: 0.0.0.0:9000\n").unwrap();
        let builder = ServerBuilder::new().with_config(config);
        assert_eq!(builder.config().bind_address(), "0.0.0.0:9000");
    }

    // ── build ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_build_serves_health_routes() {
        let app = ServerBuilder::new().register(notes()).unwrap().build().unwrap();
        let server = TestServer::new(app).unwrap();

        for path in ["/health", "/healthz"] {
            let response = server.get(path).await;
            response.assert_status_ok();
            let body = response.json::<Value>();
            assert_eq!(body["status"], "ok");
        }
    }

    #[tokio::test]
    async fn test_build_with_custom_routes() {
        let custom = Router::new().route("/custom", get(|| async { "ok" }));
        let app = ServerBuilder::new()
            .with_custom_routes(custom)
            .register(notes())
            .unwrap()
            .build()
            .unwrap();
        let server = TestServer::new(app).unwrap();

        server.get("/custom").await.assert_text("ok");
        server.get("/notes").await.assert_status_ok();
    }
}
