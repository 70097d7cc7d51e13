//! Workout log served as HAL+JSON
//!
//! ```text
//! cargo run --example workouts [config.yaml]
//!
//! curl -X POST localhost:3000/workouts -d '{"score": 3, "title": "Intervals"}'
//! curl localhost:3000/workouts
//! curl -X PATCH localhost:3000/workouts/1 -d '{"title": "Tempo run"}'
//! curl -X OPTIONS -H 'Accept: application/schema+json' localhost:3000/workouts
//! ```

mod app;

use anyhow::Result;
use hal::config::ViewsConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hal=debug,tower_http=debug")),
        )
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => ViewsConfig::from_yaml_file(path)?,
        None => ViewsConfig::from_yaml_str(include_str!("config.yaml"))?,
    };

    let (server, _store) = app::server(&config)?;
    tracing::info!(
        routes = server.route_table().len(),
        "workout API configured"
    );

    server.serve_configured().await
}
