//! Shared fixtures: the workout demo application behind a test server

#![allow(dead_code)]

#[path = "../../demos/workouts/app.rs"]
pub mod app;

use app::WorkoutStore;
use axum_test::{TestResponse, TestServer};
use hal::config::ViewsConfig;
use serde_json::{Value, json};
use std::sync::Arc;

/// Workout API with default configuration
pub fn workout_server() -> (TestServer, Arc<WorkoutStore>) {
    workout_server_with(&ViewsConfig::default())
}

/// Workout API with `config` applied
pub fn workout_server_with(config: &ViewsConfig) -> (TestServer, Arc<WorkoutStore>) {
    let (builder, store) = app::server(config).expect("workout server should configure");
    let router = builder.build().expect("router should build");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, store)
}

pub async fn create_workout(server: &TestServer, body: Value) -> TestResponse {
    server.post("/workouts").json(&body).await
}

/// Create `count` valid workouts, scored 1..=count
pub async fn seed_workouts(server: &TestServer, count: i64) {
    for score in 1..=count {
        create_workout(server, json!({ "score": score, "title": format!("W{}", score) }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }
}
