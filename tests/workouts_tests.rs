//! End-to-end tests of the workout API: resources, pagination and forms

mod common;

use axum::http::{HeaderValue, Method, StatusCode, header};
use common::{create_workout, seed_workouts, workout_server, workout_server_with};
use hal::config::ViewsConfig;
use serde_json::{Value, json};

fn header_str<'a>(response: &'a axum_test::TestResponse, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

// ============================================================================
// Full walkthrough
// ============================================================================

#[tokio::test]
async fn test_hal_walkthrough() {
    let (server, _store) = workout_server();

    let response = create_workout(&server, json!({"score": 0})).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["errors"].get("score").is_some());

    create_workout(&server, json!({"score": 1}))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .patch("/workouts/1")
        .json(&json!({"score": 4}))
        .await
        .assert_status_ok();

    let response = server.get("/workouts").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["_embedded"]["workouts"]
            .as_array()
            .unwrap()
            .len(),
        1
    );

    let response = server.get("/workouts/1").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["_links"]["self"]["href"], "/workouts/1");
    assert_eq!(body["score"], 4);

    create_workout(&server, json!({"score": 1})).await;
    create_workout(&server, json!({"score": 1})).await;

    let links = server.get("/workouts").await.json::<Value>()["_links"].clone();
    assert_eq!(links["next"]["href"], "/workouts?page=2");
}

// ============================================================================
// Resources
// ============================================================================

#[tokio::test]
async fn test_resource_representation() {
    let (server, _store) = workout_server();
    create_workout(&server, json!({"score": 7, "title": "Hill repeats"})).await;

    let response = server.get("/workouts/1").await;
    response.assert_status_ok();
    assert_eq!(
        header_str(&response, "content-type"),
        Some("application/hal+json")
    );

    let body = response.json::<Value>();
    assert_eq!(
        body,
        json!({
            "_links": {"self": {"href": "/workouts/1"}},
            "id": 1,
            "score": 7,
            "title": "Hill repeats"
        })
    );
    assert!(body.get("secret").is_none());
    assert!(body.get("name").is_none());
}

#[tokio::test]
async fn test_missing_resource_is_not_found() {
    let (server, _store) = workout_server();

    let response = server.get("/workouts/42").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_location_round_trip() {
    let (server, _store) = workout_server();

    let response = create_workout(&server, json!({"score": 2})).await;
    response.assert_status(StatusCode::CREATED);
    let location = header_str(&response, "location").unwrap().to_string();
    let created = response.json::<Value>();
    assert_eq!(created["_links"]["self"]["href"], location.as_str());

    let fetched = server.get(&location).await.json::<Value>();
    assert_eq!(fetched["_links"]["self"]["href"], location.as_str());
    assert_eq!(fetched, created);
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_empty_collection() {
    let (server, _store) = workout_server();

    let response = server.get("/workouts").await;
    response.assert_status_ok();
    assert_eq!(
        header_str(&response, "content-type"),
        Some("application/hal+json")
    );

    let body = response.json::<Value>();
    assert_eq!(body["_embedded"]["workouts"], json!([]));
    assert_eq!(body["total"], 0);
    assert_eq!(body["per_page"], 2);
    assert_eq!(body["_links"]["self"]["href"], "/workouts");
    assert!(body["_links"].get("next").is_none());
    assert!(body["_links"].get("previous").is_none());
    assert!(body["_links"].get("last").is_none());
}

#[tokio::test]
async fn test_follow_next_link() {
    let (server, _store) = workout_server();
    seed_workouts(&server, 3).await;

    let first = server.get("/workouts").await.json::<Value>();
    let items = first["_embedded"]["workouts"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[1]["id"], 2);
    assert_eq!(items[0]["_links"]["self"]["href"], "/workouts/1");
    assert_eq!(first["total"], 3);
    assert_eq!(first["_links"]["last"]["href"], "/workouts?page=2");
    assert_eq!(first["_links"]["find"]["href"], "/workouts/{id}");

    let next = first["_links"]["next"]["href"].as_str().unwrap();
    let second = server.get(next).await.json::<Value>();
    let items = second["_embedded"]["workouts"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], 3);
    assert!(second["_links"].get("next").is_none());
    assert_eq!(second["_links"]["previous"]["href"], "/workouts?page=1");
    assert_eq!(second["_links"]["last"], second["_links"]["self"]);
}

#[tokio::test]
async fn test_per_page_is_clamped() {
    let (server, _store) = workout_server();
    seed_workouts(&server, 3).await;

    let body = server.get("/workouts?per_page=100").await.json::<Value>();
    assert_eq!(body["per_page"], 2);
    assert_eq!(body["_embedded"]["workouts"].as_array().unwrap().len(), 2);

    let body = server.get("/workouts?per_page=1").await.json::<Value>();
    assert_eq!(body["per_page"], 1);
    assert_eq!(body["_links"]["next"]["href"], "/workouts?page=2&per_page=1");
    assert_eq!(body["_links"]["last"]["href"], "/workouts?page=3&per_page=1");
}

#[tokio::test]
async fn test_configured_page_sizes() {
    let config = ViewsConfig::from_yaml_str(
        "collections:\n  - name: workouts\n    per_page: 1\n    max_per_page: 3\n",
    )
    .unwrap();
    let (server, _store) = workout_server_with(&config);
    seed_workouts(&server, 4).await;

    let body = server.get("/workouts").await.json::<Value>();
    assert_eq!(body["per_page"], 1);

    let body = server.get("/workouts?per_page=10").await.json::<Value>();
    assert_eq!(body["per_page"], 3);
}

#[tokio::test]
async fn test_invalid_pagination_parameters() {
    let (server, _store) = workout_server();
    seed_workouts(&server, 3).await;

    for query in ["page=abc", "page=0", "per_page=0", "per_page=-3", "per_page=x"] {
        server
            .get(&format!("/workouts?{}", query))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    server
        .get("/workouts?page=9")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_query_string_is_json_bad_request() {
    let (server, _store) = workout_server();
    seed_workouts(&server, 1).await;

    let response = server.get("/workouts?page=1&page=2").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        header_str(&response, "content-type"),
        Some("application/json")
    );
    let body = response.json::<Value>();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().starts_with("Bad request"));
}

// ============================================================================
// Forms
// ============================================================================

#[tokio::test]
async fn test_create_validation_errors() {
    let (server, store) = workout_server();

    let response = create_workout(&server, json!({"score": 0, "title": 12})).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(header_str(&response, "content-type"), Some("application/json"));

    let body = response.json::<Value>();
    assert_eq!(body["message"], "Validation error");
    let errors = body["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors.contains_key("score"));
    assert!(errors.contains_key("title"));

    let response = create_workout(&server, json!({"title": "No score"})).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["errors"]["score"],
        "This field is required"
    );

    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_title_alias_is_stored_under_internal_name() {
    let (server, store) = workout_server();
    create_workout(&server, json!({"score": 3, "title": "Easy"})).await;

    let response = server
        .patch("/workouts/1")
        .json(&json!({"title": "X"}))
        .await;
    response.assert_status_ok();
    assert_eq!(header_str(&response, "location"), Some("/workouts/1"));

    let stored = store.get(1).unwrap().unwrap();
    assert_eq!(stored.name.as_deref(), Some("X"));
    assert_eq!(stored.score, 3);

    let body = server.get("/workouts/1").await.json::<Value>();
    assert_eq!(body["title"], "X");
    assert_eq!(body["score"], 3);
}

#[tokio::test]
async fn test_partial_update_validates_supplied_fields() {
    let (server, store) = workout_server();
    create_workout(&server, json!({"score": 3})).await;

    let response = server
        .patch("/workouts/1")
        .json(&json!({"score": -1}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(store.get(1).unwrap().unwrap().score, 3);

    server
        .patch("/workouts/99")
        .json(&json!({"score": 2}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_requires_full_document() {
    let (server, _store) = workout_server();
    create_workout(&server, json!({"score": 3})).await;

    server
        .put("/workouts/1")
        .json(&json!({"title": "Only title"}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let response = server
        .put("/workouts/1")
        .json(&json!({"score": 5, "title": "Both"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["score"], 5);
}

#[tokio::test]
async fn test_title_is_trimmed() {
    let (server, _store) = workout_server();

    let body = create_workout(&server, json!({"score": 1, "title": "  Long run  "}))
        .await
        .json::<Value>();
    assert_eq!(body["title"], "Long run");
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let (server, store) = workout_server();

    server
        .post("/workouts")
        .text("not json")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .post("/workouts")
        .json(&json!([{"score": 1}]))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .post("/workouts")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(store.is_empty().unwrap());
}

#[tokio::test]
async fn test_unknown_fields_rejected_when_configured() {
    let config = ViewsConfig::from_yaml_str(
        "collections:\n  - name: workouts\n    unknown_fields: reject\n",
    )
    .unwrap();
    let (server, _store) = workout_server_with(&config);

    let response = create_workout(&server, json!({"score": 1, "secret": "x"})).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["errors"]["secret"], "Unknown field");

    // Default policy ignores them
    let (server, store) = workout_server();
    create_workout(&server, json!({"score": 1, "secret": "x"}))
        .await
        .assert_status(StatusCode::CREATED);
    assert_eq!(store.get(1).unwrap().unwrap().secret, "secret");
}

// ============================================================================
// OPTIONS
// ============================================================================

#[tokio::test]
async fn test_options_advertisement() {
    let (server, _store) = workout_server();

    let response = server.method(Method::OPTIONS, "/workouts").await;
    response.assert_status_ok();
    assert_eq!(header_str(&response, "allow"), Some("POST, OPTIONS"));
    // The collection path takes no PATCH
    assert_eq!(header_str(&response, "accept-patch"), None);

    let response = server.method(Method::OPTIONS, "/workouts/1").await;
    response.assert_status_ok();
    assert_eq!(header_str(&response, "allow"), Some("PATCH, PUT, OPTIONS"));
    assert_eq!(
        header_str(&response, "accept-patch"),
        Some("application/json;charset=utf-8")
    );
}

#[tokio::test]
async fn test_options_schema() {
    let (server, _store) = workout_server();

    let response = server
        .method(Method::OPTIONS, "/workouts")
        .add_header(
            header::ACCEPT,
            HeaderValue::from_static("application/schema+json"),
        )
        .await;
    response.assert_status_ok();
    assert_eq!(
        header_str(&response, "content-type"),
        Some("application/schema+json")
    );
    assert_eq!(
        header_str(&response, "accept"),
        Some("application/json; charset=utf-8")
    );

    let schema = response.json::<Value>();
    assert_eq!(schema["title"], "Workout");
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["required"], json!(["score"]));
    assert_eq!(schema["properties"]["score"]["type"], "integer");
    assert_eq!(schema["properties"]["score"]["minimum"], 1.0);
    assert_eq!(schema["properties"]["title"]["type"], "string");
}

#[tokio::test]
async fn test_unrouted_methods() {
    let (server, _store) = workout_server();

    server
        .delete("/workouts/1")
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}
