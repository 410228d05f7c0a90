//! HTTP API tests driving the router in-process

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::{Days, Local};
use motominder_core::error::GENERIC_INTERNAL_MESSAGE;
use motominder_core::storage::Database;
use motominder_server::{AppState, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> (Router, Database) {
    let db = Database::in_memory().await.unwrap();
    (build_router(AppState::new(db.clone())), db)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

/// Garage 1 with bike 1 (Yamaha XT600) and bike 2 (Honda CB750)
async fn seed(app: &Router) {
    let (status, _) = post(app, "/api/garages", json!({"name": "Home Garage"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post(
        app,
        "/api/bikes",
        json!({"garage_id": 1, "make": "Yamaha", "model": "XT600", "year": 1991}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post(
        app,
        "/api/bikes",
        json!({"garage_id": 1, "make": "Honda", "model": "CB750"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_health() {
    let (app, _db) = app().await;
    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["overall_status"], json!("ok"));
}

#[tokio::test]
async fn test_garage_crud() {
    let (app, _db) = app().await;

    let (status, body) = post(
        &app,
        "/api/garages",
        json!({"name": "Barn", "location": "Farm"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], json!("Barn"));
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = get(&app, &format!("/api/garages/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location"], json!("Farm"));
    assert_eq!(body["data"]["bikes"], json!([]));
    assert_eq!(body["data"]["tags"], json!([]));

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/garages/{id}"),
        Some(json!({"name": "Workshop"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Workshop"));

    let (status, body) = send(&app, Method::DELETE, &format!("/api/garages/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Garage deleted successfully"})
    );

    let (status, body) = get(&app, &format!("/api/garages/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Garage not found"}));
}

#[tokio::test]
async fn test_validation_errors() {
    let (app, _db) = app().await;

    let (status, body) = post(&app, "/api/garages", json!({"location": "Nowhere"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Garage name is required"));

    let (status, body) = post(&app, "/api/bikes", json!({"garage_id": 7, "make": "BMW", "model": "R80"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Garage not found"));

    let (status, body) = get(&app, "/api/garages/not-a-number").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_malformed_json_is_enveloped() {
    let (app, _db) = app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tags")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_tag_catalogue() {
    let (app, _db) = app().await;

    let (status, body) = post(&app, "/api/tags", json!({"name": "winter"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["color"], json!("#3498db"));

    let (status, body) = post(&app, "/api/tags", json!({"name": "winter"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("Tag name already exists"));

    let (status, body) = post(&app, "/api/tags", json!({"color": "#fff"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Tag name is required"));

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/tags/1",
        Some(json!({"name": "storage"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("storage"));
    assert_eq!(body["data"]["color"], json!("#3498db"));

    let (status, body) = send(&app, Method::DELETE, "/api/tags/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Tag deleted successfully"));

    let (status, _) = get(&app, "/api/tags/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tag_assignment_flow() {
    let (app, _db) = app().await;
    seed(&app).await;
    post(&app, "/api/tags", json!({"name": "project"})).await;

    let assignment = json!({"tagId": 1, "itemType": "bike", "itemId": 1});

    let (status, body) = post(&app, "/api/tags/assign", assignment.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], json!("Tag assigned successfully"));
    assert_eq!(body["data"]["item_type"], json!("bike"));

    let (status, body) = post(&app, "/api/tags/assign", assignment.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("Tag is already assigned to this item"));

    let (status, body) = post(&app, "/api/tags/assign", json!({"tagId": 1, "itemType": "bike"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Tag ID, item type, and item ID are required")
    );

    let (status, body) = post(
        &app,
        "/api/tags/assign",
        json!({"tagId": 1, "itemType": "boat", "itemId": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("Invalid item type. Must be one of: garage, bike, section, part")
    );

    let (status, body) = post(
        &app,
        "/api/tags/assign",
        json!({"tagId": 1, "itemType": "bike", "itemId": 99}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Bike not found"));

    let (status, body) = get(&app, "/api/tags/1/items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tag"]["name"], json!("project"));
    assert_eq!(body["data"]["items"]["bikes"][0]["model"], json!("XT600"));
    assert_eq!(body["data"]["items"]["garages"], json!([]));

    let (status, body) = send(&app, Method::DELETE, "/api/tags/remove", Some(assignment.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Tag removed successfully"));

    let (status, body) = send(&app, Method::DELETE, "/api/tags/remove", Some(assignment)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Tag assignment not found"));
}

#[tokio::test]
async fn test_search_endpoint() {
    let (app, _db) = app().await;
    seed(&app).await;
    post(&app, "/api/tags", json!({"name": "project"})).await;
    post(&app, "/api/tags", json!({"name": "winter"})).await;
    for tag_id in [1, 2] {
        post(
            &app,
            "/api/tags/assign",
            json!({"tagId": tag_id, "itemType": "bike", "itemId": 2}),
        )
        .await;
    }
    post(
        &app,
        "/api/tags/assign",
        json!({"tagId": 1, "itemType": "bike", "itemId": 1}),
    )
    .await;

    let (status, body) = get(&app, "/api/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["totalResults"], json!(3));
    assert_eq!(body["meta"]["query"], json!(""));
    assert_eq!(body["meta"]["type"], Value::Null);

    let (_, body) = get(&app, "/api/search?tags=project,winter").await;
    assert_eq!(body["meta"]["tags"], json!(["project", "winter"]));
    assert_eq!(body["meta"]["totalResults"], json!(1));
    assert_eq!(body["data"]["bikes"][0]["model"], json!("CB750"));
    assert_eq!(body["data"]["bikes"][0]["tags"].as_array().unwrap().len(), 2);

    let (_, body) = get(&app, "/api/search?query=yamaha&type=bike").await;
    assert_eq!(body["meta"]["totalResults"], json!(1));
    assert_eq!(body["data"]["bikes"][0]["garage_name"], json!("Home Garage"));
    assert_eq!(body["data"]["garages"], json!([]));

    let (status, body) = get(&app, "/api/search?tags=nothing-like-this").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["totalResults"], json!(0));

    let (status, body) = get(&app, "/api/search?type=boats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["type"], json!("boats"));
    assert_eq!(body["meta"]["totalResults"], json!(0));
}

#[tokio::test]
async fn test_maintenance_schedule() {
    let (app, _db) = app().await;
    seed(&app).await;

    let today = Local::now().date_naive();
    let due = today.checked_add_days(Days::new(5)).unwrap();

    let (status, body) = post(
        &app,
        "/api/maintenance",
        json!({
            "bike_id": 1,
            "date": today.to_string(),
            "due_date": due.to_string(),
            "description": "Valve clearance",
            "status": "scheduled"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["make"], json!("Yamaha"));
    let id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = get(&app, "/api/maintenance/upcoming?days=7").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/maintenance/{id}/complete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("completed"));

    let (_, body) = get(&app, "/api/maintenance/upcoming").await;
    assert_eq!(body["data"], json!([]));

    let (_, body) = get(&app, "/api/bikes/1").await;
    assert_eq!(body["data"]["maintenance"][0]["description"], json!("Valve clearance"));

    let (status, body) = post(
        &app,
        "/api/maintenance",
        json!({"bike_id": 1, "date": today.to_string()}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Description is required"));
}

#[tokio::test]
async fn test_internal_errors_are_generic() {
    let (app, db) = app().await;
    db.close().await;

    let (status, body) = get(&app, "/api/garages").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "message": GENERIC_INTERNAL_MESSAGE})
    );
}

#[tokio::test]
async fn test_internal_errors_exposed_in_development() {
    let db = Database::in_memory().await.unwrap();
    let app = build_router(AppState::new(db.clone()).with_internal_errors(true));
    db.close().await;

    let (status, body) = get(&app, "/api/garages").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_ne!(body["message"], json!(GENERIC_INTERNAL_MESSAGE));
    assert!(body["message"].as_str().unwrap().contains("Database error"));
}
