mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use common::TestApp;
use packwise::routes::create_router;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> Response {
    send_with_token(app, method, uri, body, None).await
}

async fn send_with_token(
    app: &TestApp,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    create_router(app.state.clone())
        .oneshot(request)
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn tokyo() -> Value {
    json!({
        "destination": "Tokyo",
        "purpose": "business",
        "duration": "3 days",
        "weather": "cold",
        "trip_date": "2025-01-10"
    })
}

async fn create_trip(app: &TestApp, body: Value) -> Value {
    let response = send(app, Method::POST, "/trips", Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn landing_greets() {
    let app = TestApp::new().await.unwrap();
    let response = send(&app, Method::GET, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"data": "Welcome to the Travel Assistant API"})
    );
}

#[tokio::test]
async fn create_trip_returns_empty_list() {
    let app = TestApp::new().await.unwrap();
    let trip = create_trip(&app, tokyo()).await;
    assert_eq!(trip["destination"], "Tokyo");
    assert_eq!(trip["packing_list"], json!([]));
    assert_eq!(trip["total_weight"], json!(0.0));
    assert!(trip["id"].as_str().is_some());

    let id = trip["id"].as_str().unwrap();
    let response = send(&app, Method::GET, &format!("/trips/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, trip);
}

#[tokio::test]
async fn create_trip_requires_all_fields() {
    let app = TestApp::new().await.unwrap();
    let response = send(
        &app,
        Method::POST,
        "/trips",
        Some(json!({"destination": "Tokyo", "purpose": ""})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["kind"], "validation_error");

    let response = send(&app, Method::GET, "/trips", None).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn trips_are_listed_by_date() {
    let app = TestApp::new().await.unwrap();
    for (destination, date) in [("Later", "2025-08-01"), ("Sooner", "2025-02-01T09:00:00Z")] {
        let mut body = tokyo();
        body["destination"] = json!(destination);
        body["trip_date"] = json!(date);
        create_trip(&app, body).await;
    }
    let response = send(&app, Method::GET, "/trips", None).await;
    let trips = body_json(response).await;
    let names: Vec<&str> = trips
        .as_array()
        .unwrap()
        .iter()
        .map(|trip| trip["destination"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Sooner", "Later"]);
}

#[tokio::test]
async fn generate_then_edit_replaces_list() {
    let app = TestApp::new().await.unwrap();
    let trip = create_trip(&app, tokyo()).await;
    let id = trip["id"].as_str().unwrap();

    app.model.reply_with(
        r#"[{"name":"coat","checked":false,"compartment":"carry-on","weight":1.2}]"#,
    );
    let mut request = tokyo();
    request["trip_id"] = json!(id);
    let response = send(&app, Method::POST, "/generate_packing_list", Some(request)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_weight"], json!(1.2));
    assert_eq!(body["packing_list"][0]["name"], "coat");

    let response = send(
        &app,
        Method::POST,
        "/edit_packing_list",
        Some(json!({"trip_id": id, "items": [{"weight": 0.5}, {"weight": 0.5, "label": "spare"}]})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Packing list updated");
    assert_eq!(body["total_weight"], json!(1.0));
    assert_eq!(
        body["updated_items"],
        json!([{"weight": 0.5}, {"weight": 0.5, "label": "spare"}])
    );

    let response = send(&app, Method::GET, &format!("/trips/{id}"), None).await;
    let stored = body_json(response).await;
    assert_eq!(stored["packing_list"], body["updated_items"]);
    assert_eq!(stored["total_weight"], json!(1.0));
}

#[tokio::test]
async fn failed_generation_is_500_and_keeps_trip() {
    let app = TestApp::new().await.unwrap();
    let trip = create_trip(&app, tokyo()).await;
    let id = trip["id"].as_str().unwrap();

    app.model.reply_with("```json\n[]\n```");
    let mut request = tokyo();
    request["trip_id"] = json!(id);
    let response = send(&app, Method::POST, "/generate_packing_list", Some(request.clone())).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["kind"], "generation_error");

    app.model.fail_with("upstream timeout");
    let response = send(&app, Method::POST, "/generate_packing_list", Some(request)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = send(&app, Method::GET, &format!("/trips/{id}"), None).await;
    assert_eq!(body_json(response).await, trip);
}

#[tokio::test]
async fn generate_requires_fields() {
    let app = TestApp::new().await.unwrap();
    let trip = create_trip(&app, tokyo()).await;
    let response = send(
        &app,
        Method::POST,
        "/generate_packing_list",
        Some(json!({"trip_id": trip["id"], "destination": "Tokyo"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.model.calls(), 0);
}

#[tokio::test]
async fn edit_errors() {
    let app = TestApp::new().await.unwrap();
    let trip = create_trip(&app, tokyo()).await;

    let response = send(
        &app,
        Method::POST,
        "/edit_packing_list",
        Some(json!({"trip_id": trip["id"], "items": []})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        Method::POST,
        "/edit_packing_list",
        Some(json!({"items": [{"weight": 1.0}]})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for unknown in ["0b8c8f8e-2f1d-4c53-9f55-8a1a3c0f7d11", "definitely-not-an-id"] {
        let response = send(
            &app,
            Method::POST,
            "/edit_packing_list",
            Some(json!({"trip_id": unknown, "items": [{"weight": 1.0}]})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["kind"], "not_found");
    }

    let response = send(&app, Method::GET, "/trips/definitely-not-an-id", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edited_items_round_trip_verbatim() {
    let app = TestApp::new().await.unwrap();
    let trip = create_trip(&app, tokyo()).await;
    let id = trip["id"].as_str().unwrap();
    let items = json!([
        {"name": 5, "weight": 1.0},
        {"checked": "yes", "weight": 0.5},
        {"name": null, "compartment": null, "weight": 0.25}
    ]);

    let response = send(
        &app,
        Method::POST,
        "/edit_packing_list",
        Some(json!({"trip_id": id, "items": items})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["updated_items"], items);
    assert_eq!(body["total_weight"], json!(1.75));

    let response = send(&app, Method::GET, &format!("/trips/{id}"), None).await;
    let stored = body_json(response).await;
    assert_eq!(stored["packing_list"], items);
    assert_eq!(stored["total_weight"], json!(1.75));
}

#[tokio::test]
async fn empty_generated_list_is_stored() {
    let app = TestApp::new().await.unwrap();
    let trip = create_trip(&app, tokyo()).await;
    let id = trip["id"].as_str().unwrap();

    app.model.reply_with("[]");
    let mut request = tokyo();
    request["trip_id"] = json!(id);
    let response = send(&app, Method::POST, "/generate_packing_list", Some(request)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["packing_list"], json!([]));
    assert_eq!(body["total_weight"], json!(0.0));
}

#[tokio::test]
async fn suggestions_come_from_model() {
    let app = TestApp::new().await.unwrap();
    app.model.reply_with("Visit Senso-ji early in the morning.");
    let response = send(
        &app,
        Method::POST,
        "/get_suggestions",
        Some(json!({"destination": "Tokyo"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["suggestions"],
        "Visit Senso-ji early in the morning."
    );

    let response = send(&app, Method::POST, "/get_suggestions", Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_login_and_me() {
    let app = TestApp::new().await.unwrap();
    let credentials = json!({"username": "alice", "password": "s3cret"});

    let response = send(&app, Method::POST, "/register", Some(credentials.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "User registered successfully"
    );

    let response = send(&app, Method::POST, "/register", Some(credentials.clone())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["kind"], "auth_error");

    let response = send(
        &app,
        Method::POST,
        "/login",
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, Method::POST, "/login", Some(json!({"username": "alice"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, Method::POST, "/login", Some(credentials)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send_with_token(&app, Method::GET, "/me", None, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["username"], "alice");

    let response = send(&app, Method::GET, "/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
