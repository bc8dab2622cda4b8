//! HTTP integration tests.
//!
//! Starts the router on an ephemeral port and drives it with reqwest clients
//! that keep the session cookie between calls.

use bucket_list::services::bucket_list_service::BucketListService;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Bind to port 0 and return the base URL.
async fn start_server() -> String {
    let app = bucket_list::app(BucketListService::in_memory());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

/// A client already registered (and therefore logged in) as `email`.
async fn registered(base: &str, email: &str) -> Client {
    let client = client();
    let resp = client
        .post(format!("{base}/register"))
        .json(&json!({ "email": email, "password": "test_password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    client
}

async fn create_bucket(client: &Client, base: &str, name: &str, category: &str) -> Value {
    let resp = client
        .post(format!("{base}/buckets"))
        .json(&json!({
            "name": name,
            "description": format!("{name} description"),
            "category": category,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    body["bucket"].clone()
}

#[tokio::test]
async fn health_endpoints() {
    let base = start_server().await;
    let client = client();

    let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(format!("{base}/readyz")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["records"]["ok"], true);
}

#[tokio::test]
async fn categories_table() {
    let base = start_server().await;
    let resp = client()
        .get(format!("{base}/categories"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 7);
    assert_eq!(entries[0], json!({ "id": "1", "name": "Travel" }));
    assert_eq!(entries[5], json!({ "id": "6", "name": "Self Growth" }));
}

#[tokio::test]
async fn registration_and_login_errors() {
    let base = start_server().await;
    let _existing = registered(&base, "test@email.com").await;
    let client = client();

    let resp = client
        .post(format!("{base}/register"))
        .json(&json!({ "email": "kim", "password": "test_password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{base}/register"))
        .json(&json!({ "email": "new@email.com", "password": "pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{base}/register"))
        .json(&json!({ "email": "test@email.com", "password": "test_password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "User already exists with that email");

    let resp = client
        .post(format!("{base}/login"))
        .json(&json!({ "email": "test_wrong_email", "password": "test_password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .post(format!("{base}/login"))
        .json(&json!({ "email": "test@email.com", "password": "test_wrong_password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Incorrect password");

    let resp = client
        .post(format!("{base}/login"))
        .json(&json!({ "email": "test@email.com", "password": "test_password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], "Authenticated successfully");

    let resp = client.get(format!("{base}/buckets")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn record_routes_require_a_session() {
    let base = start_server().await;
    let client = client();

    let resp = client.get(format!("{base}/buckets")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base}/buckets"))
        .json(&json!({ "name": "Travel", "description": "d" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .delete(format!("{base}/buckets/00000000/activities/11111111"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let base = start_server().await;
    let client = registered(&base, "a@x.com").await;

    let resp = client.post(format!("{base}/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(format!("{base}/buckets")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn travel_scenario_over_http() {
    let base = start_server().await;
    let client = registered(&base, "a@x.com").await;

    let bucket = create_bucket(&client, &base, "Travel", "1").await;
    assert_eq!(bucket["category"], "Travel");
    let k1 = bucket["key"].as_str().unwrap().to_string();
    assert_eq!(k1.len(), 8);

    let resp = client
        .post(format!("{base}/buckets/{k1}/activities"))
        .json(&json!({ "text": "Booked flight" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let a1 = body["activity"]["activity_key"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/buckets/{k1}/activities"))
        .send()
        .await
        .unwrap();
    let listing: Value = resp.json().await.unwrap();
    assert_eq!(listing["bucket_name"], "Travel");
    let activities = listing["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0]["description"], "Booked flight");

    let resp = client
        .delete(format!("{base}/buckets/{k1}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let outcome: Value = resp.json().await.unwrap();
    assert_eq!(outcome["message"], "Bucket deleted successfully");
    assert_eq!(outcome["cascaded"], 1);

    let resp = client
        .get(format!("{base}/buckets/{k1}/activities/{a1}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // second delete is harmless
    let resp = client
        .delete(format!("{base}/buckets/{k1}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let outcome: Value = resp.json().await.unwrap();
    assert_eq!(outcome["affected"], 0);
}

#[tokio::test]
async fn owners_never_see_each_others_records() {
    let base = start_server().await;
    let alice = registered(&base, "alice@x.com").await;
    let bob = registered(&base, "bob@y.com").await;

    let bucket = create_bucket(&alice, &base, "Travel", "1").await;
    let key = bucket["key"].as_str().unwrap();

    let resp = bob.get(format!("{base}/buckets")).send().await.unwrap();
    let buckets: Value = resp.json().await.unwrap();
    assert_eq!(buckets, json!([]));

    let resp = bob
        .get(format!("{base}/buckets/{key}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = bob
        .post(format!("{base}/buckets/{key}/activities"))
        .json(&json!({ "description": "not mine" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = bob
        .put(format!("{base}/buckets/{key}"))
        .json(&json!({ "name": "hijacked", "description": "x", "category": "2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let outcome: Value = resp.json().await.unwrap();
    assert_eq!(outcome["affected"], 0);

    let resp = bob
        .delete(format!("{base}/buckets/{key}"))
        .send()
        .await
        .unwrap();
    let outcome: Value = resp.json().await.unwrap();
    assert_eq!(outcome["affected"], 0);

    let resp = alice
        .get(format!("{base}/buckets/{key}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let stored: Value = resp.json().await.unwrap();
    assert_eq!(stored["name"], "Travel");
}

#[tokio::test]
async fn updates_replace_mutable_fields_only() {
    let base = start_server().await;
    let client = registered(&base, "a@x.com").await;

    let bucket = create_bucket(&client, &base, "Travel", "1").await;
    let key = bucket["key"].as_str().unwrap();

    let resp = client
        .put(format!("{base}/buckets/{key}"))
        .json(&json!({ "name": "X", "description": "see the world", "category": "6" }))
        .send()
        .await
        .unwrap();
    let outcome: Value = resp.json().await.unwrap();
    assert_eq!(outcome["message"], "Bucket updated successfully");
    assert_eq!(outcome["affected"], 1);

    let resp = client
        .get(format!("{base}/buckets/{key}"))
        .send()
        .await
        .unwrap();
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["name"], "X");
    assert_eq!(updated["category"], "Self Growth");
    assert_eq!(updated["key"], bucket["key"]);
    assert_eq!(updated["created"], bucket["created"]);
    assert_eq!(updated["owner"], "a@x.com");

    let resp = client
        .post(format!("{base}/buckets/{key}/activities"))
        .json(&json!({ "description": "Booked flight" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let activity_key = body["activity"]["activity_key"].as_str().unwrap();

    let resp = client
        .put(format!("{base}/buckets/{key}/activities/{activity_key}"))
        .json(&json!({ "description": "Booked hotel" }))
        .send()
        .await
        .unwrap();
    let outcome: Value = resp.json().await.unwrap();
    assert_eq!(outcome["message"], "Activity updated successfully");

    let resp = client
        .get(format!("{base}/buckets/{key}/activities/{activity_key}"))
        .send()
        .await
        .unwrap();
    let activity: Value = resp.json().await.unwrap();
    assert_eq!(activity["description"], "Booked hotel");

    let resp = client
        .delete(format!("{base}/buckets/{key}/activities/{activity_key}"))
        .send()
        .await
        .unwrap();
    let outcome: Value = resp.json().await.unwrap();
    assert_eq!(outcome["message"], "Activity successfully deleted");
    assert_eq!(outcome["affected"], 1);
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let base = start_server().await;
    let client = registered(&base, "a@x.com").await;

    let resp = client
        .post(format!("{base}/buckets"))
        .json(&json!({ "name": "Travel" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let bucket = create_bucket(&client, &base, "Travel", "99").await;
    assert_eq!(bucket["category"], "General");
    let key = bucket["key"].as_str().unwrap();

    let resp = client
        .post(format!("{base}/buckets/{key}/activities"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Please enter your activities");
}
