use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use server::{Mailer, ServerState, router};

async fn test_router() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    router(ServerState {
        db,
        mailer: Arc::new(Mailer::disabled()),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_user(app: &Router, name: &str, email: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        Some(json!({
            "name": name,
            "email": email,
            "mobile_number": "1234567890",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["user_id"].as_i64().unwrap()
}

#[tokio::test]
async fn spawned_server_answers_over_tcp() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(db, Arc::new(Mailer::disabled()), listener).unwrap();

    let response = reqwest::get(format!("http://{addr}/users/1")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_user_and_fetch_it_back() {
    let app = test_router().await;
    let id = create_user(&app, "Alice", "alice@example.com").await;

    let (status, body) = send(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = test_router().await;
    create_user(&app, "Alice", "alice@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(json!({
            "name": "Impostor",
            "email": "alice@example.com",
            "mobile_number": "0987654321",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_mobile_number_is_rejected() {
    let app = test_router().await;
    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(json!({
            "name": "Bob",
            "email": "bob@example.com",
            "mobile_number": "123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = test_router().await;

    let (status, _) = send(&app, "GET", "/users/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/balances/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/balances/lender/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn equal_expense_produces_raw_and_simplified_balances() {
    let app = test_router().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    let bob = create_user(&app, "Bob", "bob@example.com").await;
    let carol = create_user(&app, "Carol", "carol@example.com").await;

    // Alice pays 90.00 split equally three ways.
    let (status, body) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({
            "lender_id": alice,
            "name": "Dinner",
            "total_cents": 9000,
            "split_kind": "EQUAL",
            "participants": [
                { "user_id": alice, "share": null },
                { "user_id": bob, "share": null },
                { "user_id": carol, "share": null },
            ],
            "notes": "pizza night",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["expense_id"].as_i64().is_some());

    let (status, raw) = send(&app, "GET", "/balances", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(raw[alice.to_string()][bob.to_string()], 3000);
    assert_eq!(raw[alice.to_string()][carol.to_string()], 3000);
    assert!(raw[alice.to_string()].get(alice.to_string()).is_none());

    let (status, simplified) = send(&app, "GET", "/balances?simplify=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(simplified[alice.to_string()][bob.to_string()], 3000);
    assert_eq!(simplified[alice.to_string()][carol.to_string()], 3000);
}

#[tokio::test]
async fn mutual_debts_simplify_to_nothing() {
    let app = test_router().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    let bob = create_user(&app, "Bob", "bob@example.com").await;

    for (lender, debtor) in [(alice, bob), (bob, alice)] {
        let (status, _) = send(
            &app,
            "POST",
            "/expenses",
            Some(json!({
                "lender_id": lender,
                "name": "Favor",
                "total_cents": 10000,
                "split_kind": "EXACT",
                "participants": [{ "user_id": debtor, "share": 10000 }],
                "notes": null,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, raw) = send(&app, "GET", "/balances", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(raw[alice.to_string()][bob.to_string()], 10000);
    assert_eq!(raw[bob.to_string()][alice.to_string()], 10000);

    let (status, simplified) = send(&app, "GET", "/balances?simplify=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(simplified, json!({}));
}

#[tokio::test]
async fn invalid_percent_split_is_unprocessable() {
    let app = test_router().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    let bob = create_user(&app, "Bob", "bob@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({
            "lender_id": alice,
            "name": "Lopsided",
            "total_cents": 10000,
            "split_kind": "PERCENT",
            "participants": [
                { "user_id": alice, "share": 5000 },
                { "user_id": bob, "share": 4000 },
            ],
            "notes": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn expense_with_unknown_participant_is_not_found() {
    let app = test_router().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({
            "lender_id": alice,
            "name": "Ghost dinner",
            "total_cents": 5000,
            "split_kind": "EQUAL",
            "participants": [
                { "user_id": alice, "share": null },
                { "user_id": 999, "share": null },
            ],
            "notes": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_listing_shows_each_share() {
    let app = test_router().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    let bob = create_user(&app, "Bob", "bob@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({
            "lender_id": alice,
            "name": "Groceries",
            "total_cents": 4000,
            "split_kind": "EQUAL",
            "participants": [
                { "user_id": alice, "share": null },
                { "user_id": bob, "share": null },
            ],
            "notes": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, listing) = send(&app, "GET", &format!("/balances/{bob}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = listing.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Groceries");
    assert_eq!(rows[0]["share_cents"], 2000);
    assert_eq!(rows[0]["lender_id"], alice);
    assert_eq!(rows[0]["lender_name"], "Alice");
    assert_eq!(rows[0]["total_cents"], 4000);
}

#[tokio::test]
async fn lender_view_aggregates_only_that_users_shares() {
    let app = test_router().await;
    let alice = create_user(&app, "Alice", "alice@example.com").await;
    let bob = create_user(&app, "Bob", "bob@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({
            "lender_id": alice,
            "name": "Tickets",
            "total_cents": 6000,
            "split_kind": "EXACT",
            "participants": [{ "user_id": bob, "share": 6000 }],
            "notes": null,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, balances) = send(&app, "GET", &format!("/balances/lender/{bob}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balances[alice.to_string()][bob.to_string()], 6000);
}
