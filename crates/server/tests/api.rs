use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bob", "carol", "mallory"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![user.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    server::app(engine, db)
}

fn basic(user: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{user}:{password}"));
    format!("Basic {token}")
}

async fn call(app: &Router, method: Method, uri: &str, user: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user, "password"));
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn dinner_group(app: &Router) -> String {
    let (status, body) = call(app, Method::POST, "/groups", "alice", Some(json!({"name": "Trip"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = body["id"].as_str().unwrap().to_string();

    for member in ["bob", "carol"] {
        let (status, _) = call(
            app,
            Method::POST,
            &format!("/groups/{group_id}/members"),
            "alice",
            Some(json!({"username": member})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, _) = call(
        app,
        Method::POST,
        &format!("/groups/{group_id}/expenses"),
        "alice",
        Some(json!({
            "title": "Dinner",
            "total": "90.00",
            "payers": [{"user_id": "alice", "amount": "90.00"}],
            "debtors": [
                {"user_id": "alice", "amount": "30.00"},
                {"user_id": "bob", "amount": "30.00"},
                {"user_id": "carol", "amount": "30.00"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    group_id
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/groups")
        .header(header::AUTHORIZATION, basic("alice", "nope"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn balances_and_settle_summary() {
    let app = test_app().await;
    let group_id = dinner_group(&app).await;

    let (status, body) = call(&app, Method::GET, &format!("/groups/{group_id}/balances"), "bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["balances"],
        json!([
            {"user_id": "alice", "net": "60.00"},
            {"user_id": "bob", "net": "-30.00"},
            {"user_id": "carol", "net": "-30.00"}
        ])
    );

    let (status, body) = call(&app, Method::GET, &format!("/groups/{group_id}/settle"), "bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "view": "all",
            "settlements": [
                {"from": "bob", "to": "alice", "amount": "30.00"},
                {"from": "carol", "to": "alice", "amount": "30.00"}
            ]
        })
    );

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/groups/{group_id}/settle?view=mine"),
        "bob",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "view": "mine",
            "entries": [{"counterparty": "alice", "signed_amount": "-30.00"}]
        })
    );
}

#[tokio::test]
async fn settle_records_a_payment() {
    let app = test_app().await;
    let group_id = dinner_group(&app).await;

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/settle"),
        "bob",
        Some(json!({"counterparty": "alice", "amount": "30.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = call(&app, Method::GET, &format!("/groups/{group_id}/settle"), "alice", None).await;
    assert_eq!(
        body["settlements"],
        json!([{"from": "carol", "to": "alice", "amount": "30.00"}])
    );

    let (status, body) = call(&app, Method::GET, &format!("/groups/{group_id}/expenses"), "carol", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expenses"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn self_settlement_is_unprocessable() {
    let app = test_app().await;
    let group_id = dinner_group(&app).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/settle"),
        "bob",
        Some(json!({"counterparty": "bob", "amount": "10.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("bob"));
}

#[tokio::test]
async fn outsiders_get_not_found() {
    let app = test_app().await;
    let group_id = dinner_group(&app).await;

    for uri in [
        format!("/groups/{group_id}/balances"),
        format!("/groups/{group_id}/settle"),
        format!("/groups/{group_id}/expenses"),
        format!("/groups/{group_id}/members"),
    ] {
        let (status, _) = call(&app, Method::GET, &uri, "mallory", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
}
