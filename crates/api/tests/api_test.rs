//! End-to-end tests driving the router against an in-memory database.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use holdco_api::{AppState, create_router};
use holdco_core::auth::hash_password;
use holdco_db::entities::sea_orm_active_enums::UserRole;
use holdco_db::entities::users;
use holdco_db::{Migrator, connect};
use holdco_shared::config::UploadsConfig;
use holdco_shared::{JwtConfig, JwtService};
use http_body_util::BodyExt;
use rstest::rstest;
use sea_orm::{ActiveModelTrait, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@holdco.test";
const ADMIN_PASSWORD: &str = "correct-horse";

async fn app() -> Router {
    let db = connect("sqlite::memory:", 1, 1).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let now = Utc::now().into();
    users::ActiveModel {
        id: Set(Uuid::now_v7()),
        email: Set(ADMIN_EMAIL.to_string()),
        password_hash: Set(hash_password(ADMIN_PASSWORD).unwrap()),
        full_name: Set("Admin".to_string()),
        role: Set(UserRole::Admin),
        business_unit_id: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await
    .unwrap();

    let state = AppState::new(
        db,
        JwtService::new(JwtConfig::default()),
        UploadsConfig::default(),
    );
    create_router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
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

async fn login_as(app: &Router, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["accessToken"].as_str().unwrap().to_string()
}

async fn login(app: &Router) -> String {
    login_as(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

async fn create(app: &Router, token: &str, uri: &str, body: Value) -> Value {
    let (status, created) = send(app, "POST", uri, Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    created
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn test_login_and_me() {
    let app = app().await;
    let token = login(&app).await;

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], ADMIN_EMAIL);
    assert_eq!(me["role"], "ADMIN");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_protected_route_needs_token() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/api/business-units", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, body) = send(&app, "GET", "/api/business-units", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_duplicate_business_unit_code() {
    let app = app().await;
    let token = login(&app).await;
    let unit = json!({ "code": "EDU", "name": "Education" });

    let created = create(&app, &token, "/api/business-units", unit.clone()).await;
    assert_eq!(created["code"], "EDU");
    assert_eq!(created["isActive"], true);

    let (status, body) = send(&app, "POST", "/api/business-units", Some(&token), Some(unit)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");
}

#[tokio::test]
async fn test_invalid_body_uses_error_envelope() {
    let app = app().await;
    let token = login(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/payment-methods",
        Some(&token),
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().starts_with("name:"));

    let (status, body) = send(&app, "GET", "/api/transactions/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_split_preview() {
    let app = app().await;
    let token = login(&app).await;
    let a = create(&app, &token, "/api/business-units", json!({ "code": "A", "name": "A" })).await;
    let b = create(&app, &token, "/api/business-units", json!({ "code": "B", "name": "B" })).await;
    let rule = create(
        &app,
        &token,
        "/api/allocation-rules",
        json!({
            "name": "Shared office",
            "lines": [
                { "businessUnitId": a["id"], "percentage": "60" },
                { "businessUnitId": b["id"], "percentage": "40" }
            ]
        }),
    )
    .await;

    let uri = format!("/api/allocation-rules/{}/split?amount=1000000", rule["id"].as_str().unwrap());
    let (status, shares) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shares[0]["amount"], 600_000);
    assert_eq!(shares[1]["amount"], 400_000);
}

#[tokio::test]
async fn test_transaction_lifecycle() {
    let app = app().await;
    let token = login(&app).await;
    let unit = create(&app, &token, "/api/business-units", json!({ "code": "A", "name": "A" })).await;
    let category = create(
        &app,
        &token,
        "/api/categories",
        json!({ "code": "EXP-RENT", "name": "Rent", "transactionType": "EXPENSE" }),
    )
    .await;
    let cash = create(&app, &token, "/api/payment-methods", json!({ "name": "Cash" })).await;

    let created = create(
        &app,
        &token,
        "/api/transactions",
        json!({
            "transactionDate": "2026-01-15",
            "transactionType": "EXPENSE",
            "categoryId": category["id"],
            "objectType": "OTHER",
            "otherName": "Landlord",
            "businessUnitId": unit["id"],
            "amount": 1_000_000,
            "costAllocation": "DIRECT",
            "paymentMethodId": cash["id"],
            "submit": true
        }),
    )
    .await;
    assert_eq!(created["code"], "EXP-202601-0001");
    assert_eq!(created["approvalStatus"], "PENDING");
    let id = created["id"].as_str().unwrap();

    let (status, approved) = send(
        &app,
        "POST",
        &format!("/api/transactions/{id}/approve"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["approvalStatus"], "APPROVED");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/transactions/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "NOT_DELETABLE");

    let (status, paid) = send(
        &app,
        "PATCH",
        &format!("/api/transactions/{id}/payment-status"),
        Some(&token),
        Some(json!({ "paymentStatus": "PAID" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["paymentStatus"], "PAID");

    let (status, page) = send(&app, "GET", "/api/transactions?approvalStatus=APPROVED", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 1);

    let (status, history) = send(
        &app,
        "GET",
        &format!("/api/activity-logs/TRANSACTION/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, ["CREATE", "SUBMIT", "APPROVE", "UPDATE"]);
}

#[rstest]
#[case::deactivated("ADMIN", false, StatusCode::UNAUTHORIZED)]
#[case::demoted("STAFF", true, StatusCode::FORBIDDEN)]
#[tokio::test]
async fn test_existing_token_follows_stored_user(
    #[case] role: &str,
    #[case] is_active: bool,
    #[case] expected: StatusCode,
) {
    let app = app().await;
    let token = login(&app).await;
    let colleague = create(
        &app,
        &token,
        "/api/users",
        json!({
            "email": "second.admin@holdco.test",
            "password": "second-password",
            "fullName": "Second Admin",
            "role": "ADMIN"
        }),
    )
    .await;
    let colleague_token = login_as(&app, "second.admin@holdco.test", "second-password").await;

    let (status, _) = send(&app, "GET", "/api/users", Some(&colleague_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/{}", colleague["id"].as_str().unwrap()),
        Some(&token),
        Some(json!({ "fullName": "Second Admin", "role": role, "isActive": is_active })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = send(&app, "GET", "/api/users", Some(&colleague_token), None).await;
    assert_eq!(status, expected);
    let (status, _) = send(
        &app,
        "POST",
        "/api/business-units",
        Some(&colleague_token),
        Some(json!({ "code": "NEW", "name": "New unit" })),
    )
    .await;
    assert_eq!(status, expected);
}
