//! HTTP-level integration tests for login and role enforcement.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json, post_json_auth, TEST_PASSWORD};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = common::create_user(&pool, "gate1", "staff").await;
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({ "username": "gate1", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["expires_in"], 15 * 60);
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["user"]["role"], "staff");
    assert!(json["data"]["user"].get("password_hash").is_none());

    let last_login: Option<chrono::DateTime<chrono::Utc>> =
        sqlx::query_scalar("SELECT last_login_at FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(last_login.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    common::create_user(&pool, "gate1", "staff").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "gate1", "password": "incorrect_password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_nonexistent_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "ghost", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid username or password");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_inactive_user(pool: PgPool) {
    let user = common::create_user(&pool, "retired", "staff").await;
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "username": "retired", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scan_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "qr_content": "x", "event_id": 1, "action": "entry" });
    let response = post_json(app, "/api/v1/scan", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customer_cannot_scan(pool: PgPool) {
    let customer = common::create_user(&pool, "carol", "customer").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "qr_content": "x", "event_id": 1, "action": "entry" });
    let response = post_json_auth(app, "/api/v1/scan", body, &common::token_for(&customer)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_staff_cannot_create_events(pool: PgPool) {
    let staff = common::create_user(&pool, "gate1", "staff").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "title": "Gala", "event_date": "2099-06-01", "capacity": 50 });
    let response = post_json_auth(app, "/api/v1/events", body, &common::token_for(&staff)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_garbage_token_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = common::get_auth(app, "/api/v1/reservations/1", "not.a.jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Public endpoints need no token at all.
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/events").await;
    assert_eq!(response.status(), StatusCode::OK);
}
