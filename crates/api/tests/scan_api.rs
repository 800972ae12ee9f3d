//! HTTP-level integration tests for gate scanning, verification, and the
//! scan audit trail.

mod common;

use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use common::{body_json, get_auth, post_json_auth};
use sqlx::PgPool;
use ticketgate_core::issuance::{build_tickets, IssueRequest};
use ticketgate_core::qr_codec::QrCodec;
use ticketgate_core::ticket_status::AlreadyUsedPolicy;
use ticketgate_db::models::event::CreateEvent;
use ticketgate_db::models::reservation::CreateReservation;
use ticketgate_db::models::ticket::Ticket;
use ticketgate_db::models::user::User;
use ticketgate_db::repositories::{EventRepo, ReservationRepo};

struct Gate {
    staff: User,
    event_id: i64,
    ticket: Ticket,
}

/// One confirmed reservation with a single ticket, sealed with the test secret.
async fn gate(pool: &PgPool) -> Gate {
    let staff = common::create_user(pool, "gate1", "staff").await;
    let carol = common::create_user(pool, "carol", "customer").await;

    let event = EventRepo::create(
        pool,
        &CreateEvent {
            title: "Summer Camp Show".into(),
            description: None,
            event_date: NaiveDate::from_ymd_opt(2099, 7, 14).unwrap(),
            capacity: 10,
        },
    )
    .await
    .unwrap();

    let res = ReservationRepo::create(
        pool,
        carol.id,
        &CreateReservation {
            event_id: event.id,
            participants: vec!["Alice".into()],
        },
    )
    .await
    .unwrap();

    let codec = QrCodec::new(&common::test_config().qr.signing_secret).unwrap();
    let new_tickets = build_tickets(
        &codec,
        &IssueRequest {
            reservation_id: res.id,
            event_id: event.id,
            event_date: event.event_date,
            participants: res.participants.clone(),
        },
        Utc::now(),
    )
    .unwrap();

    let ticket = match ReservationRepo::confirm(pool, res.id, &new_tickets).await.unwrap() {
        ticketgate_db::repositories::ConfirmOutcome::Confirmed { mut tickets, .. } => tickets.remove(0),
        other => panic!("unexpected confirm outcome {other:?}"),
    };

    Gate {
        staff,
        event_id: event.id,
        ticket,
    }
}

async fn scan(pool: &PgPool, g: &Gate, qr: &str, action: &str) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "qr_content": qr, "event_id": g.event_id, "action": action });
    let response = post_json_auth(app, "/api/v1/scan", body, &common::token_for(&g.staff)).await;
    assert_eq!(response.status(), StatusCode::OK, "a scan verdict is always 200");
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entry_exit_reentry_cycle(pool: PgPool) {
    let g = gate(&pool).await;
    let qr = g.ticket.qr_payload.clone();

    let first = scan(&pool, &g, &qr, "entry").await;
    assert_eq!(first["success"], true);
    assert_eq!(first["ticket"]["status"], "used");
    assert_eq!(first["ticket"]["participant_name"], "Alice");
    assert!(first["ticket"].get("qr_payload").is_none(), "payload is never echoed");

    let again = scan(&pool, &g, &qr, "entry").await;
    assert_eq!(again["success"], false);
    assert_eq!(again["reason"], "already_used");

    let out = scan(&pool, &g, &qr, "exit").await;
    assert_eq!(out["success"], true);
    assert_eq!(out["ticket"]["status"], "temporarily_valid");

    let back = scan(&pool, &g, &qr, "re-entry").await;
    assert_eq!(back["success"], true);
    assert_eq!(back["ticket"]["status"], "used");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_policy_admits_with_warning(pool: PgPool) {
    let g = gate(&pool).await;
    let mut config = common::test_config();
    config.qr.already_used_policy = AlreadyUsedPolicy::Warn;

    let body = serde_json::json!({
        "qr_content": g.ticket.qr_payload,
        "event_id": g.event_id,
        "action": "entry",
    });
    let token = common::token_for(&g.staff);

    let app = common::build_app_with_config(pool.clone(), config.clone());
    post_json_auth(app, "/api/v1/scan", body.clone(), &token).await;

    let app = common::build_app_with_config(pool, config);
    let json = body_json(post_json_auth(app, "/api/v1/scan", body, &token).await).await;
    assert_eq!(json["data"]["success"], true);
    assert_eq!(json["data"]["reason"], "already_used");
    assert_eq!(json["data"]["ticket"]["status"], "used");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tampered_code_is_not_found(pool: PgPool) {
    let g = gate(&pool).await;
    let mut tampered = g.ticket.qr_payload.clone();
    let idx = tampered.find("\"tag\":\"").unwrap() + 7;
    let flipped = if &tampered[idx..idx + 1] == "A" { "B" } else { "A" };
    tampered.replace_range(idx..idx + 1, flipped);

    let result = scan(&pool, &g, &tampered, "entry").await;
    assert_eq!(result["success"], false);
    assert_eq!(result["reason"], "ticket_not_found");
    assert!(result.get("ticket").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wrong_event_is_rejected(pool: PgPool) {
    let g = gate(&pool).await;
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "qr_content": g.ticket.qr_payload,
        "event_id": g.event_id + 1000,
        "action": "entry",
    });
    let json = body_json(post_json_auth(app, "/api/v1/scan", body, &common::token_for(&g.staff)).await).await;

    assert_eq!(json["data"]["success"], false);
    assert_eq!(json["data"]["reason"], "wrong_event");
}

// ---------------------------------------------------------------------------
// Verify and audit trail
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verify_does_not_change_status(pool: PgPool) {
    let g = gate(&pool).await;
    let token = common::token_for(&g.staff);

    for _ in 0..2 {
        let app = common::build_test_app(pool.clone());
        let body = serde_json::json!({ "qr_content": g.ticket.qr_payload, "event_id": g.event_id });
        let json = body_json(post_json_auth(app, "/api/v1/tickets/verify", body, &token).await).await;
        assert_eq!(json["data"]["valid"], true);
        assert_eq!(json["data"]["ticket"]["status"], "valid");
    }

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "qr_content": "bogus" });
    let json = body_json(post_json_auth(app, "/api/v1/tickets/verify", body, &token).await).await;
    assert_eq!(json["data"]["valid"], false);
    assert!(json["data"].get("ticket").is_none());

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/tickets/{}/scans", g.ticket.id);
    let json = body_json(get_auth(app, &uri, &token).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scan_history_lists_every_attempt(pool: PgPool) {
    let g = gate(&pool).await;
    let qr = g.ticket.qr_payload.clone();
    scan(&pool, &g, &qr, "exit").await;
    scan(&pool, &g, &qr, "entry").await;
    scan(&pool, &g, &qr, "entry").await;

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/tickets/{}/scans", g.ticket.id);
    let json = body_json(get_auth(app, &uri, &common::token_for(&g.staff)).await).await;
    let rows = json["data"].as_array().unwrap();

    let outcomes: Vec<&str> = rows.iter().map(|r| r["outcome"].as_str().unwrap()).collect();
    assert_eq!(outcomes, vec!["rejected", "admitted", "rejected"]);
    assert_eq!(rows[0]["reason"], "not_yet_validated");
    assert!(rows.iter().all(|r| r["operator_id"] == g.staff.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scan_history_for_unknown_ticket_is_404(pool: PgPool) {
    let g = gate(&pool).await;
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/tickets/{}/scans", uuid::Uuid::now_v7());

    let response = get_auth(app, &uri, &common::token_for(&g.staff)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
