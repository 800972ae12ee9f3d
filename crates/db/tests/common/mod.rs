//! Fixtures shared by the database integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use ticketgate_core::issuance::{build_tickets, IssueRequest, NewTicket};
use ticketgate_core::qr_codec::QrCodec;
use ticketgate_db::models::event::{CreateEvent, Event};
use ticketgate_db::models::reservation::{CreateReservation, Reservation};
use ticketgate_db::models::user::{CreateUser, User};
use ticketgate_db::repositories::{EventRepo, ReservationRepo, UserRepo};

pub const SECRET: &str = "db-tests-qr-secret-0123456789abcdef";

pub fn codec() -> QrCodec {
    QrCodec::new(SECRET).unwrap()
}

pub async fn user(pool: &PgPool, username: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn event(pool: &PgPool, capacity: i32) -> Event {
    EventRepo::create(
        pool,
        &CreateEvent {
            title: "Summer Gala".to_string(),
            description: None,
            event_date: NaiveDate::from_ymd_opt(2099, 6, 1).unwrap(),
            capacity,
        },
    )
    .await
    .unwrap()
}

pub async fn reservation(pool: &PgPool, user_id: i64, event_id: i64, names: &[&str]) -> Reservation {
    ReservationRepo::create(
        pool,
        user_id,
        &CreateReservation {
            event_id,
            participants: names.iter().map(|n| n.to_string()).collect(),
        },
    )
    .await
    .unwrap()
}

pub fn tickets_for(codec: &QrCodec, reservation: &Reservation, event: &Event) -> Vec<NewTicket> {
    build_tickets(
        codec,
        &IssueRequest {
            reservation_id: reservation.id,
            event_id: event.id,
            event_date: event.event_date,
            participants: reservation.participants.clone(),
        },
        Utc::now(),
    )
    .unwrap()
}
