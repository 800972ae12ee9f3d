//! Ticket issuance: one sealed ticket per participant of a confirmed
//! reservation.

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::qr_codec::{QrCodec, QrPayload};
use crate::reservation::validate_participants;
use crate::ticket_status::TicketStatus;
use crate::types::{DbId, TicketId, Timestamp};

/// Inputs needed to issue a reservation's tickets.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    pub reservation_id: DbId,
    pub event_id: DbId,
    pub event_date: NaiveDate,
    /// Ordered; position determines `ticket_number`.
    pub participants: Vec<String>,
}

/// A ticket ready to insert. `qr_payload` is final and never rewritten.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub id: TicketId,
    pub reservation_id: DbId,
    pub event_id: DbId,
    pub participant_name: String,
    pub ticket_number: i32,
    pub qr_payload: String,
    pub status: TicketStatus,
}

/// Build and seal every ticket for `request`.
///
/// Ticket numbers start at 1. `issued_at` is sealed into each payload as
/// milliseconds since the epoch.
pub fn build_tickets(
    codec: &QrCodec,
    request: &IssueRequest,
    issued_at: Timestamp,
) -> Result<Vec<NewTicket>, CoreError> {
    validate_participants(&request.participants)?;

    let event_date = request.event_date.format("%Y-%m-%d").to_string();
    let timestamp = issued_at.timestamp_millis();

    request
        .participants
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let id = uuid::Uuid::now_v7();
            let ticket_number = i as u32 + 1;
            let participant_name = name.trim().to_string();

            let qr_payload = codec.encode(&QrPayload {
                ticket_id: id.to_string(),
                reservation_id: request.reservation_id.to_string(),
                event_id: request.event_id.to_string(),
                participant_name: participant_name.clone(),
                ticket_number,
                event_date: event_date.clone(),
                timestamp,
            })?;

            Ok(NewTicket {
                id,
                reservation_id: request.reservation_id,
                event_id: request.event_id,
                participant_name,
                ticket_number: ticket_number as i32,
                qr_payload,
                status: TicketStatus::Valid,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn codec() -> QrCodec {
        QrCodec::new("issuance-test-secret-long-enough-for-use").unwrap()
    }

    fn request(participants: &[&str]) -> IssueRequest {
        IssueRequest {
            reservation_id: 42,
            event_id: 7,
            event_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            participants: participants.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn issues_one_sealed_ticket_per_participant() {
        let codec = codec();
        let issued_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let tickets = build_tickets(&codec, &request(&["Alice", " Bob "]), issued_at).unwrap();

        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].ticket_number, 1);
        assert_eq!(tickets[1].ticket_number, 2);
        assert_eq!(tickets[1].participant_name, "Bob");
        assert!(tickets.iter().all(|t| t.status == TicketStatus::Valid));
        assert_ne!(tickets[0].id, tickets[1].id);

        let payload = codec.decode(&tickets[0].qr_payload).unwrap();
        assert_eq!(payload.ticket_id, tickets[0].id.to_string());
        assert_eq!(payload.reservation_id, "42");
        assert_eq!(payload.event_id, "7");
        assert_eq!(payload.participant_name, "Alice");
        assert_eq!(payload.event_date, "2025-06-01");
        assert_eq!(payload.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn empty_reservation_issues_nothing() {
        assert!(build_tickets(&codec(), &request(&[]), Utc::now()).is_err());
    }

    #[test]
    fn blank_participant_is_rejected() {
        assert!(build_tickets(&codec(), &request(&["Alice", ""]), Utc::now()).is_err());
    }
}
