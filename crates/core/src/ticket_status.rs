//! Ticket status values, scan actions, and the scanning state machine.
//!
//! Transition rules (current status x scan action):
//!
//! | status              | entry                   | exit                | re-entry         |
//! |---------------------|-------------------------|---------------------|------------------|
//! | `valid`             | -> `used`               | not yet validated   | not yet validated|
//! | `used`              | already used (policy)   | -> `temporarily_valid` | must exit first |
//! | `temporarily_valid` | -> `used`               | already out         | -> `used`        |
//! | `cancelled`         | cancelled               | cancelled           | cancelled        |

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Ticket status
// ---------------------------------------------------------------------------

/// Lifecycle status of a single ticket. Stored as snake_case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Valid,
    Used,
    TemporarilyValid,
    Cancelled,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Valid,
        TicketStatus::Used,
        TicketStatus::TemporarilyValid,
        TicketStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Valid => "valid",
            TicketStatus::Used => "used",
            TicketStatus::TemporarilyValid => "temporarily_valid",
            TicketStatus::Cancelled => "cancelled",
        }
    }

    /// `cancelled` has no outbound transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Cancelled)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown ticket status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Scan action
// ---------------------------------------------------------------------------

/// The operator's declared intent when presenting a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanAction {
    #[serde(rename = "entry")]
    Entry,
    #[serde(rename = "exit")]
    Exit,
    #[serde(rename = "re-entry")]
    ReEntry,
}

impl ScanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanAction::Entry => "entry",
            ScanAction::Exit => "exit",
            ScanAction::ReEntry => "re-entry",
        }
    }
}

impl std::fmt::Display for ScanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScanAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(ScanAction::Entry),
            "exit" => Ok(ScanAction::Exit),
            "re-entry" => Ok(ScanAction::ReEntry),
            other => Err(CoreError::Validation(format!("Unknown scan action '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Already-used policy
// ---------------------------------------------------------------------------

/// How a second `entry` scan of a `used` ticket is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlreadyUsedPolicy {
    /// Reject the scan.
    #[default]
    Block,
    /// Admit with a warning; the ticket status is left unchanged.
    Warn,
}

impl std::str::FromStr for AlreadyUsedPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(AlreadyUsedPolicy::Block),
            "warn" => Ok(AlreadyUsedPolicy::Warn),
            other => Err(CoreError::Validation(format!(
                "Unknown already-used policy '{other}'. Expected 'block' or 'warn'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Rejections and decisions
// ---------------------------------------------------------------------------

/// Every reason a scan can fail (or, under [`AlreadyUsedPolicy::Warn`], warn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanRejection {
    TicketNotFound,
    WrongEvent,
    AlreadyUsed,
    NotYetValidated,
    MustExitFirst,
    AlreadyOut,
    Cancelled,
    /// Another scan changed the ticket between read and write.
    StatusConflict,
    /// The ticket could not be read from storage.
    LookupFailed,
    /// The status change could not be written.
    StorageWriteFailed,
}

impl ScanRejection {
    /// Stable machine-readable code, stored in the audit trail.
    pub fn code(&self) -> &'static str {
        match self {
            ScanRejection::TicketNotFound => "ticket_not_found",
            ScanRejection::WrongEvent => "wrong_event",
            ScanRejection::AlreadyUsed => "already_used",
            ScanRejection::NotYetValidated => "not_yet_validated",
            ScanRejection::MustExitFirst => "must_exit_first",
            ScanRejection::AlreadyOut => "already_out",
            ScanRejection::Cancelled => "cancelled",
            ScanRejection::StatusConflict => "status_conflict",
            ScanRejection::LookupFailed => "lookup_failed",
            ScanRejection::StorageWriteFailed => "storage_write_failed",
        }
    }

    /// Operator-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            ScanRejection::TicketNotFound => "Ticket not found",
            ScanRejection::WrongEvent => "Ticket belongs to a different event",
            ScanRejection::AlreadyUsed => "Ticket already used",
            ScanRejection::NotYetValidated => "Ticket has not been validated at entry yet",
            ScanRejection::MustExitFirst => "Ticket holder must exit before re-entering",
            ScanRejection::AlreadyOut => "Ticket holder has already exited",
            ScanRejection::Cancelled => "Ticket has been cancelled",
            ScanRejection::StatusConflict => "Ticket was scanned concurrently, please rescan",
            ScanRejection::LookupFailed => "Ticket could not be checked, please rescan",
            ScanRejection::StorageWriteFailed => "Scan could not be recorded, please rescan",
        }
    }
}

/// Outcome of evaluating one scan against a ticket's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDecision {
    /// Admit and move the ticket to `to`.
    Transition { to: TicketStatus },
    /// Admit without changing status (soft already-used block).
    AdmitWithWarning(ScanRejection),
    Reject(ScanRejection),
}

/// Apply the transition table.
pub fn evaluate(
    current: TicketStatus,
    action: ScanAction,
    policy: AlreadyUsedPolicy,
) -> ScanDecision {
    use ScanAction::*;
    use TicketStatus::*;

    match (current, action) {
        (Cancelled, _) => ScanDecision::Reject(ScanRejection::Cancelled),

        (Valid, Entry) => ScanDecision::Transition { to: Used },
        (Valid, Exit | ReEntry) => ScanDecision::Reject(ScanRejection::NotYetValidated),

        (Used, Entry) => match policy {
            AlreadyUsedPolicy::Block => ScanDecision::Reject(ScanRejection::AlreadyUsed),
            AlreadyUsedPolicy::Warn => ScanDecision::AdmitWithWarning(ScanRejection::AlreadyUsed),
        },
        (Used, Exit) => ScanDecision::Transition { to: TemporarilyValid },
        (Used, ReEntry) => ScanDecision::Reject(ScanRejection::MustExitFirst),

        // An entry scan of someone who stepped out is a re-entry.
        (TemporarilyValid, Entry | ReEntry) => ScanDecision::Transition { to: Used },
        (TemporarilyValid, Exit) => ScanDecision::Reject(ScanRejection::AlreadyOut),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const ACTIONS: [ScanAction; 3] = [ScanAction::Entry, ScanAction::Exit, ScanAction::ReEntry];

    fn apply(status: TicketStatus, action: ScanAction) -> TicketStatus {
        match evaluate(status, action, AlreadyUsedPolicy::Block) {
            ScanDecision::Transition { to } => to,
            _ => status,
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for status in TicketStatus::ALL {
            assert_eq!(status.as_str().parse::<TicketStatus>().unwrap(), status);
        }
        assert!("expired".parse::<TicketStatus>().is_err());
    }

    #[test]
    fn action_serde_uses_hyphenated_reentry() {
        assert_eq!(serde_json::to_string(&ScanAction::ReEntry).unwrap(), "\"re-entry\"");
        let parsed: ScanAction = serde_json::from_str("\"re-entry\"").unwrap();
        assert_eq!(parsed, ScanAction::ReEntry);
        assert_eq!("exit".parse::<ScanAction>().unwrap(), ScanAction::Exit);
        assert!("reentry".parse::<ScanAction>().is_err());
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(" WARN ".parse::<AlreadyUsedPolicy>().unwrap(), AlreadyUsedPolicy::Warn);
        assert_eq!("block".parse::<AlreadyUsedPolicy>().unwrap(), AlreadyUsedPolicy::Block);
        assert!("soft".parse::<AlreadyUsedPolicy>().is_err());
    }

    #[test]
    fn valid_becomes_used_only_on_entry() {
        assert_eq!(apply(TicketStatus::Valid, ScanAction::Entry), TicketStatus::Used);
        for action in [ScanAction::Exit, ScanAction::ReEntry] {
            assert_eq!(
                evaluate(TicketStatus::Valid, action, AlreadyUsedPolicy::Block),
                ScanDecision::Reject(ScanRejection::NotYetValidated)
            );
        }
    }

    #[test]
    fn exit_and_reentry_cycle_repeats() {
        let mut status = apply(TicketStatus::Valid, ScanAction::Entry);
        for _ in 0..50 {
            status = apply(status, ScanAction::Exit);
            assert_eq!(status, TicketStatus::TemporarilyValid);
            status = apply(status, ScanAction::ReEntry);
            assert_eq!(status, TicketStatus::Used);
        }
    }

    #[test]
    fn used_rejects_reentry_without_exit() {
        assert_eq!(
            evaluate(TicketStatus::Used, ScanAction::ReEntry, AlreadyUsedPolicy::Block),
            ScanDecision::Reject(ScanRejection::MustExitFirst)
        );
    }

    #[test]
    fn temporarily_valid_rejects_second_exit() {
        assert_eq!(
            evaluate(TicketStatus::TemporarilyValid, ScanAction::Exit, AlreadyUsedPolicy::Block),
            ScanDecision::Reject(ScanRejection::AlreadyOut)
        );
    }

    #[test]
    fn temporarily_valid_entry_counts_as_reentry() {
        assert_eq!(apply(TicketStatus::TemporarilyValid, ScanAction::Entry), TicketStatus::Used);
    }

    #[test]
    fn already_used_entry_follows_policy() {
        assert_eq!(
            evaluate(TicketStatus::Used, ScanAction::Entry, AlreadyUsedPolicy::Block),
            ScanDecision::Reject(ScanRejection::AlreadyUsed)
        );
        assert_matches!(
            evaluate(TicketStatus::Used, ScanAction::Entry, AlreadyUsedPolicy::Warn),
            ScanDecision::AdmitWithWarning(ScanRejection::AlreadyUsed)
        );
    }

    #[test]
    fn cancelled_rejects_everything() {
        for policy in [AlreadyUsedPolicy::Block, AlreadyUsedPolicy::Warn] {
            for action in ACTIONS {
                assert_eq!(
                    evaluate(TicketStatus::Cancelled, action, policy),
                    ScanDecision::Reject(ScanRejection::Cancelled)
                );
            }
        }
        assert!(TicketStatus::Cancelled.is_terminal());
        assert!(!TicketStatus::Used.is_terminal());
    }

    #[test]
    fn no_transition_ever_targets_valid_or_cancelled() {
        for status in TicketStatus::ALL {
            for action in ACTIONS {
                if let ScanDecision::Transition { to } =
                    evaluate(status, action, AlreadyUsedPolicy::Warn)
                {
                    assert!(
                        matches!(to, TicketStatus::Used | TicketStatus::TemporarilyValid),
                        "{status} + {action} -> {to}"
                    );
                }
            }
        }
    }

    #[test]
    fn rejection_codes_are_unique() {
        let all = [
            ScanRejection::TicketNotFound,
            ScanRejection::WrongEvent,
            ScanRejection::AlreadyUsed,
            ScanRejection::NotYetValidated,
            ScanRejection::MustExitFirst,
            ScanRejection::AlreadyOut,
            ScanRejection::Cancelled,
            ScanRejection::StatusConflict,
            ScanRejection::LookupFailed,
            ScanRejection::StorageWriteFailed,
        ];
        let codes: std::collections::HashSet<_> = all.iter().map(|r| r.code()).collect();
        assert_eq!(codes.len(), all.len());
        for r in all {
            assert_eq!(serde_json::to_value(r).unwrap(), r.code());
        }
    }
}
