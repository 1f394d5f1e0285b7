//! Error types for helpdesk
//!
//! Every failure the lifecycle engine can raise is a business-rule or
//! authorization fact, so none of them are retried internally. Each variant
//! carries enough context for the caller to render a precise message.

use crate::core::{Status, TechnicianId};
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, HelpdeskError>;

#[derive(Error, Debug)]
pub enum HelpdeskError {
    /// A referenced ticket, technician, client, category or user is absent
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The principal may not perform the requested action
    #[error("Access denied ({action}): {reason}")]
    Forbidden { action: String, reason: String },

    /// The requested status does not directly follow the current one
    #[error("{}", transition_message(.current, .requested))]
    IllegalTransition { current: Status, requested: Status },

    /// The technician already holds the maximum number of in-progress tickets
    #[error(
        "Technician {technician_id} already has {limit} tickets in progress. \
         The limit was reached and no more tickets can be accepted"
    )]
    CapacityExceeded {
        technician_id: TechnicianId,
        limit: usize,
    },

    /// A uniqueness rule in the directory was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No acting user could be established for the request
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    #[error("No helpdesk data file at {}", .path.display())]
    StoreNotInitialized { path: PathBuf },

    #[error("Helpdesk data file already exists at {}", .path.display())]
    StoreAlreadyInitialized { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

fn transition_message(current: &Status, requested: &Status) -> String {
    if current == requested {
        return format!("The ticket is already in status \"{current}\"");
    }

    match current.next() {
        Some(next) => format!(
            "Invalid status transition. The current status is \"{current}\" and it can only change to \"{next}\". \
             The valid sequence is: {}",
            Status::sequence()
        ),
        None => format!(
            "Invalid status transition. The current status is \"{current}\", which is final. \
             The valid sequence is: {}",
            Status::sequence()
        ),
    }
}

impl HelpdeskError {
    /// Shorthand for a missing record
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for an authorization denial
    pub fn forbidden(action: impl ToString, reason: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.to_string(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable label for the error class
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::IllegalTransition { .. } => "illegal_transition",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::Conflict(_) => "conflict",
            Self::InvalidInput(_) => "invalid_input",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::StoreNotInitialized { .. } | Self::StoreAlreadyInitialized { .. } => "store",
            Self::Io(_) | Self::Yaml(_) | Self::Json(_) => "storage",
            Self::Config(_) => "config",
        }
    }

    /// Message suitable for showing to an end user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Io(e) => format!("Could not access the helpdesk data: {e}"),
            _ => self.to_string(),
        }
    }

    /// Hints on how to get past the error
    #[must_use]
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::StoreNotInitialized { .. } => vec![
                "Run 'helpdesk init --admin-email <email>' to create the data file".to_string(),
                "Pass --data <path> to point at an existing data file".to_string(),
            ],
            Self::StoreAlreadyInitialized { .. } => {
                vec!["Use --force to overwrite the existing data file".to_string()]
            },
            Self::Unauthenticated(_) => vec![
                "Pass --as <email> or set HELPDESK_USER to act as a registered user".to_string(),
            ],
            Self::IllegalTransition {
                current: Status::Closed,
                ..
            } => vec!["Closed tickets cannot change status".to_string()],
            Self::IllegalTransition { current, .. } => current
                .next()
                .map(|next| vec![format!("Move the ticket to \"{next}\" first")])
                .unwrap_or_default(),
            Self::CapacityExceeded { .. } => vec![
                "Resolve one of the technician's in-progress tickets first".to_string(),
                "Assign the ticket to another technician".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Whether the caller can fix the request and try again
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Yaml(_) | Self::Json(_))
    }

    /// Whether the error stems from configuration
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_in_status_message() {
        let err = HelpdeskError::IllegalTransition {
            current: Status::Open,
            requested: Status::Open,
        };
        assert_eq!(err.to_string(), "The ticket is already in status \"open\"");
    }

    #[test]
    fn test_out_of_order_message_names_next_status_and_sequence() {
        let err = HelpdeskError::IllegalTransition {
            current: Status::Open,
            requested: Status::Resolved,
        };
        let message = err.to_string();
        assert!(message.contains("\"open\""));
        assert!(message.contains("can only change to \"in_progress\""));
        assert!(message.contains("open → in_progress → resolved → closed"));
    }

    #[test]
    fn test_final_status_message() {
        let err = HelpdeskError::IllegalTransition {
            current: Status::Closed,
            requested: Status::Open,
        };
        assert!(err.to_string().contains("which is final"));
        assert_eq!(err.suggestions(), vec!["Closed tickets cannot change status"]);
    }

    #[test]
    fn test_capacity_message() {
        let technician_id = TechnicianId::new();
        let err = HelpdeskError::CapacityExceeded {
            technician_id,
            limit: 5,
        };
        let message = err.to_string();
        assert!(message.contains(&technician_id.to_string()));
        assert!(message.contains("5 tickets in progress"));
        assert!(message.contains("no more tickets can be accepted"));
        assert_eq!(err.kind(), "capacity_exceeded");
    }

    #[test]
    fn test_recoverability() {
        assert!(HelpdeskError::forbidden("delete ticket", "nope").is_recoverable());
        let io = HelpdeskError::Io(std::io::Error::other("disk gone"));
        assert!(!io.is_recoverable());
        assert!(io.user_message().starts_with("Could not access"));
    }
}
