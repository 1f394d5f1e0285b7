use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UserId;
use crate::error::HelpdeskError;

/// Role carried by an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Technician,
    #[default]
    Client,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Technician => "technician",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "technician" => Ok(Self::Technician),
            "client" => Ok(Self::Client),
            _ => Err(HelpdeskError::InvalidInput(format!(
                "Invalid role: {s}. Must be one of: admin, technician, client"
            ))),
        }
    }
}

/// Ticket operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    ReadOne,
    ReadCollection,
    UpdateFields,
    UpdateStatus,
    AssignTechnician,
    Delete,
}

impl Action {
    pub const ALL: [Self; 7] = [
        Self::Create,
        Self::ReadOne,
        Self::ReadCollection,
        Self::UpdateFields,
        Self::UpdateStatus,
        Self::AssignTechnician,
        Self::Delete,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create ticket",
            Self::ReadOne => "read ticket",
            Self::ReadCollection => "list tickets",
            Self::UpdateFields => "update ticket",
            Self::UpdateStatus => "update ticket status",
            Self::AssignTechnician => "assign technician",
            Self::Delete => "delete ticket",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated actor behind a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}
