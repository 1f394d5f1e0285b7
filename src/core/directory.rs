//! Directory records: the people and categories tickets refer to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, ClientId, Role, TechnicianId, UserId};

/// A user account. Principals are derived from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// A customer profile that owns tickets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub company: Option<String>,
    pub contact_email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    #[must_use]
    pub fn new(name: impl Into<String>, contact_email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ClientId::new(),
            name: name.into(),
            company: None,
            contact_email: contact_email.into(),
            phone: None,
            is_active: true,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A technician profile tickets can be assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub id: TechnicianId,
    pub name: String,
    pub specialty: Option<String>,
    pub availability: bool,
    pub is_active: bool,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Technician {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TechnicianId::new(),
            name: name.into(),
            specialty: None,
            availability: true,
            is_active: true,
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Active and flagged as available for new work
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.is_active && self.availability
    }
}

/// Ticket category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
