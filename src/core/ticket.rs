use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, ClientId, Priority, Status, TechnicianId, TicketId};

/// A unit of support work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub client_id: ClientId,
    pub technician_id: Option<TechnicianId>,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Create an open, unassigned ticket
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        client_id: ClientId,
        category_id: CategoryId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TicketId::new(),
            title: title.into(),
            description: description.into(),
            status: Status::Open,
            priority: Priority::default(),
            client_id,
            technician_id: None,
            category_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_assigned_to(&self, technician_id: &TechnicianId) -> bool {
        self.technician_id.as_ref() == Some(technician_id)
    }

    #[must_use]
    pub fn belongs_to(&self, client_id: &ClientId) -> bool {
        self.client_id == *client_id
    }

    /// Bump the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Which tickets a collection read covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TicketScope {
    #[default]
    All,
    Client(ClientId),
    Technician(TechnicianId),
}

impl TicketScope {
    /// Whether a ticket falls inside this scope
    #[must_use]
    pub fn includes(&self, ticket: &Ticket) -> bool {
        match self {
            Self::All => true,
            Self::Client(id) => ticket.belongs_to(id),
            Self::Technician(id) => ticket.is_assigned_to(id),
        }
    }
}
