//! Technician workload cap
//!
//! The in-progress count is recomputed from the technician's associated
//! tickets on every decision; no counter is stored anywhere.

use crate::core::{Status, TechnicianId, Ticket};
use crate::error::{HelpdeskError, Result};
use crate::storage::RecordStore;
use tracing::{debug, warn};

/// Maximum number of in-progress tickets a technician may hold at once
pub const MAX_IN_PROGRESS_TICKETS: usize = 5;

/// Count the tickets currently in progress
#[must_use]
pub fn in_progress_count(tickets: &[Ticket]) -> usize {
    tickets
        .iter()
        .filter(|t| t.status == Status::InProgress)
        .count()
}

/// Whether a technician with `count` in-progress tickets may take another
#[must_use]
pub const fn has_capacity(count: usize) -> bool {
    count < MAX_IN_PROGRESS_TICKETS
}

/// Decides whether a technician may accept more work
pub struct CapacityPolicy<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> CapacityPolicy<'a, S>
where
    S: RecordStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Live count of the technician's in-progress tickets
    pub async fn in_progress_count(&self, technician_id: &TechnicianId) -> Result<usize> {
        if self.store.technician(technician_id).await?.is_none() {
            return Err(HelpdeskError::not_found("Technician", technician_id));
        }
        let tickets = self.store.technician_tickets(technician_id).await?;
        Ok(in_progress_count(&tickets))
    }

    pub async fn can_accept(&self, technician_id: &TechnicianId) -> Result<bool> {
        let count = self.in_progress_count(technician_id).await?;
        debug!(
            technician = %technician_id.short(),
            in_progress = count,
            limit = MAX_IN_PROGRESS_TICKETS,
            "Checked technician capacity"
        );
        Ok(has_capacity(count))
    }

    /// Fails with `CapacityExceeded` when the technician is at the cap
    pub async fn assert_can_accept(&self, technician_id: &TechnicianId) -> Result<()> {
        if self.can_accept(technician_id).await? {
            return Ok(());
        }
        warn!(
            technician = %technician_id,
            limit = MAX_IN_PROGRESS_TICKETS,
            "Technician is at capacity"
        );
        Err(HelpdeskError::CapacityExceeded {
            technician_id: *technician_id,
            limit: MAX_IN_PROGRESS_TICKETS,
        })
    }
}
