//! Status transition engine
//!
//! Validity is decided purely by position in [`STATUS_ORDER`]: the only legal
//! move is to the entry directly after the current one.

use super::capacity::CapacityPolicy;
use crate::core::{STATUS_ORDER, Status, Ticket};
use crate::error::{HelpdeskError, Result};
use crate::storage::RecordStore;
use tracing::debug;

/// Validate a requested status change and return the new status
pub fn transition(current: Status, requested: Status) -> Result<Status> {
    if current.next() == Some(requested) {
        return Ok(requested);
    }
    Err(HelpdeskError::IllegalTransition { current, requested })
}

/// Every legal `(from, to)` pair, in lifecycle order
#[must_use]
pub fn legal_transitions() -> Vec<(Status, Status)> {
    STATUS_ORDER
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

/// Applies [`transition`] to a stored ticket, adding the capacity check
/// required when work starts on an assigned ticket
pub struct TransitionEngine<'a, S: ?Sized> {
    capacity: CapacityPolicy<'a, S>,
}

impl<'a, S> TransitionEngine<'a, S>
where
    S: RecordStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            capacity: CapacityPolicy::new(store),
        }
    }

    /// Decide the ticket's next status. Does not write anything.
    pub async fn advance(&self, ticket: &Ticket, requested: Status) -> Result<Status> {
        let next = transition(ticket.status, requested)?;

        if next == Status::InProgress && ticket.status != Status::InProgress {
            if let Some(technician_id) = &ticket.technician_id {
                self.capacity.assert_can_accept(technician_id).await?;
            }
        }

        debug!(
            ticket = %ticket.id.short(),
            from = %ticket.status,
            to = %next,
            "Status transition accepted"
        );
        Ok(next)
    }
}
