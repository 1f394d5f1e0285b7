//! Technician ⇄ ticket binding
//!
//! Every new binding passes through the capacity policy, whatever the
//! ticket's status: assignment is usually followed straight away by a move to
//! in progress.

use super::capacity::CapacityPolicy;
use crate::core::{TechnicianId, Ticket, TicketId};
use crate::error::{HelpdeskError, Result};
use crate::storage::RecordStore;
use tracing::{debug, info};

pub struct AssignmentCoordinator<'a, S: ?Sized> {
    store: &'a S,
    capacity: CapacityPolicy<'a, S>,
}

impl<'a, S> AssignmentCoordinator<'a, S>
where
    S: RecordStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            capacity: CapacityPolicy::new(store),
        }
    }

    /// Bind a technician to a ticket and commit. Nothing is written on failure.
    pub async fn assign(&self, ticket_id: &TicketId, technician_id: &TechnicianId) -> Result<Ticket> {
        let mut ticket = self
            .store
            .ticket(ticket_id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("Ticket", ticket_id))?;

        self.check_assignable(technician_id).await?;

        ticket.technician_id = Some(*technician_id);
        ticket.touch();
        self.store.save_ticket(&ticket).await?;

        info!(
            ticket = %ticket.id,
            technician = %technician_id,
            "Technician assigned"
        );
        Ok(ticket)
    }

    /// The technician exists and has room for another ticket
    pub async fn check_assignable(&self, technician_id: &TechnicianId) -> Result<()> {
        self.require_technician(technician_id).await?;
        self.capacity.assert_can_accept(technician_id).await
    }

    /// Like [`check_assignable`](Self::check_assignable), but keeping the
    /// current technician is a no-op and skips the capacity check
    pub async fn check_reassignment(
        &self,
        current: Option<&TechnicianId>,
        requested: &TechnicianId,
    ) -> Result<()> {
        self.require_technician(requested).await?;
        if current == Some(requested) {
            debug!(technician = %requested.short(), "Technician unchanged, capacity not re-checked");
            return Ok(());
        }
        self.capacity.assert_can_accept(requested).await
    }

    async fn require_technician(&self, technician_id: &TechnicianId) -> Result<()> {
        match self.store.technician(technician_id).await? {
            Some(_) => Ok(()),
            None => Err(HelpdeskError::not_found("Technician", technician_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Status;
    use crate::lifecycle::capacity::{MAX_IN_PROGRESS_TICKETS, in_progress_count};
    use crate::lifecycle::transition::TransitionEngine;
    use crate::test_utils::TestDesk;

    #[tokio::test]
    async fn test_assign_commits_technician() {
        let desk = TestDesk::new().await;
        let ticket = desk.add_ticket(Status::Open).await;
        let coordinator = AssignmentCoordinator::new(desk.store.as_ref());

        let assigned = coordinator
            .assign(&ticket.id, &desk.technician_id)
            .await
            .unwrap();

        assert!(assigned.is_assigned_to(&desk.technician_id));
        let stored = desk.store.ticket(&ticket.id).await.unwrap().unwrap();
        assert_eq!(stored.technician_id, Some(desk.technician_id));
    }

    #[tokio::test]
    async fn test_assign_to_full_technician_changes_nothing() {
        let desk = TestDesk::new().await;
        desk.fill_technician().await;
        let ticket = desk.add_ticket(Status::Open).await;
        let coordinator = AssignmentCoordinator::new(desk.store.as_ref());

        let err = coordinator
            .assign(&ticket.id, &desk.technician_id)
            .await
            .unwrap_err();

        match err {
            HelpdeskError::CapacityExceeded {
                technician_id,
                limit,
            } => {
                assert_eq!(technician_id, desk.technician_id);
                assert_eq!(limit, MAX_IN_PROGRESS_TICKETS);
            },
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
        let stored = desk.store.ticket(&ticket.id).await.unwrap().unwrap();
        assert!(stored.technician_id.is_none());
    }

    #[tokio::test]
    async fn test_assign_missing_records() {
        let desk = TestDesk::new().await;
        let ticket = desk.add_ticket(Status::Open).await;
        let coordinator = AssignmentCoordinator::new(desk.store.as_ref());

        let err = coordinator
            .assign(&TicketId::new(), &desk.technician_id)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { entity: "Ticket", .. }));

        let err = coordinator
            .assign(&ticket.id, &TechnicianId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { entity: "Technician", .. }));
    }

    #[tokio::test]
    async fn test_keeping_same_technician_skips_capacity() {
        let desk = TestDesk::new().await;
        desk.fill_technician().await;
        let coordinator = AssignmentCoordinator::new(desk.store.as_ref());

        assert!(
            coordinator
                .check_reassignment(Some(&desk.technician_id), &desk.technician_id)
                .await
                .is_ok()
        );
        assert!(
            coordinator
                .check_reassignment(None, &desk.technician_id)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_cap_holds_across_assign_and_start_sequence() {
        let desk = TestDesk::new().await;
        let coordinator = AssignmentCoordinator::new(desk.store.as_ref());
        let engine = TransitionEngine::new(desk.store.as_ref());

        let mut started = 0;
        for _ in 0..MAX_IN_PROGRESS_TICKETS + 3 {
            let ticket = desk.add_ticket(Status::Open).await;
            let Ok(mut ticket) = coordinator.assign(&ticket.id, &desk.technician_id).await else {
                continue;
            };
            if let Ok(next) = engine.advance(&ticket, Status::InProgress).await {
                ticket.status = next;
                desk.store.save_ticket(&ticket).await.unwrap();
                started += 1;
            }
            let load = desk.store.technician_tickets(&desk.technician_id).await.unwrap();
            assert!(in_progress_count(&load) <= MAX_IN_PROGRESS_TICKETS);
        }
        assert_eq!(started, MAX_IN_PROGRESS_TICKETS);
    }
}
