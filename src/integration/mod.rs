//! Ticket event notifications
//!
//! Committed lifecycle changes are published on a broadcast channel so other
//! in-process consumers can follow the desk without polling the store.
//! Publishing never fails a command: with no subscribers the event is dropped.

use crate::core::{Status, TechnicianId, Ticket, TicketId};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Capacity of the event channel; slow receivers lag past this
const CHANNEL_CAPACITY: usize = 100;

/// Events emitted after a change is committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketEvent {
    TicketCreated {
        ticket: Ticket,
    },
    TicketUpdated {
        ticket: Ticket,
    },
    StatusChanged {
        ticket_id: TicketId,
        old_status: Status,
        new_status: Status,
    },
    TechnicianAssigned {
        ticket_id: TicketId,
        technician_id: TechnicianId,
    },
    TicketRemoved {
        ticket_id: TicketId,
    },
}

impl TicketEvent {
    /// The ticket the event concerns
    #[must_use]
    pub const fn ticket_id(&self) -> &TicketId {
        match self {
            Self::TicketCreated { ticket } | Self::TicketUpdated { ticket } => &ticket.id,
            Self::StatusChanged { ticket_id, .. }
            | Self::TechnicianAssigned { ticket_id, .. }
            | Self::TicketRemoved { ticket_id } => ticket_id,
        }
    }
}

/// Fan-out point for ticket events
pub struct IntegrationService {
    event_sender: broadcast::Sender<TicketEvent>,
}

impl std::fmt::Debug for IntegrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationService")
            .field("event_sender", &"broadcast::Sender<TicketEvent>")
            .field("receivers", &self.event_sender.receiver_count())
            .finish()
    }
}

impl Default for IntegrationService {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegrationService {
    #[must_use]
    pub fn new() -> Self {
        let (event_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { event_sender }
    }

    /// Get an event receiver
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TicketEvent> {
        self.event_sender.subscribe()
    }

    fn publish(&self, event: TicketEvent) {
        let _ = self.event_sender.send(event);
    }

    pub fn notify_ticket_created(&self, ticket: &Ticket) {
        self.publish(TicketEvent::TicketCreated {
            ticket: ticket.clone(),
        });
        info!("Integration: Ticket created - {}", ticket.id.short());
    }

    pub fn notify_ticket_updated(&self, ticket: &Ticket) {
        self.publish(TicketEvent::TicketUpdated {
            ticket: ticket.clone(),
        });
        info!("Integration: Ticket updated - {}", ticket.id.short());
    }

    pub fn notify_status_changed(&self, ticket_id: &TicketId, old_status: Status, new_status: Status) {
        self.publish(TicketEvent::StatusChanged {
            ticket_id: *ticket_id,
            old_status,
            new_status,
        });
        info!(
            "Integration: Status changed - {} from {} to {}",
            ticket_id.short(),
            old_status,
            new_status
        );
    }

    pub fn notify_technician_assigned(&self, ticket_id: &TicketId, technician_id: &TechnicianId) {
        self.publish(TicketEvent::TechnicianAssigned {
            ticket_id: *ticket_id,
            technician_id: *technician_id,
        });
        info!(
            "Integration: Technician {} assigned to {}",
            technician_id.short(),
            ticket_id.short()
        );
    }

    pub fn notify_ticket_removed(&self, ticket_id: &TicketId) {
        self.publish(TicketEvent::TicketRemoved {
            ticket_id: *ticket_id,
        });
        info!("Integration: Ticket removed - {}", ticket_id.short());
    }
}

/// Global integration service instance
#[cfg(not(test))]
static INTEGRATION: once_cell::sync::OnceCell<Arc<IntegrationService>> =
    once_cell::sync::OnceCell::new();

/// Global integration service instance for tests (allows replacement)
#[cfg(test)]
static INTEGRATION: std::sync::RwLock<Option<Arc<IntegrationService>>> =
    std::sync::RwLock::new(None);

/// Install the process-wide integration service and return it
pub fn init_integration() -> Arc<IntegrationService> {
    install(Arc::new(IntegrationService::new()))
}

#[cfg(not(test))]
fn install(service: Arc<IntegrationService>) -> Arc<IntegrationService> {
    if INTEGRATION.set(Arc::clone(&service)).is_err() {
        tracing::debug!("Integration already initialized");
    }
    INTEGRATION.get().map_or(service, Arc::clone)
}

#[cfg(test)]
fn install(service: Arc<IntegrationService>) -> Arc<IntegrationService> {
    let mut integration = INTEGRATION
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    *integration = Some(Arc::clone(&service));
    service
}

/// Get the integration service
#[cfg(not(test))]
pub fn integration() -> Option<&'static Arc<IntegrationService>> {
    INTEGRATION.get()
}

/// Get the integration service (test version)
#[cfg(test)]
pub fn integration() -> Option<Arc<IntegrationService>> {
    let integration = INTEGRATION
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    integration.clone()
}

/// Helper function to notify about ticket creation
pub fn notify_ticket_created(ticket: &Ticket) {
    if let Some(integration) = integration() {
        integration.notify_ticket_created(ticket);
    }
}

/// Helper function to notify about ticket update
pub fn notify_ticket_updated(ticket: &Ticket) {
    if let Some(integration) = integration() {
        integration.notify_ticket_updated(ticket);
    }
}

/// Helper function to notify about status change
pub fn notify_status_changed(ticket_id: &TicketId, old_status: Status, new_status: Status) {
    if let Some(integration) = integration() {
        integration.notify_status_changed(ticket_id, old_status, new_status);
    }
}

/// Helper function to notify about a technician assignment
pub fn notify_technician_assigned(ticket_id: &TicketId, technician_id: &TechnicianId) {
    if let Some(integration) = integration() {
        integration.notify_technician_assigned(ticket_id, technician_id);
    }
}

/// Helper function to notify about ticket removal
pub fn notify_ticket_removed(ticket_id: &TicketId) {
    if let Some(integration) = integration() {
        integration.notify_ticket_removed(ticket_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TicketBuilder;
    use serial_test::serial;

    #[test]
    fn test_events_reach_subscribers() {
        let service = IntegrationService::new();
        let mut receiver = service.subscribe();
        let ticket = TicketBuilder::new().title("Wi-Fi drops").build();
        let technician_id = TechnicianId::new();

        service.notify_ticket_created(&ticket);
        service.notify_technician_assigned(&ticket.id, &technician_id);
        service.notify_status_changed(&ticket.id, Status::Open, Status::InProgress);

        assert_eq!(
            receiver.try_recv().unwrap(),
            TicketEvent::TicketCreated {
                ticket: ticket.clone()
            }
        );
        assert_eq!(
            receiver.try_recv().unwrap(),
            TicketEvent::TechnicianAssigned {
                ticket_id: ticket.id,
                technician_id,
            }
        );
        let event = receiver.try_recv().unwrap();
        assert_eq!(event.ticket_id(), &ticket.id);
        assert!(matches!(
            event,
            TicketEvent::StatusChanged {
                new_status: Status::InProgress,
                ..
            }
        ));
    }

    #[test]
    fn test_publishing_without_subscribers_is_silent() {
        let service = IntegrationService::new();
        service.notify_ticket_removed(&TicketId::new());
    }

    #[test]
    #[serial]
    fn test_global_helpers_use_installed_service() {
        let service = init_integration();
        let mut receiver = service.subscribe();
        let ticket_id = TicketId::new();

        notify_ticket_removed(&ticket_id);

        let mut seen = false;
        while let Ok(event) = receiver.try_recv() {
            if event == (TicketEvent::TicketRemoved { ticket_id }) {
                seen = true;
            }
        }
        assert!(seen);
    }
}
