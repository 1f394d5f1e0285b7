//! Ticket operations on behalf of a principal
//!
//! Every operation follows the same sequence: role gate, load, ownership
//! check, lifecycle decision, single write. A rejected operation writes
//! nothing.

use crate::core::{
    Action, CategoryId, ClientId, Principal, Priority, Status, TechnicianId, Ticket, TicketId,
    TicketScope, validation,
};
use crate::error::{HelpdeskError, Result};
use crate::integration;
use crate::lifecycle::{
    AccessAuthorizer, Actor, AssignmentCoordinator, Grant, Resource, TransitionEngine, check,
};
use crate::storage::{RecordStore, Repository};
use std::sync::Arc;
use tracing::{debug, info};

/// Fields for a new ticket
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub category_id: CategoryId,
    /// Ignored for client principals, who always file for themselves
    pub client_id: Option<ClientId>,
    pub technician_id: Option<TechnicianId>,
}

/// Partial edit of a ticket's fields. The client and status are not editable
/// here.
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category_id: Option<CategoryId>,
    pub technician_id: Option<TechnicianId>,
}

impl TicketUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category_id.is_none()
            && self.technician_id.is_none()
    }
}

pub struct TicketService {
    store: Arc<dyn Repository>,
    default_priority: Priority,
}

impl TicketService {
    #[must_use]
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self {
            store,
            default_priority: Priority::default(),
        }
    }

    /// Priority given to tickets created without one
    #[must_use]
    pub const fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = priority;
        self
    }

    fn authorizer(&self) -> AccessAuthorizer<'_, dyn Repository> {
        AccessAuthorizer::new(self.store.as_ref())
    }

    pub async fn create(&self, principal: &Principal, new: NewTicket) -> Result<Ticket> {
        let actor = self.authorizer().admit(principal, Action::Create).await?;
        let client_id = match check(&actor, Action::Create, Resource::NewTicket)? {
            Grant::AsClient(own) => {
                if new.client_id.is_some_and(|requested| requested != own) {
                    debug!(client = %own.short(), "Ignoring client ID supplied by a client");
                }
                own
            },
            Grant::Full => new.client_id.ok_or_else(|| {
                HelpdeskError::InvalidInput("A client is required to create a ticket".to_string())
            })?,
            Grant::AsTechnician(_) => {
                return Err(HelpdeskError::forbidden(
                    Action::Create,
                    "Technicians cannot create tickets",
                ));
            },
        };

        validation::validate_title(&new.title)?;
        validation::validate_description(&new.description)?;
        self.require_category(&new.category_id).await?;
        self.require_client(&client_id).await?;

        if let Some(technician_id) = &new.technician_id {
            check(&actor, Action::AssignTechnician, Resource::NewTicket)?;
            AssignmentCoordinator::new(self.store.as_ref())
                .check_assignable(technician_id)
                .await?;
        }

        let mut ticket = Ticket::new(
            new.title.trim(),
            new.description.trim(),
            client_id,
            new.category_id,
        );
        ticket.priority = new.priority.unwrap_or(self.default_priority);
        ticket.technician_id = new.technician_id;
        self.store.save_ticket(&ticket).await?;

        info!(
            ticket = %ticket.id,
            client = %client_id,
            priority = %ticket.priority,
            "Ticket created"
        );
        integration::notify_ticket_created(&ticket);
        Ok(ticket)
    }

    /// Collection read. Non-admin principals are narrowed to their own
    /// tickets whatever scope they ask for, or refused if they name someone
    /// else's.
    pub async fn list(&self, principal: &Principal, scope: TicketScope) -> Result<Vec<Ticket>> {
        let actor = self
            .authorizer()
            .admit(principal, Action::ReadCollection)
            .await?;
        let grant = check(&actor, Action::ReadCollection, Resource::Collection(&scope))?;
        let effective = grant.scope(&scope);

        if grant == Grant::Full {
            match &effective {
                TicketScope::All => {},
                TicketScope::Client(id) => self.require_client(id).await?,
                TicketScope::Technician(id) => self.require_technician(id).await?,
            }
        }

        let tickets = self.store.tickets(&effective).await?;
        debug!(scope = ?effective, count = tickets.len(), "Listed tickets");
        Ok(tickets)
    }

    /// The calling client's ticket history
    pub async fn my_tickets(&self, principal: &Principal) -> Result<Vec<Ticket>> {
        match self.authorizer().actor(principal).await? {
            Actor::Client(id) => self.store.tickets(&TicketScope::Client(id)).await,
            _ => Err(HelpdeskError::forbidden(
                Action::ReadCollection,
                "Only clients have a ticket history",
            )),
        }
    }

    /// Tickets assigned to the calling technician
    pub async fn assigned(&self, principal: &Principal) -> Result<Vec<Ticket>> {
        match self.authorizer().actor(principal).await? {
            Actor::Technician(id) => self.store.technician_tickets(&id).await,
            _ => Err(HelpdeskError::forbidden(
                Action::ReadCollection,
                "Only technicians have assigned tickets",
            )),
        }
    }

    pub async fn get(&self, principal: &Principal, id: &TicketId) -> Result<Ticket> {
        let actor = self.authorizer().admit(principal, Action::ReadOne).await?;
        let ticket = self.load(id).await?;
        check(&actor, Action::ReadOne, Resource::Ticket(&ticket))?;
        Ok(ticket)
    }

    /// Edit ticket fields. Changing the technician goes through the
    /// assignment rules; keeping the current one does not re-check capacity.
    pub async fn update(
        &self,
        principal: &Principal,
        id: &TicketId,
        update: TicketUpdate,
    ) -> Result<Ticket> {
        let actor = self
            .authorizer()
            .admit(principal, Action::UpdateFields)
            .await?;
        let mut ticket = self.load(id).await?;
        check(&actor, Action::UpdateFields, Resource::Ticket(&ticket))?;

        if update.is_empty() {
            return Err(HelpdeskError::InvalidInput(
                "No changes specified. Use --help to see available options.".to_string(),
            ));
        }

        if let Some(title) = &update.title {
            validation::validate_title(title)?;
        }
        if let Some(description) = &update.description {
            validation::validate_description(description)?;
        }
        if let Some(category_id) = &update.category_id {
            self.require_category(category_id).await?;
        }

        let previous_technician = ticket.technician_id;
        if let Some(technician_id) = &update.technician_id {
            AssignmentCoordinator::new(self.store.as_ref())
                .check_reassignment(previous_technician.as_ref(), technician_id)
                .await?;
        }

        if let Some(title) = update.title {
            ticket.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            ticket.description = description.trim().to_string();
        }
        if let Some(priority) = update.priority {
            ticket.priority = priority;
        }
        if let Some(category_id) = update.category_id {
            ticket.category_id = category_id;
        }
        if let Some(technician_id) = update.technician_id {
            ticket.technician_id = Some(technician_id);
        }
        ticket.touch();
        self.store.save_ticket(&ticket).await?;

        info!(ticket = %ticket.id, "Ticket updated");
        integration::notify_ticket_updated(&ticket);
        if let Some(technician_id) = ticket.technician_id {
            if previous_technician != Some(technician_id) {
                integration::notify_technician_assigned(&ticket.id, &technician_id);
            }
        }
        Ok(ticket)
    }

    /// Move a ticket one step along the lifecycle
    pub async fn update_status(
        &self,
        principal: &Principal,
        id: &TicketId,
        requested: Status,
    ) -> Result<Ticket> {
        let actor = self
            .authorizer()
            .admit(principal, Action::UpdateStatus)
            .await?;
        let mut ticket = self.load(id).await?;
        check(&actor, Action::UpdateStatus, Resource::Ticket(&ticket))?;

        let previous = ticket.status;
        ticket.status = TransitionEngine::new(self.store.as_ref())
            .advance(&ticket, requested)
            .await?;
        ticket.touch();
        self.store.save_ticket(&ticket).await?;

        info!(
            ticket = %ticket.id,
            from = %previous,
            to = %ticket.status,
            "Ticket status changed"
        );
        integration::notify_status_changed(&ticket.id, previous, ticket.status);
        Ok(ticket)
    }

    pub async fn assign_technician(
        &self,
        principal: &Principal,
        id: &TicketId,
        technician_id: &TechnicianId,
    ) -> Result<Ticket> {
        let actor = self
            .authorizer()
            .admit(principal, Action::AssignTechnician)
            .await?;
        let ticket = self.load(id).await?;
        check(&actor, Action::AssignTechnician, Resource::Ticket(&ticket))?;

        let ticket = AssignmentCoordinator::new(self.store.as_ref())
            .assign(&ticket.id, technician_id)
            .await?;
        integration::notify_technician_assigned(&ticket.id, technician_id);
        Ok(ticket)
    }

    pub async fn remove(&self, principal: &Principal, id: &TicketId) -> Result<()> {
        let actor = self.authorizer().admit(principal, Action::Delete).await?;
        let ticket = self.load(id).await?;
        check(&actor, Action::Delete, Resource::Ticket(&ticket))?;

        self.store.delete_ticket(&ticket.id).await?;
        info!(ticket = %ticket.id, "Ticket deleted");
        integration::notify_ticket_removed(&ticket.id);
        Ok(())
    }

    async fn load(&self, id: &TicketId) -> Result<Ticket> {
        self.store
            .ticket(id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("Ticket", id))
    }

    async fn require_client(&self, id: &ClientId) -> Result<()> {
        match self.store.client(id).await? {
            Some(_) => Ok(()),
            None => Err(HelpdeskError::not_found("Client", id)),
        }
    }

    async fn require_category(&self, id: &CategoryId) -> Result<()> {
        match self.store.category(id).await? {
            Some(_) => Ok(()),
            None => Err(HelpdeskError::not_found("Category", id)),
        }
    }

    async fn require_technician(&self, id: &TechnicianId) -> Result<()> {
        match self.store.technician(id).await? {
            Some(_) => Ok(()),
            None => Err(HelpdeskError::not_found("Technician", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::MAX_IN_PROGRESS_TICKETS;
    use crate::test_utils::TestDesk;

    fn new_ticket(desk: &TestDesk) -> NewTicket {
        NewTicket {
            title: "Printer offline".to_string(),
            description: "The sales printer stopped printing yesterday".to_string(),
            priority: None,
            category_id: desk.category_id,
            client_id: None,
            technician_id: None,
        }
    }

    async fn setup() -> (TestDesk, TicketService) {
        let desk = TestDesk::new().await;
        let service = TicketService::new(desk.repository());
        (desk, service)
    }

    #[tokio::test]
    async fn test_client_creation_is_forced_to_own_profile() {
        let (desk, service) = setup().await;
        let (_, other_client) = desk.add_client("Otto Other", "otto@example.com").await;

        let mut request = new_ticket(&desk);
        request.client_id = Some(other_client);
        let ticket = service
            .create(&desk.client_principal, request)
            .await
            .unwrap();

        assert_eq!(ticket.client_id, desk.client_id);
        assert_eq!(ticket.status, Status::Open);
        assert_eq!(ticket.priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_admin_creation_requires_existing_records() {
        let (desk, service) = setup().await;

        let err = service
            .create(&desk.admin, new_ticket(&desk))
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::InvalidInput(_)));

        let mut request = new_ticket(&desk);
        request.client_id = Some(ClientId::new());
        let err = service.create(&desk.admin, request).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { entity: "Client", .. }));

        let mut request = new_ticket(&desk);
        request.client_id = Some(desk.client_id);
        request.category_id = CategoryId::new();
        let err = service.create(&desk.admin, request).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { entity: "Category", .. }));
    }

    #[tokio::test]
    async fn test_creation_with_full_technician_is_rejected() {
        let (desk, service) = setup().await;
        desk.fill_technician().await;

        let mut request = new_ticket(&desk);
        request.client_id = Some(desk.client_id);
        request.technician_id = Some(desk.technician_id);
        let err = service.create(&desk.admin, request).await.unwrap_err();

        assert!(matches!(err, HelpdeskError::CapacityExceeded { .. }));
        let all = service.list(&desk.admin, TicketScope::All).await.unwrap();
        assert_eq!(all.len(), MAX_IN_PROGRESS_TICKETS);
    }

    #[tokio::test]
    async fn test_client_cannot_pick_a_technician() {
        let (desk, service) = setup().await;
        let mut request = new_ticket(&desk);
        request.technician_id = Some(desk.technician_id);

        let err = service
            .create(&desk.client_principal, request)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_technician_cannot_create() {
        let (desk, service) = setup().await;
        let err = service
            .create(&desk.technician_principal, new_ticket(&desk))
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_client_listing_is_narrowed() {
        let (desk, service) = setup().await;
        let (other, other_id) = desk.add_client("Otto Other", "otto@example.com").await;
        desk.add_ticket(Status::Open).await;
        let mut request = new_ticket(&desk);
        request.title = "Keyboard missing keys".to_string();
        service.create(&other, request).await.unwrap();

        let mine = service
            .list(&desk.client_principal, TicketScope::All)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine.iter().all(|t| t.client_id == desk.client_id));

        let err = service
            .list(&desk.client_principal, TicketScope::Client(other_id))
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden { .. }));

        let history = service.my_tickets(&other).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].client_id, other_id);

        assert_eq!(service.list(&desk.admin, TicketScope::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_admin_scoped_listing_checks_existence() {
        let (desk, service) = setup().await;
        let err = service
            .list(&desk.admin, TicketScope::Technician(TechnicianId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { entity: "Technician", .. }));
    }

    #[tokio::test]
    async fn test_technician_reads_only_assigned_tickets() {
        let (desk, service) = setup().await;
        let (colleague, colleague_id) = desk
            .add_technician("Cora Colleague", "cora@example.com")
            .await;
        let mine = desk.add_assigned_ticket(Status::Open).await;
        let unassigned = desk.add_ticket(Status::Open).await;

        assert_eq!(
            service.get(&desk.technician_principal, &mine.id).await.unwrap(),
            mine
        );
        let err = service.get(&colleague, &mine.id).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden { .. }));
        assert!(service.get(&colleague, &unassigned.id).await.is_err());

        let assigned = service.assigned(&desk.technician_principal).await.unwrap();
        assert_eq!(assigned, vec![mine]);
        assert!(service.assigned(&colleague).await.unwrap().is_empty());
        assert!(
            service
                .list(&colleague, TicketScope::Technician(colleague_id))
                .await
                .unwrap()
                .is_empty()
        );
        assert!(service.my_tickets(&colleague).await.is_err());
    }

    #[tokio::test]
    async fn test_status_walk_and_capacity() {
        let (desk, service) = setup().await;
        let ticket = desk.add_assigned_ticket(Status::Open).await;
        let tech = &desk.technician_principal;

        let err = service
            .update_status(tech, &ticket.id, Status::Resolved)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("can only change to \"in_progress\""));

        for status in [Status::InProgress, Status::Resolved, Status::Closed] {
            let updated = service.update_status(tech, &ticket.id, status).await.unwrap();
            assert_eq!(updated.status, status);
        }

        let err = service
            .update_status(tech, &ticket.id, Status::Open)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("final"));

        desk.fill_technician().await;
        let blocked = desk.add_assigned_ticket(Status::Open).await;
        let err = service
            .update_status(tech, &blocked.id, Status::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::CapacityExceeded { .. }));
        let stored = service.get(&desk.admin, &blocked.id).await.unwrap();
        assert_eq!(stored.status, Status::Open);
    }

    #[tokio::test]
    async fn test_client_cannot_change_status() {
        let (desk, service) = setup().await;
        let ticket = desk.add_ticket(Status::Open).await;

        let err = service
            .update_status(&desk.client_principal, &ticket.id, Status::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_denied_role_does_not_learn_existence() {
        let (desk, service) = setup().await;
        let err = service
            .remove(&desk.client_principal, &TicketId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden { .. }));

        let err = service.remove(&desk.admin, &TicketId::new()).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { entity: "Ticket", .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_same_technician_at_capacity() {
        let (desk, service) = setup().await;
        let tickets = desk.fill_technician().await;

        let update = TicketUpdate {
            priority: Some(Priority::Critical),
            technician_id: Some(desk.technician_id),
            ..TicketUpdate::default()
        };
        let updated = service
            .update(&desk.admin, &tickets[0].id, update)
            .await
            .unwrap();
        assert_eq!(updated.priority, Priority::Critical);

        let other = desk.add_ticket(Status::Open).await;
        let update = TicketUpdate {
            technician_id: Some(desk.technician_id),
            ..TicketUpdate::default()
        };
        let err = service.update(&desk.admin, &other.id, update).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::CapacityExceeded { .. }));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let (desk, service) = setup().await;
        let ticket = desk.add_ticket(Status::Open).await;
        let err = service
            .update(&desk.admin, &ticket.id, TicketUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_assign_and_remove() {
        let (desk, service) = setup().await;
        let ticket = desk.add_ticket(Status::Open).await;

        let err = service
            .assign_technician(&desk.technician_principal, &ticket.id, &desk.technician_id)
            .await
            .unwrap_err();
        assert!(matches!(err, HelpdeskError::Forbidden { .. }));

        let assigned = service
            .assign_technician(&desk.admin, &ticket.id, &desk.technician_id)
            .await
            .unwrap();
        assert_eq!(assigned.technician_id, Some(desk.technician_id));

        service.remove(&desk.admin, &ticket.id).await.unwrap();
        let err = service.get(&desk.admin, &ticket.id).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::NotFound { .. }));
    }
}
