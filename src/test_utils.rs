//! Test utilities for helpdesk
//!
//! Provides a seeded in-memory desk so lifecycle and service tests can start
//! from the same directory of users and profiles.

#![cfg(test)]

use crate::core::{
    Category, CategoryId, Client, ClientId, Principal, Priority, Role, Status, Technician,
    TechnicianId, Ticket, TicketBuilder, User,
};
use crate::lifecycle::MAX_IN_PROGRESS_TICKETS;
use crate::storage::{DirectoryStore, MemoryStore, RecordStore, Repository};
use std::sync::Arc;

/// A desk with one admin, one client and one technician, all linked to
/// user accounts, plus a single category
pub struct TestDesk {
    pub store: Arc<MemoryStore>,
    pub admin: Principal,
    pub client_principal: Principal,
    pub technician_principal: Principal,
    pub client_id: ClientId,
    pub technician_id: TechnicianId,
    pub category_id: CategoryId,
}

impl TestDesk {
    pub async fn new() -> Self {
        let store = MemoryStore::new();

        let admin = User::new("Ada Admin", "admin@example.com", Role::Admin);
        let client_user = User::new("Carla Client", "carla@example.com", Role::Client);
        let tech_user = User::new("Tomas Tech", "tomas@example.com", Role::Technician);
        for user in [&admin, &client_user, &tech_user] {
            store.save_user(user).await.expect("Failed to save user");
        }

        let mut client = Client::new("Carla Client", "carla@example.com");
        client.user_id = Some(client_user.id);
        store.save_client(&client).await.expect("Failed to save client");

        let mut technician = Technician::new("Tomas Tech");
        technician.specialty = Some("Networking".to_string());
        technician.user_id = Some(tech_user.id);
        store
            .save_technician(&technician)
            .await
            .expect("Failed to save technician");

        let category = Category::new("Hardware");
        store
            .save_category(&category)
            .await
            .expect("Failed to save category");

        Self {
            store: Arc::new(store),
            admin: Principal::new(admin.id, Role::Admin),
            client_principal: Principal::new(client_user.id, Role::Client),
            technician_principal: Principal::new(tech_user.id, Role::Technician),
            client_id: client.id,
            technician_id: technician.id,
            category_id: category.id,
        }
    }

    /// The desk's store as the services consume it
    pub fn repository(&self) -> Arc<dyn Repository> {
        self.store.clone()
    }

    /// Store an unassigned ticket for the desk's client
    pub async fn add_ticket(&self, status: Status) -> Ticket {
        let ticket = create_test_ticket("Printer jammed", Priority::Medium, status)
            .into_ticket(self.client_id, self.category_id, None);
        self.save(ticket).await
    }

    /// Store a ticket assigned to the desk's technician
    pub async fn add_assigned_ticket(&self, status: Status) -> Ticket {
        let ticket = create_test_ticket("Laptop will not boot", Priority::High, status)
            .into_ticket(self.client_id, self.category_id, Some(self.technician_id));
        self.save(ticket).await
    }

    /// Bring the desk's technician to the in-progress cap
    pub async fn fill_technician(&self) -> Vec<Ticket> {
        let mut tickets = Vec::with_capacity(MAX_IN_PROGRESS_TICKETS);
        for _ in 0..MAX_IN_PROGRESS_TICKETS {
            tickets.push(self.add_assigned_ticket(Status::InProgress).await);
        }
        tickets
    }

    /// Add a second technician with its own user account
    pub async fn add_technician(&self, name: &str, email: &str) -> (Principal, TechnicianId) {
        let user = User::new(name, email, Role::Technician);
        let mut technician = Technician::new(name);
        technician.user_id = Some(user.id);
        self.store.save_user(&user).await.expect("Failed to save user");
        self.store
            .save_technician(&technician)
            .await
            .expect("Failed to save technician");
        (Principal::new(user.id, Role::Technician), technician.id)
    }

    /// Add a second client with its own user account
    pub async fn add_client(&self, name: &str, email: &str) -> (Principal, ClientId) {
        let user = User::new(name, email, Role::Client);
        let mut client = Client::new(name, email);
        client.user_id = Some(user.id);
        self.store.save_user(&user).await.expect("Failed to save user");
        self.store
            .save_client(&client)
            .await
            .expect("Failed to save client");
        (Principal::new(user.id, Role::Client), client.id)
    }

    async fn save(&self, ticket: Ticket) -> Ticket {
        self.store
            .save_ticket(&ticket)
            .await
            .expect("Failed to save ticket");
        ticket
    }
}

/// Ticket fields not yet bound to directory records
pub struct TestTicket {
    builder: TicketBuilder,
}

impl TestTicket {
    pub fn into_ticket(
        self,
        client_id: ClientId,
        category_id: CategoryId,
        technician_id: Option<TechnicianId>,
    ) -> Ticket {
        self.builder
            .client(client_id)
            .category(category_id)
            .maybe_technician(technician_id)
            .build()
    }
}

/// Create a test ticket with default values
pub fn create_test_ticket(title: &str, priority: Priority, status: Status) -> TestTicket {
    TestTicket {
        builder: TicketBuilder::new()
            .title(title)
            .description(format!("Description for {title}"))
            .priority(priority)
            .status(status),
    }
}
