use super::repository::{DirectoryStore, IdentityResolver, RecordStore};
use crate::core::{
    Category, CategoryId, Client, ClientId, Technician, TechnicianId, Ticket, TicketId,
    TicketScope, User, UserId,
};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// All records held by a store, keyed by ID
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub users: BTreeMap<UserId, User>,
    #[serde(default)]
    pub clients: BTreeMap<ClientId, Client>,
    #[serde(default)]
    pub technicians: BTreeMap<TechnicianId, Technician>,
    #[serde(default)]
    pub categories: BTreeMap<CategoryId, Category>,
    #[serde(default)]
    pub tickets: BTreeMap<TicketId, Ticket>,
}

impl Tables {
    pub(crate) fn put_ticket(&mut self, ticket: &Ticket) {
        self.tickets.insert(ticket.id, ticket.clone());
    }

    pub(crate) fn remove_ticket(&mut self, id: &TicketId) {
        self.tickets.remove(id);
    }

    pub(crate) fn put_user(&mut self, user: &User) {
        self.users.insert(user.id, user.clone());
    }

    /// Drops a user and clears the link from any profile that pointed at it
    pub(crate) fn remove_user(&mut self, id: &UserId) {
        self.users.remove(id);
        for client in self.clients.values_mut() {
            if client.user_id.as_ref() == Some(id) {
                client.user_id = None;
            }
        }
        for technician in self.technicians.values_mut() {
            if technician.user_id.as_ref() == Some(id) {
                technician.user_id = None;
            }
        }
    }

    pub(crate) fn put_client(&mut self, client: &Client) {
        self.clients.insert(client.id, client.clone());
    }

    pub(crate) fn remove_client(&mut self, id: &ClientId) {
        self.clients.remove(id);
    }

    pub(crate) fn put_technician(&mut self, technician: &Technician) {
        self.technicians.insert(technician.id, technician.clone());
    }

    pub(crate) fn remove_technician(&mut self, id: &TechnicianId) {
        self.technicians.remove(id);
    }

    pub(crate) fn put_category(&mut self, category: &Category) {
        self.categories.insert(category.id, category.clone());
    }

    pub(crate) fn remove_category(&mut self, id: &CategoryId) {
        self.categories.remove(id);
    }
}

/// In-process record store
///
/// Each trait call takes the lock once, so individual reads and writes are
/// atomic, but nothing spans a read followed by a write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    #[must_use]
    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy of every record, for persistence
    pub async fn snapshot(&self) -> Tables {
        self.tables.read().await.clone()
    }

    /// Swap in a whole new set of records
    pub async fn replace(&self, tables: Tables) {
        *self.tables.write().await = tables;
    }
}

fn newest_first(mut tickets: Vec<Ticket>) -> Vec<Ticket> {
    tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tickets
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        Ok(self.tables.read().await.tickets.get(id).cloned())
    }

    async fn tickets(&self, scope: &TicketScope) -> Result<Vec<Ticket>> {
        let tables = self.tables.read().await;
        let tickets = tables
            .tickets
            .values()
            .filter(|t| scope.includes(t))
            .cloned()
            .collect();
        Ok(newest_first(tickets))
    }

    async fn technician(&self, id: &TechnicianId) -> Result<Option<Technician>> {
        Ok(self.tables.read().await.technicians.get(id).cloned())
    }

    async fn technician_tickets(&self, id: &TechnicianId) -> Result<Vec<Ticket>> {
        self.tickets(&TicketScope::Technician(*id)).await
    }

    async fn client(&self, id: &ClientId) -> Result<Option<Client>> {
        Ok(self.tables.read().await.clients.get(id).cloned())
    }

    async fn category(&self, id: &CategoryId) -> Result<Option<Category>> {
        Ok(self.tables.read().await.categories.get(id).cloned())
    }

    async fn save_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.tables.write().await.put_ticket(ticket);
        Ok(())
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<()> {
        self.tables.write().await.remove_ticket(id);
        Ok(())
    }
}

#[async_trait]
impl IdentityResolver for MemoryStore {
    async fn user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn client_for_user(&self, user_id: &UserId) -> Result<Option<ClientId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .values()
            .find(|c| c.user_id.as_ref() == Some(user_id))
            .map(|c| c.id))
    }

    async fn technician_for_user(&self, user_id: &UserId) -> Result<Option<TechnicianId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .technicians
            .values()
            .find(|t| t.user_id.as_ref() == Some(user_id))
            .map(|t| t.id))
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn save_user(&self, user: &User) -> Result<()> {
        self.tables.write().await.put_user(user);
        Ok(())
    }

    async fn users(&self) -> Result<Vec<User>> {
        let mut users: Vec<_> = self.tables.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn delete_user(&self, id: &UserId) -> Result<()> {
        self.tables.write().await.remove_user(id);
        Ok(())
    }

    async fn save_registration(&self, user: &User, client: &Client) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.put_user(user);
        tables.put_client(client);
        Ok(())
    }

    async fn save_client(&self, client: &Client) -> Result<()> {
        self.tables.write().await.put_client(client);
        Ok(())
    }

    async fn clients(&self) -> Result<Vec<Client>> {
        let mut clients: Vec<_> = self.tables.read().await.clients.values().cloned().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn client_by_email(&self, email: &str) -> Result<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .values()
            .find(|c| c.contact_email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn client_by_phone(&self, phone: &str) -> Result<Option<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .values()
            .find(|c| c.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn delete_client(&self, id: &ClientId) -> Result<()> {
        self.tables.write().await.remove_client(id);
        Ok(())
    }

    async fn save_technician(&self, technician: &Technician) -> Result<()> {
        self.tables.write().await.put_technician(technician);
        Ok(())
    }

    async fn technicians(&self) -> Result<Vec<Technician>> {
        let mut technicians: Vec<_> = self
            .tables
            .read()
            .await
            .technicians
            .values()
            .cloned()
            .collect();
        technicians.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(technicians)
    }

    async fn delete_technician(&self, id: &TechnicianId) -> Result<()> {
        self.tables.write().await.remove_technician(id);
        Ok(())
    }

    async fn save_category(&self, category: &Category) -> Result<()> {
        self.tables.write().await.put_category(category);
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<_> = self
            .tables
            .read()
            .await
            .categories
            .values()
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<()> {
        self.tables.write().await.remove_category(id);
        Ok(())
    }
}
