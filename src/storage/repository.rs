use crate::core::{
    Category, CategoryId, Client, ClientId, Technician, TechnicianId, Ticket, TicketId,
    TicketScope, User, UserId,
};
use crate::error::Result;
use async_trait::async_trait;

/// Record store the lifecycle engine reads from and commits to
///
/// Every call is awaited in sequence by the caller (read, decide, write);
/// implementations make no promise that two calls observe the same snapshot.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetches a ticket by ID
    async fn ticket(&self, id: &TicketId) -> Result<Option<Ticket>>;

    /// Lists tickets inside a scope, newest first
    async fn tickets(&self, scope: &TicketScope) -> Result<Vec<Ticket>>;

    /// Fetches a technician by ID
    async fn technician(&self, id: &TechnicianId) -> Result<Option<Technician>>;

    /// Tickets currently referencing a technician
    async fn technician_tickets(&self, id: &TechnicianId) -> Result<Vec<Ticket>>;

    /// Fetches a client by ID
    async fn client(&self, id: &ClientId) -> Result<Option<Client>>;

    /// Fetches a category by ID
    async fn category(&self, id: &CategoryId) -> Result<Option<Category>>;

    /// Inserts or replaces a ticket
    async fn save_ticket(&self, ticket: &Ticket) -> Result<()>;

    /// Deletes a ticket by ID
    async fn delete_ticket(&self, id: &TicketId) -> Result<()>;
}

/// Maps the identity behind a principal to its directory profiles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Fetches a user account by ID
    async fn user(&self, id: &UserId) -> Result<Option<User>>;

    /// Fetches a user account by (normalized) email
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Client profile linked to a user, if any
    async fn client_for_user(&self, user_id: &UserId) -> Result<Option<ClientId>>;

    /// Technician profile linked to a user, if any
    async fn technician_for_user(&self, user_id: &UserId) -> Result<Option<TechnicianId>>;
}

/// Administrative storage for users, clients, technicians and categories
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn save_user(&self, user: &User) -> Result<()>;

    /// Every user, sorted by name
    async fn users(&self) -> Result<Vec<User>>;

    /// Deletes a user and unlinks any client or technician profile bound to it
    async fn delete_user(&self, id: &UserId) -> Result<()>;

    /// Stores a new user and its client profile in one write
    async fn save_registration(&self, user: &User, client: &Client) -> Result<()>;

    async fn save_client(&self, client: &Client) -> Result<()>;

    async fn clients(&self) -> Result<Vec<Client>>;

    async fn client_by_email(&self, email: &str) -> Result<Option<Client>>;

    async fn client_by_phone(&self, phone: &str) -> Result<Option<Client>>;

    async fn delete_client(&self, id: &ClientId) -> Result<()>;

    async fn save_technician(&self, technician: &Technician) -> Result<()>;

    async fn technicians(&self) -> Result<Vec<Technician>>;

    async fn delete_technician(&self, id: &TechnicianId) -> Result<()>;

    async fn save_category(&self, category: &Category) -> Result<()>;

    async fn categories(&self) -> Result<Vec<Category>>;

    async fn category_by_name(&self, name: &str) -> Result<Option<Category>>;

    async fn delete_category(&self, id: &CategoryId) -> Result<()>;
}

/// Combined repository trait
pub trait Repository: RecordStore + DirectoryStore + IdentityResolver {}

/// Implementation of Repository for types that implement all three traits
impl<T> Repository for T where T: RecordStore + DirectoryStore + IdentityResolver {}
