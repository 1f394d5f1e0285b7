//! Users, client and technician profiles, and categories
//!
//! Everything here is administrative except self-registration, principal
//! lookup, category listing (any role) and client listing (admins and
//! technicians).

use crate::core::{
    Category, CategoryId, Client, ClientId, Principal, Role, Technician, TechnicianId,
    TicketScope, User, UserId, validation,
};
use crate::error::{HelpdeskError, Result};
use crate::lifecycle::{MAX_IN_PROGRESS_TICKETS, has_capacity, in_progress_count};
use crate::storage::{DirectoryStore, IdentityResolver, RecordStore, Repository};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Self-service sign-up. Always yields a client.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Partial edit of a user account. The role is fixed once profiles may hang
/// off it.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub name: String,
    pub contact_email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    /// User account to link; each user holds at most one client profile
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTechnician {
    pub name: String,
    pub specialty: Option<String>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Default)]
pub struct TechnicianUpdate {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub availability: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// A technician together with its live workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicianSummary {
    #[serde(flatten)]
    pub technician: Technician,
    pub in_progress: usize,
    pub at_capacity: bool,
}

pub struct DirectoryService {
    store: Arc<dyn Repository>,
}

impl DirectoryService {
    #[must_use]
    pub fn new(store: Arc<dyn Repository>) -> Self {
        Self { store }
    }

    /// Create a client user and its linked client profile
    pub async fn register(&self, registration: Registration) -> Result<(User, Client)> {
        validation::validate_name(&registration.name)?;
        let email = validation::normalize_email(&registration.email)?;

        if self.store.user_by_email(&email).await?.is_some() {
            return Err(email_taken());
        }
        self.ensure_client_contact_free(&email, registration.phone.as_deref())
            .await?;

        let user = User::new(registration.name.trim(), email.clone(), Role::Client);
        let mut client = Client::new(registration.name.trim(), email);
        client.company = registration.company;
        client.phone = registration.phone;
        client.user_id = Some(user.id);

        self.store.save_registration(&user, &client).await?;
        info!(user = %user.id, client = %client.id, "Client registered");
        Ok((user, client))
    }

    /// Resolve the principal acting under an email address
    pub async fn authenticate(&self, email: &str) -> Result<Principal> {
        let normalized = email.trim().to_lowercase();
        let Some(user) = self.store.user_by_email(&normalized).await? else {
            warn!(email = %normalized, "Unknown user");
            return Err(HelpdeskError::Unauthenticated(format!(
                "No user is registered as '{normalized}'"
            )));
        };
        if !user.is_active {
            warn!(user = %user.id, "Inactive user attempted to act");
            return Err(HelpdeskError::Unauthenticated(format!(
                "User '{normalized}' is inactive"
            )));
        }
        debug!(user = %user.id.short(), role = %user.role, "Principal resolved");
        Ok(Principal::new(user.id, user.role))
    }

    /// Create the very first administrator. Refused once any user exists.
    pub async fn bootstrap_admin(&self, name: &str, email: &str) -> Result<User> {
        if !self.store.users().await?.is_empty() {
            return Err(HelpdeskError::Conflict(
                "The desk already has users".to_string(),
            ));
        }
        let user = self.new_user(name, email, Role::Admin).await?;
        info!(user = %user.id, "Administrator created");
        Ok(user)
    }

    pub async fn create_user(&self, principal: &Principal, new: NewUser) -> Result<User> {
        require_admin(principal, "create user")?;
        let user = self.new_user(&new.name, &new.email, new.role).await?;
        info!(user = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    async fn new_user(&self, name: &str, email: &str, role: Role) -> Result<User> {
        validation::validate_name(name)?;
        let email = validation::normalize_email(email)?;
        if self.store.user_by_email(&email).await?.is_some() {
            return Err(email_taken());
        }
        let user = User::new(name.trim(), email, role);
        self.store.save_user(&user).await?;
        Ok(user)
    }

    /// Every user account, sorted by name
    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<User>> {
        require_admin(principal, "list users")?;
        self.store.users().await
    }

    /// Rename, re-address or (de)activate a user account
    ///
    /// An administrator cannot deactivate their own account.
    pub async fn update_user(
        &self,
        principal: &Principal,
        id: &UserId,
        update: UserUpdate,
    ) -> Result<User> {
        require_admin(principal, "update user")?;
        let mut user = self.require_user(id).await?;

        if let Some(email) = &update.email {
            let email = validation::normalize_email(email)?;
            if email != user.email {
                if self.store.user_by_email(&email).await?.is_some() {
                    return Err(email_taken());
                }
                user.email = email;
            }
        }
        if let Some(name) = update.name {
            validation::validate_name(&name)?;
            user.name = name.trim().to_string();
        }
        if let Some(is_active) = update.is_active {
            if !is_active && user.id == principal.user_id {
                return Err(HelpdeskError::Conflict(
                    "You cannot deactivate your own account".to_string(),
                ));
            }
            user.is_active = is_active;
        }

        self.store.save_user(&user).await?;
        info!(user = %user.id, active = user.is_active, "User updated");
        Ok(user)
    }

    /// Delete a user account. Linked client and technician profiles stay,
    /// unlinked.
    pub async fn remove_user(&self, principal: &Principal, id: &UserId) -> Result<()> {
        require_admin(principal, "delete user")?;
        self.require_user(id).await?;
        if *id == principal.user_id {
            return Err(HelpdeskError::Conflict(
                "You cannot delete your own account".to_string(),
            ));
        }
        self.store.delete_user(id).await?;
        info!(user = %id, "User deleted");
        Ok(())
    }

    pub async fn create_client(&self, principal: &Principal, new: NewClient) -> Result<Client> {
        require_admin(principal, "create client")?;
        validation::validate_name(&new.name)?;
        let email = validation::normalize_email(&new.contact_email)?;
        self.ensure_client_contact_free(&email, new.phone.as_deref())
            .await?;

        if let Some(user_id) = &new.user_id {
            let user = self.require_user(user_id).await?;
            require_role(&user, Role::Client, "client")?;
            if self.store.client_for_user(user_id).await?.is_some() {
                return Err(HelpdeskError::Conflict(
                    "The user already has a client profile".to_string(),
                ));
            }
        }

        let mut client = Client::new(new.name.trim(), email);
        client.company = new.company;
        client.phone = new.phone;
        client.user_id = new.user_id;
        self.store.save_client(&client).await?;
        info!(client = %client.id, "Client created");
        Ok(client)
    }

    pub async fn update_client(
        &self,
        principal: &Principal,
        id: &ClientId,
        update: ClientUpdate,
    ) -> Result<Client> {
        require_admin(principal, "update client")?;
        let mut client = self
            .store
            .client(id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("Client", id))?;

        if let Some(email) = &update.contact_email {
            let email = validation::normalize_email(email)?;
            if email != client.contact_email {
                if self.store.client_by_email(&email).await?.is_some() {
                    return Err(contact_email_taken());
                }
                client.contact_email = email;
            }
        }
        if let Some(phone) = update.phone {
            if client.phone.as_deref() != Some(phone.as_str()) {
                if self.store.client_by_phone(&phone).await?.is_some() {
                    return Err(phone_taken());
                }
                client.phone = Some(phone);
            }
        }
        if let Some(name) = update.name {
            validation::validate_name(&name)?;
            client.name = name.trim().to_string();
        }
        if let Some(company) = update.company {
            client.company = Some(company);
        }
        if let Some(is_active) = update.is_active {
            client.is_active = is_active;
        }
        client.updated_at = chrono::Utc::now();

        self.store.save_client(&client).await?;
        info!(client = %client.id, "Client updated");
        Ok(client)
    }

    pub async fn list_clients(&self, principal: &Principal, active_only: bool) -> Result<Vec<Client>> {
        if principal.role == Role::Client {
            return Err(HelpdeskError::forbidden(
                "list clients",
                "Only administrators and technicians can list clients",
            ));
        }
        let mut clients = self.store.clients().await?;
        if active_only {
            clients.retain(|c| c.is_active);
        }
        Ok(clients)
    }

    /// Delete a client profile that no ticket refers to
    pub async fn remove_client(&self, principal: &Principal, id: &ClientId) -> Result<()> {
        require_admin(principal, "delete client")?;
        if self.store.client(id).await?.is_none() {
            return Err(HelpdeskError::not_found("Client", id));
        }
        let tickets = self.store.tickets(&TicketScope::Client(*id)).await?;
        if !tickets.is_empty() {
            return Err(HelpdeskError::Conflict(format!(
                "The client still has {} ticket(s)",
                tickets.len()
            )));
        }
        self.store.delete_client(id).await?;
        info!(client = %id, "Client deleted");
        Ok(())
    }

    pub async fn create_technician(
        &self,
        principal: &Principal,
        new: NewTechnician,
    ) -> Result<Technician> {
        require_admin(principal, "create technician")?;
        validation::validate_name(&new.name)?;
        if let Some(user_id) = &new.user_id {
            let user = self.require_user(user_id).await?;
            require_role(&user, Role::Technician, "technician")?;
            if self.store.technician_for_user(user_id).await?.is_some() {
                return Err(HelpdeskError::Conflict(
                    "The user already has a technician profile".to_string(),
                ));
            }
        }

        let mut technician = Technician::new(new.name.trim());
        technician.specialty = new.specialty;
        technician.user_id = new.user_id;
        self.store.save_technician(&technician).await?;
        info!(technician = %technician.id, "Technician created");
        Ok(technician)
    }

    pub async fn update_technician(
        &self,
        principal: &Principal,
        id: &TechnicianId,
        update: TechnicianUpdate,
    ) -> Result<Technician> {
        require_admin(principal, "update technician")?;
        let mut technician = self
            .store
            .technician(id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("Technician", id))?;

        if let Some(name) = update.name {
            validation::validate_name(&name)?;
            technician.name = name.trim().to_string();
        }
        if let Some(specialty) = update.specialty {
            technician.specialty = Some(specialty);
        }
        if let Some(availability) = update.availability {
            technician.availability = availability;
        }
        if let Some(is_active) = update.is_active {
            technician.is_active = is_active;
        }
        technician.updated_at = chrono::Utc::now();

        self.store.save_technician(&technician).await?;
        info!(technician = %technician.id, "Technician updated");
        Ok(technician)
    }

    /// Technicians with their in-progress load, sorted by name
    pub async fn list_technicians(
        &self,
        principal: &Principal,
        available_only: bool,
    ) -> Result<Vec<TechnicianSummary>> {
        require_admin(principal, "list technicians")?;
        let mut summaries = Vec::new();
        for technician in self.store.technicians().await? {
            if available_only && !technician.is_available() {
                continue;
            }
            let load = self.store.technician_tickets(&technician.id).await?;
            let in_progress = in_progress_count(&load);
            summaries.push(TechnicianSummary {
                technician,
                in_progress,
                at_capacity: !has_capacity(in_progress),
            });
        }
        debug!(
            count = summaries.len(),
            limit = MAX_IN_PROGRESS_TICKETS,
            "Listed technicians"
        );
        Ok(summaries)
    }

    /// Delete a technician, unassigning its tickets first. Returns how many
    /// tickets were left without a technician.
    pub async fn remove_technician(
        &self,
        principal: &Principal,
        id: &TechnicianId,
    ) -> Result<usize> {
        require_admin(principal, "delete technician")?;
        if self.store.technician(id).await?.is_none() {
            return Err(HelpdeskError::not_found("Technician", id));
        }
        let tickets = self.store.technician_tickets(id).await?;
        let unassigned = tickets.len();
        for mut ticket in tickets {
            ticket.technician_id = None;
            ticket.touch();
            self.store.save_ticket(&ticket).await?;
        }
        self.store.delete_technician(id).await?;
        info!(technician = %id, unassigned, "Technician deleted");
        Ok(unassigned)
    }

    pub async fn create_category(&self, principal: &Principal, new: NewCategory) -> Result<Category> {
        require_admin(principal, "create category")?;
        validation::validate_name(&new.name)?;
        let name = new.name.trim();
        if self.store.category_by_name(name).await?.is_some() {
            return Err(category_name_taken(name));
        }

        let mut category = Category::new(name);
        category.description = new.description;
        self.store.save_category(&category).await?;
        info!(category = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        principal: &Principal,
        id: &CategoryId,
        update: CategoryUpdate,
    ) -> Result<Category> {
        require_admin(principal, "update category")?;
        let mut category = self
            .store
            .category(id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("Category", id))?;

        if let Some(name) = &update.name {
            validation::validate_name(name)?;
            let name = name.trim();
            if let Some(existing) = self.store.category_by_name(name).await? {
                if existing.id != category.id {
                    return Err(category_name_taken(name));
                }
            }
            category.name = name.to_string();
        }
        if let Some(description) = update.description {
            category.description = Some(description);
        }
        if let Some(is_active) = update.is_active {
            category.is_active = is_active;
        }

        self.store.save_category(&category).await?;
        info!(category = %category.id, active = category.is_active, "Category updated");
        Ok(category)
    }

    /// Administrators see every category, everyone else only active ones
    pub async fn list_categories(&self, principal: &Principal) -> Result<Vec<Category>> {
        let mut categories = self.store.categories().await?;
        if !principal.is_admin() {
            categories.retain(|c| c.is_active);
        }
        Ok(categories)
    }

    /// Delete a category that no ticket refers to
    pub async fn remove_category(&self, principal: &Principal, id: &CategoryId) -> Result<()> {
        require_admin(principal, "delete category")?;
        if self.store.category(id).await?.is_none() {
            return Err(HelpdeskError::not_found("Category", id));
        }
        let in_use = self
            .store
            .tickets(&TicketScope::All)
            .await?
            .iter()
            .filter(|t| t.category_id == *id)
            .count();
        if in_use > 0 {
            return Err(HelpdeskError::Conflict(format!(
                "The category is used by {in_use} ticket(s)"
            )));
        }
        self.store.delete_category(id).await?;
        info!(category = %id, "Category deleted");
        Ok(())
    }

    async fn require_user(&self, id: &UserId) -> Result<User> {
        self.store
            .user(id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("User", id))
    }

    async fn ensure_client_contact_free(&self, email: &str, phone: Option<&str>) -> Result<()> {
        if self.store.client_by_email(email).await?.is_some() {
            return Err(contact_email_taken());
        }
        if let Some(phone) = phone {
            if self.store.client_by_phone(phone).await?.is_some() {
                return Err(phone_taken());
            }
        }
        Ok(())
    }
}

fn require_admin(principal: &Principal, action: &str) -> Result<()> {
    if principal.is_admin() {
        return Ok(());
    }
    warn!(user = %principal.user_id, role = %principal.role, action, "Administrative action refused");
    Err(HelpdeskError::forbidden(
        action,
        "Only administrators can do this",
    ))
}

/// A profile may only be linked to a user of the matching role
fn require_role(user: &User, role: Role, profile: &str) -> Result<()> {
    if user.role == role {
        return Ok(());
    }
    Err(HelpdeskError::InvalidInput(format!(
        "User '{}' has the {} role and cannot hold a {profile} profile",
        user.email, user.role
    )))
}

fn email_taken() -> HelpdeskError {
    HelpdeskError::Conflict("The email address is already registered".to_string())
}

fn category_name_taken(name: &str) -> HelpdeskError {
    HelpdeskError::Conflict(format!("A category named '{name}' already exists"))
}

fn contact_email_taken() -> HelpdeskError {
    HelpdeskError::Conflict("A client with that contact email already exists".to_string())
}

fn phone_taken() -> HelpdeskError {
    HelpdeskError::Conflict("A client with that phone number already exists".to_string())
}
