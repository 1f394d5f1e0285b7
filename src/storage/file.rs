use super::memory::{MemoryStore, Tables};
use super::repository::{DirectoryStore, IdentityResolver, RecordStore};
use crate::core::{
    Category, CategoryId, Client, ClientId, Technician, TechnicianId, Ticket, TicketId,
    TicketScope, User, UserId,
};
use crate::error::{HelpdeskError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Record store persisted as a single YAML snapshot
///
/// Reads are served from memory. A mutation is applied to a copy of the
/// records, written to a sibling temporary file and renamed over the data
/// file; only then does the in-memory copy change. A failed write leaves both
/// the file and the served records as they were.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    inner: MemoryStore,
    commit_lock: Mutex<()>,
}

impl FileStorage {
    /// Open an existing data file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(HelpdeskError::StoreNotInitialized { path });
        }

        let content = fs::read_to_string(&path)?;
        let tables: Tables = if content.trim().is_empty() {
            Tables::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        debug!(
            path = %path.display(),
            tickets = tables.tickets.len(),
            "Loaded helpdesk data"
        );

        Ok(Self::with_tables(path, tables))
    }

    /// Create a new, empty data file
    pub fn init(path: impl AsRef<Path>, force: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() && !force {
            return Err(HelpdeskError::StoreAlreadyInitialized { path });
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tables = Tables::default();
        let staging = staging_path(&path);
        fs::write(&staging, serde_yaml::to_string(&tables)?)?;
        fs::rename(&staging, &path)?;
        Ok(Self::with_tables(path, tables))
    }

    fn with_tables(path: PathBuf, tables: Tables) -> Self {
        Self {
            path,
            inner: MemoryStore::from_tables(tables),
            commit_lock: Mutex::new(()),
        }
    }

    /// Apply a mutation, persist the result, then publish it to readers
    async fn commit<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Tables) + Send,
    {
        let _guard = self.commit_lock.lock().await;
        let mut tables = self.inner.snapshot().await;
        apply(&mut tables);
        self.write_snapshot(&tables).await?;
        self.inner.replace(tables).await;
        Ok(())
    }

    async fn write_snapshot(&self, tables: &Tables) -> Result<()> {
        let content = serde_yaml::to_string(tables)?;
        let staging = staging_path(&self.path);
        tokio::fs::write(&staging, content).await?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                warn!(path = %staging.display(), error = %cleanup, "Could not remove staging file");
            }
            return Err(e.into());
        }
        debug!(path = %self.path.display(), "Persisted helpdesk data");
        Ok(())
    }
}

/// `desk.yaml` is staged as `desk.yaml.tmp` in the same directory, so the
/// final rename never crosses filesystems
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("helpdesk"), ToOwned::to_owned);
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl RecordStore for FileStorage {
    async fn ticket(&self, id: &TicketId) -> Result<Option<Ticket>> {
        self.inner.ticket(id).await
    }

    async fn tickets(&self, scope: &TicketScope) -> Result<Vec<Ticket>> {
        self.inner.tickets(scope).await
    }

    async fn technician(&self, id: &TechnicianId) -> Result<Option<Technician>> {
        self.inner.technician(id).await
    }

    async fn technician_tickets(&self, id: &TechnicianId) -> Result<Vec<Ticket>> {
        self.inner.technician_tickets(id).await
    }

    async fn client(&self, id: &ClientId) -> Result<Option<Client>> {
        self.inner.client(id).await
    }

    async fn category(&self, id: &CategoryId) -> Result<Option<Category>> {
        self.inner.category(id).await
    }

    async fn save_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.commit(|tables| tables.put_ticket(ticket)).await
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<()> {
        self.commit(|tables| tables.remove_ticket(id)).await
    }
}

#[async_trait]
impl IdentityResolver for FileStorage {
    async fn user(&self, id: &UserId) -> Result<Option<User>> {
        self.inner.user(id).await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.inner.user_by_email(email).await
    }

    async fn client_for_user(&self, user_id: &UserId) -> Result<Option<ClientId>> {
        self.inner.client_for_user(user_id).await
    }

    async fn technician_for_user(&self, user_id: &UserId) -> Result<Option<TechnicianId>> {
        self.inner.technician_for_user(user_id).await
    }
}

#[async_trait]
impl DirectoryStore for FileStorage {
    async fn save_user(&self, user: &User) -> Result<()> {
        self.commit(|tables| tables.put_user(user)).await
    }

    async fn users(&self) -> Result<Vec<User>> {
        self.inner.users().await
    }

    async fn delete_user(&self, id: &UserId) -> Result<()> {
        self.commit(|tables| tables.remove_user(id)).await
    }

    async fn save_registration(&self, user: &User, client: &Client) -> Result<()> {
        self.commit(|tables| {
            tables.put_user(user);
            tables.put_client(client);
        })
        .await
    }

    async fn save_client(&self, client: &Client) -> Result<()> {
        self.commit(|tables| tables.put_client(client)).await
    }

    async fn clients(&self) -> Result<Vec<Client>> {
        self.inner.clients().await
    }

    async fn client_by_email(&self, email: &str) -> Result<Option<Client>> {
        self.inner.client_by_email(email).await
    }

    async fn client_by_phone(&self, phone: &str) -> Result<Option<Client>> {
        self.inner.client_by_phone(phone).await
    }

    async fn delete_client(&self, id: &ClientId) -> Result<()> {
        self.commit(|tables| tables.remove_client(id)).await
    }

    async fn save_technician(&self, technician: &Technician) -> Result<()> {
        self.commit(|tables| tables.put_technician(technician)).await
    }

    async fn technicians(&self) -> Result<Vec<Technician>> {
        self.inner.technicians().await
    }

    async fn delete_technician(&self, id: &TechnicianId) -> Result<()> {
        self.commit(|tables| tables.remove_technician(id)).await
    }

    async fn save_category(&self, category: &Category) -> Result<()> {
        self.commit(|tables| tables.put_category(category)).await
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        self.inner.categories().await
    }

    async fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.inner.category_by_name(name).await
    }

    async fn delete_category(&self, id: &CategoryId) -> Result<()> {
        self.commit(|tables| tables.remove_category(id)).await
    }
}
