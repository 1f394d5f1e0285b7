use crate::config::Config;
use crate::core::{CategoryId, Principal, Priority, UserId};
use crate::error::{HelpdeskError, Result};
use crate::service::{DirectoryService, TicketService};
use crate::storage::{FileStorage, IdentityResolver, Repository};
use std::path::Path;
use std::sync::Arc;

/// Common context for all handler operations
pub struct HandlerContext {
    pub storage: Arc<FileStorage>,
    pub tickets: TicketService,
    pub directory: DirectoryService,
}

impl HandlerContext {
    /// Open an existing data file
    pub fn open(data_file: &Path, config: &Config) -> Result<Self> {
        let storage = Arc::new(FileStorage::open(data_file)?);
        Ok(Self::with_storage(storage, config))
    }

    #[must_use]
    pub fn with_storage(storage: Arc<FileStorage>, config: &Config) -> Self {
        let repository: Arc<dyn Repository> = storage.clone();
        Self {
            tickets: TicketService::new(Arc::clone(&repository))
                .with_default_priority(config.tickets.default_priority),
            directory: DirectoryService::new(repository),
            storage,
        }
    }

    /// The principal named by `--as` / `HELPDESK_USER`
    pub async fn principal(&self, acting_as: Option<&str>) -> Result<Principal> {
        let email = acting_as.ok_or_else(|| {
            HelpdeskError::Unauthenticated("No acting user given".to_string())
        })?;
        self.directory.authenticate(email).await
    }

    /// Accept either a category ID or a category name
    pub async fn resolve_category(&self, principal: &Principal, reference: &str) -> Result<CategoryId> {
        if let Ok(id) = reference.parse::<CategoryId>() {
            return Ok(id);
        }
        self.directory
            .list_categories(principal)
            .await?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(reference.trim()))
            .map(|c| c.id)
            .ok_or_else(|| HelpdeskError::not_found("Category", reference))
    }

    /// The user account registered under an email address
    pub async fn resolve_user(&self, email: &str) -> Result<UserId> {
        let email = email.trim().to_lowercase();
        self.storage
            .user_by_email(&email)
            .await?
            .map(|u| u.id)
            .ok_or_else(|| HelpdeskError::not_found("User", email))
    }
}

/// Parse an optional priority flag
pub fn parse_priority(priority: Option<&str>) -> Result<Option<Priority>> {
    priority.map(str::parse).transpose()
}
