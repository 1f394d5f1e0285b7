//! Handler for the `init` command

use super::common::HandlerContext;
use crate::cli::output::OutputFormatter;
use crate::config::Config;
use crate::core::validation;
use crate::error::Result;
use crate::storage::FileStorage;
use std::path::Path;
use std::sync::Arc;

/// Create a fresh data file holding a single administrator
///
/// The administrator's name and email are validated before anything is
/// written, so a typo never leaves an empty data file behind.
pub async fn handle_init(
    data_file: &Path,
    admin_name: &str,
    admin_email: &str,
    force: bool,
    config: &Config,
    output: &OutputFormatter,
) -> Result<()> {
    validation::validate_name(admin_name)?;
    validation::normalize_email(admin_email)?;

    let storage = Arc::new(FileStorage::init(data_file, force)?);
    let ctx = HandlerContext::with_storage(storage, config);
    let admin = ctx.directory.bootstrap_admin(admin_name, admin_email).await?;

    if output.is_json() {
        output.print_json(&serde_json::json!({
            "status": "success",
            "data_file": data_file,
            "admin": admin,
        }))?;
    } else {
        output.success(&format!(
            "Initialized helpdesk data at {}",
            data_file.display()
        ));
        output.info(&format!("Administrator: {} <{}>", admin.name, admin.email));
        output.info("");
        output.info("Next steps:");
        output.info(&format!(
            "  helpdesk --as {} category add --name Hardware",
            admin.email
        ));
        output.info(&format!(
            "  helpdesk --as {} technician add --name \"Jane Doe\"",
            admin.email
        ));
    }
    Ok(())
}
