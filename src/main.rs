//! helpdesk - technical-support ticket desk
//!
//! This is the main entry point for the helpdesk CLI application.
//! It parses arguments, loads configuration, sets up logging and dispatches
//! to the command handlers.

use clap::Parser;
use helpdesk::cli::handlers::{
    HandlerContext, handle_category_command, handle_client_command, handle_init, handle_register,
    handle_technician_command, handle_ticket_command, handle_user_command,
};
use helpdesk::cli::{Cli, Commands, OutputFormatter};
use helpdesk::config::Config;
use helpdesk::error::{HelpdeskError, Result};
use helpdesk::service::Registration;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let formatter = OutputFormatter::new(cli.json, cli.no_color);
            handle_error(&e, &formatter);
            process::exit(1);
        },
    };

    let formatter = OutputFormatter::new(cli.json, cli.no_color || !config.output.color);
    init_logging(cli.verbose, &config);
    helpdesk::integration::init_integration();

    if let Err(e) = run(cli, &config, &formatter).await {
        handle_error(&e, &formatter);
        process::exit(1);
    }
}

/// Route `tracing` output to stderr. `RUST_LOG` wins over the configured level.
fn init_logging(verbose: bool, config: &Config) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatch to the command handler
async fn run(cli: Cli, config: &Config, formatter: &OutputFormatter) -> Result<()> {
    let data_file = cli
        .data
        .clone()
        .unwrap_or_else(|| config.storage.data_file.clone());

    match cli.command {
        Commands::Init {
            admin_email,
            admin_name,
            force,
        } => handle_init(&data_file, &admin_name, &admin_email, force, config, formatter).await,
        Commands::Register {
            name,
            email,
            company,
            phone,
        } => {
            let ctx = HandlerContext::open(&data_file, config)?;
            let registration = Registration {
                name,
                email,
                company,
                phone,
            };
            handle_register(&ctx, registration, formatter).await
        },
        command => {
            let ctx = HandlerContext::open(&data_file, config)?;
            let principal = ctx.principal(cli.acting_as.as_deref()).await?;
            match command {
                Commands::User { command } => {
                    handle_user_command(command, &ctx, &principal, formatter).await
                },
                Commands::Client { command } => {
                    handle_client_command(command, &ctx, &principal, formatter).await
                },
                Commands::Technician { command } => {
                    handle_technician_command(command, &ctx, &principal, formatter).await
                },
                Commands::Category { command } => {
                    handle_category_command(command, &ctx, &principal, formatter).await
                },
                Commands::Ticket { command } => {
                    handle_ticket_command(command, &ctx, &principal, formatter).await
                },
                Commands::Init { .. } | Commands::Register { .. } => Ok(()),
            }
        },
    }
}

/// Handle errors and display them to the user
///
/// In JSON mode a single error document is written to stdout; otherwise the
/// message and any suggestions go to stderr.
fn handle_error(error: &HelpdeskError, formatter: &OutputFormatter) {
    let suggestions = error.suggestions();

    if formatter.is_json() {
        let _ = formatter.print_json(&serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "error_type": error.kind(),
            "suggestions": suggestions,
            "recoverable": error.is_recoverable(),
            "is_config_error": error.is_config_error(),
        }));
        return;
    }

    formatter.error(&error.user_message());
    if !suggestions.is_empty() {
        eprintln!("\nSuggestions:");
        for suggestion in &suggestions {
            eprintln!("  • {suggestion}");
        }
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        eprintln!("\nDebug information:");
        eprintln!("{error:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let _cli = Cli::parse_from(["helpdesk", "init", "--admin-email", "ada@example.com"]);
        let _cli = Cli::parse_from(["helpdesk", "ticket", "list"]);
        let _cli = Cli::parse_from(["helpdesk", "--as", "ada@example.com", "category", "list"]);
    }
}
