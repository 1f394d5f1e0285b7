//! Command-line interface for helpdesk
//!
//! Every command except `init` and `register` acts on behalf of a registered
//! user, named with `--as <email>` or the `HELPDESK_USER` environment variable.

pub mod handlers;
pub mod output;

pub use output::OutputFormatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "helpdesk",
    version,
    about = "Technical-support ticket desk",
    long_about = "Clients file tickets, technicians work them through \
                  open → in_progress → resolved → closed, and administrators \
                  manage the directory and assignments."
)]
pub struct Cli {
    /// Email of the user to act as
    #[arg(long = "as", global = true, env = "HELPDESK_USER", value_name = "EMAIL")]
    pub acting_as: Option<String>,

    /// Data file to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Extra configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data file and its first administrator
    Init {
        #[arg(long, value_name = "EMAIL")]
        admin_email: String,

        #[arg(long, default_value = "Administrator")]
        admin_name: String,

        /// Overwrite an existing data file
        #[arg(short, long)]
        force: bool,
    },

    /// Sign up as a client
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage client profiles
    Client {
        #[command(subcommand)]
        command: ClientCommands,
    },

    /// Manage technician profiles
    Technician {
        #[command(subcommand)]
        command: TechnicianCommands,
    },

    /// Manage ticket categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Work with tickets
    Ticket {
        #[command(subcommand)]
        command: TicketCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user account
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// admin, technician or client
        #[arg(long, default_value = "client")]
        role: String,
    },

    /// List user accounts
    List,

    /// Edit a user account
    Update {
        /// Current email of the user
        user: String,

        #[arg(long)]
        name: Option<String>,

        /// New email address
        #[arg(long)]
        email: Option<String>,

        /// Inactive users cannot act on the desk
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a user account, unlinking its profiles
    Remove {
        /// Email of the user
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// Create a client profile
    Add {
        #[arg(long)]
        name: String,

        /// Contact email, unique across clients
        #[arg(long)]
        email: String,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Email of the user account to link
        #[arg(long, value_name = "EMAIL")]
        user: Option<String>,
    },

    /// Edit a client profile
    Update {
        /// Client ID
        client: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        active: Option<bool>,
    },

    /// List client profiles
    List {
        /// Only active clients
        #[arg(long)]
        active: bool,
    },

    /// Delete a client profile without tickets
    Remove {
        /// Client ID
        client: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TechnicianCommands {
    /// Create a technician profile
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        specialty: Option<String>,

        /// Email of the user account to link
        #[arg(long, value_name = "EMAIL")]
        user: Option<String>,
    },

    /// List technicians with their in-progress load
    List {
        /// Only active technicians flagged as available
        #[arg(long)]
        available: bool,
    },

    /// Edit a technician profile
    Update {
        /// Technician ID
        technician: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        specialty: Option<String>,

        #[arg(long)]
        available: Option<bool>,

        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a technician, unassigning its tickets
    Remove {
        /// Technician ID
        technician: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a category
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// List categories
    List,

    /// Edit a category
    Update {
        /// Category ID or name
        category: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Inactive categories are hidden from non-administrators
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete an unused category
    Remove {
        /// Category ID or name
        category: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TicketCommands {
    /// File a new ticket
    New {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Category ID or name
        #[arg(long)]
        category: String,

        /// low, medium, high or critical
        #[arg(long)]
        priority: Option<String>,

        /// Client ID (administrators only; clients always file for themselves)
        #[arg(long)]
        client: Option<String>,

        /// Technician ID to assign straight away
        #[arg(long)]
        technician: Option<String>,
    },

    /// List tickets visible to you
    List {
        /// Only this client's tickets
        #[arg(long, conflicts_with = "technician")]
        client: Option<String>,

        /// Only this technician's tickets
        #[arg(long)]
        technician: Option<String>,

        /// Only tickets in this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Your ticket history (clients)
    Mine,

    /// Tickets assigned to you (technicians)
    Assigned,

    /// Show a ticket
    Show {
        /// Ticket ID
        ticket: String,
    },

    /// Edit ticket fields
    Edit {
        /// Ticket ID
        ticket: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        /// Category ID or name
        #[arg(long)]
        category: Option<String>,

        /// Technician ID
        #[arg(long)]
        technician: Option<String>,
    },

    /// Move a ticket to the next status
    Status {
        /// Ticket ID
        ticket: String,

        /// open, in_progress, resolved or closed
        status: String,
    },

    /// Assign a technician
    Assign {
        /// Ticket ID
        ticket: String,

        /// Technician ID
        technician: String,
    },

    /// Delete a ticket
    Delete {
        /// Ticket ID
        ticket: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "helpdesk",
            "ticket",
            "status",
            "5f0c6c4e-8f0e-4a8e-9a53-0d6f0f0f0f0f",
            "in_progress",
            "--as",
            "tech@example.com",
            "--json",
        ]);
        assert_eq!(cli.acting_as.as_deref(), Some("tech@example.com"));
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Ticket {
                command: TicketCommands::Status { .. }
            }
        ));
    }
}
