//! Command handlers
//!
//! Each handler takes an opened [`HandlerContext`], the acting principal and
//! an [`OutputFormatter`](crate::cli::OutputFormatter), and renders its result
//! as text or JSON.

mod common;
mod directory;
mod init;
mod ticket;

pub use common::{HandlerContext, parse_priority};
pub use directory::{
    handle_category_command, handle_client_command, handle_register, handle_technician_command,
    handle_user_command,
};
pub use init::handle_init;
pub use ticket::handle_ticket_command;
