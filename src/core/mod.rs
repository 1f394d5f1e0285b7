//! Core data model: identifiers, lifecycle enums, records and principals.

mod builders;
mod directory;
mod ids;
mod principal;
mod status;
mod ticket;
pub mod validation;

pub use builders::TicketBuilder;
pub use directory::{Category, Client, Technician, User};
pub use ids::{CategoryId, ClientId, TechnicianId, TicketId, UserId};
pub use principal::{Action, Principal, Role};
pub use status::{Priority, STATUS_ORDER, Status};
pub use ticket::{Ticket, TicketScope};
