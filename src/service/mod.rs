//! Request handling on top of the lifecycle engine
//!
//! Services own an `Arc<dyn Repository>` and take the acting [`Principal`]
//! on every call.
//!
//! [`Principal`]: crate::core::Principal

mod directory;
mod tickets;

pub use directory::{
    CategoryUpdate, ClientUpdate, DirectoryService, NewCategory, NewClient, NewTechnician, NewUser,
    Registration, TechnicianSummary, TechnicianUpdate, UserUpdate,
};
pub use tickets::{NewTicket, TicketService, TicketUpdate};
