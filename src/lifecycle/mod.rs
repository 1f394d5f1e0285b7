//! Ticket lifecycle engine
//!
//! Four cooperating parts decide whether a ticket operation may proceed:
//!
//! - [`access`] maps a principal and an action to a [`Grant`]
//! - [`transition`] enforces the forward-only status sequence
//! - [`capacity`] caps a technician's in-progress workload
//! - [`assignment`] binds technicians to tickets under that cap
//!
//! None of them retry, and none of them write unless the whole decision
//! succeeded.

pub mod access;
pub mod assignment;
pub mod capacity;
pub mod transition;

pub use access::{AccessAuthorizer, Actor, Grant, Resource, Rule, check, rule};
pub use assignment::AssignmentCoordinator;
pub use capacity::{CapacityPolicy, MAX_IN_PROGRESS_TICKETS, has_capacity, in_progress_count};
pub use transition::{TransitionEngine, legal_transitions, transition};
