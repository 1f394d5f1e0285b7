//! helpdesk - a technical-support ticket desk
//!
//! The core of this crate is the ticket lifecycle engine in [`lifecycle`]:
//! - a forward-only status machine (open → in progress → resolved → closed)
//! - a cap of five in-progress tickets per technician
//! - role-scoped access rules for admins, technicians and clients
//!
//! Around it sit the [`service`] layer that runs each request as
//! gate → load → decide → write, the record stores in [`storage`], and the
//! `helpdesk` command-line front end.
//!
//! # Concurrency
//!
//! Every decision reads live records and commits with a single write, but
//! nothing locks across the read and the write. Two concurrent assignments
//! to a technician holding four in-progress tickets can both succeed; the
//! store is expected to close that gap if it matters.
//!
//! # Example
//!
//! ```rust,ignore
//! use helpdesk::core::Status;
//! use helpdesk::lifecycle::transition;
//!
//! assert!(transition(Status::Open, Status::InProgress).is_ok());
//! assert!(transition(Status::Open, Status::Resolved).is_err());
//! ```

// Allow missing error documentation for internal implementations
#![allow(clippy::missing_errors_doc)]
// Allow some pedantic lints that don't improve code quality
#![allow(clippy::option_if_let_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::single_match_else)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod integration;
pub mod lifecycle;
pub mod service;
pub mod storage;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{HelpdeskError, Result};
