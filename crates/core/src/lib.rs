//! `fleetdesk-core`: shared building blocks for the back office.
//!
//! This crate holds **pure** primitives (no HTTP, no storage).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{RecordId, UserId};
