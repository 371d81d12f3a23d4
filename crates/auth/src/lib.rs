//! `fleetdesk-auth`: who may do what, and whether a session token holds.
//!
//! This crate is intentionally decoupled from HTTP and storage: it exposes a
//! pure permission matrix and a token verifier returning verdicts.

pub mod claims;
pub mod matrix;
pub mod module;
pub mod roles;
pub mod token;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use matrix::{
    AuthzError, Capability, DEFAULT_GRANTS, Grant, PermissionExplanation, PermissionMatrix,
    authorize, has_permission, has_permission_str,
};
pub use module::{Action, Module, ParseError};
pub use roles::Role;
pub use token::{Hs256TokenIssuer, Hs256TokenVerifier, InvalidReason, TokenVerdict, TokenVerifier};
