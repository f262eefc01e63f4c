//! Shared utilities.
//!
//! - [`errors`]: application error types and handling
//! - [`jwt`]: JWT token creation and verification
//! - [`pagination`]: request pagination utilities
//! - [`password`]: password hashing and verification

pub mod errors;
pub mod jwt;
pub mod pagination;
pub mod password;
