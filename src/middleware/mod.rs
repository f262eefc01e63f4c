//! Request middleware and extractors.
//!
//! Authentication flow:
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] validates the JWT and extracts the claims
//! 3. Handlers build an [`crate::access::Identity`] from the claims and ask
//!    the access policy for a decision

pub mod auth;
