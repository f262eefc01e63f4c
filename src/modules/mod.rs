//! Feature modules. Each follows the same structure: `controller.rs` (HTTP
//! handlers), `service.rs` (queries), `model.rs` (rows and DTOs),
//! `router.rs` (route wiring).

pub mod activities;
pub mod alerts;
pub mod auth;
pub mod divisions;
pub mod homework;
