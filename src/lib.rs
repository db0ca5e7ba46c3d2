//! The `tasknest` library crate.
//!
//! This crate contains the core business logic of the task tracking backend:
//! the authentication subsystem (password hashing, token issuance and
//! verification, the request gate), the domain models, routing configuration,
//! and error handling. It is used by the main binary (`main.rs`) to construct
//! and run the application.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
