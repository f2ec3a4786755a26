//! Redecor HTTP API Service.
//!
//! This crate provides the HTTP API over the credit ledger, including:
//!
//! - Credit balance and transaction history for the signed-in user
//! - The credit-gated room redesign endpoint
//! - The plan catalog
//! - Service-to-service ledger endpoints (deltas, purchase confirmation)
//!
//! # Authentication
//!
//! The service supports two caller identities:
//!
//! 1. **End users** - the upstream auth gateway forwards the stable user id in the
//!    `x-user-id` header
//! 2. **Service API keys** - for service-to-service requests (payment callbacks, etc.)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Catalog handlers need async for routing

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServiceConfig, StorageBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
