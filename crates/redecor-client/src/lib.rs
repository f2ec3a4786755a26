//! Redecor Client SDK.
//!
//! This crate provides a client library for backend services (payment callbacks,
//! feature backends) to interact with the redecor ledger API.
//!
//! # Example
//!
//! ```no_run
//! use redecor_client::{ApplyDeltaRequest, LedgerClient};
//! use redecor_core::{Plan, TransactionType};
//!
//! # async fn example() -> Result<(), redecor_client::ClientError> {
//! let client = LedgerClient::new("http://redecor:8080", "your-service-api-key")?;
//!
//! // A payment provider confirmed order ORDER-123 for the Pro plan.
//! let purchase = client.confirm_purchase("user-42", Plan::Pro, "ORDER-123").await?;
//! if let Some(balance) = purchase.balance {
//!     println!("New balance: {} credits", balance.available_credits);
//! }
//!
//! // Grant a goodwill bonus.
//! client
//!     .apply_delta(ApplyDeltaRequest::new("user-42", 5, TransactionType::Bonus))
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, LedgerClient};
pub use error::ClientError;
pub use types::*;
