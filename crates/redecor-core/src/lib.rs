//! Core types for the redecor credit ledger.
//!
//! This crate provides the foundational types shared by the store, the HTTP service
//! and the client SDK:
//!
//! - **Identifiers**: `UserId`, `TransactionId`
//! - **Accounts**: `Account`, `Balance`
//! - **Credits**: `CreditTransaction`, `TransactionType`, `DeltaRequest`
//! - **Plans**: `Plan` (the purchasable credit packages)
//! - **Redesigns**: `RedesignRequest`, `RedesignStyle`, `GenerationModel`
//!
//! # Credit unit
//!
//! One credit pays for one room redesign. Credits are whole numbers stored as `i64`.
//! The spendable balance (`available_credits`) never goes below zero: a debit larger
//! than the balance is clamped, while the transaction log keeps the raw amount.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod credits;
pub mod error;
pub mod ids;
pub mod plans;
pub mod redesign;

pub use account::{Account, Balance};
pub use credits::{
    CreditTransaction, DeltaRequest, TransactionType, MAX_DESCRIPTION_CHARS,
    MAX_IDEMPOTENCY_KEY_BYTES,
};
pub use error::{LedgerError, Result};
pub use ids::{IdError, TransactionId, UserId, MAX_USER_ID_BYTES};
pub use plans::Plan;
pub use redesign::{
    GenerationModel, RedesignRequest, RedesignStyle, DEFAULT_GENERATION_COST_CREDITS,
};
