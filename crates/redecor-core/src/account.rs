//! Account and balance types.
//!
//! An account is created lazily by the first mutation for a user. Until then the
//! user's balance is the zero view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// The balance view returned to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Spendable credits. Never negative.
    pub available_credits: i64,

    /// Sum of every positive delta ever applied. Never decreases.
    pub lifetime_credits: i64,
}

impl Balance {
    /// The balance of a user who has no account yet.
    pub const ZERO: Self = Self {
        available_credits: 0,
        lifetime_credits: 0,
    };

    /// Apply a signed delta.
    ///
    /// Debits that would take the spendable balance below zero are clamped at zero.
    /// Only positive deltas count towards the lifetime total.
    #[must_use]
    pub fn apply(self, amount: i64) -> Self {
        Self {
            available_credits: self.available_credits.saturating_add(amount).max(0),
            lifetime_credits: self.lifetime_credits.saturating_add(amount.max(0)),
        }
    }

    /// Check whether the spendable balance covers `cost`.
    #[must_use]
    pub const fn has_sufficient_credits(&self, cost: i64) -> bool {
        self.available_credits >= cost
    }
}

/// A user's credit account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The user ID (from the identity provider).
    pub user_id: UserId,

    /// Spendable credits.
    pub available_credits: i64,

    /// Lifetime credits received.
    pub lifetime_credits: i64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with zero balance.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self::new_at(user_id, Utc::now())
    }

    /// Create a zero-balance account created at `now`.
    #[must_use]
    pub fn new_at(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            available_credits: 0,
            lifetime_credits: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The balance view of this account.
    #[must_use]
    pub const fn balance(&self) -> Balance {
        Balance {
            available_credits: self.available_credits,
            lifetime_credits: self.lifetime_credits,
        }
    }

    /// Apply a signed delta, stamping `updated_at` with `now`.
    pub fn apply_delta(&mut self, amount: i64, now: DateTime<Utc>) {
        let next = self.balance().apply(amount);
        self.available_credits = next.available_credits;
        self.lifetime_credits = next.lifetime_credits;
        self.updated_at = now;
    }
}
