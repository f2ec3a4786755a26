//! The credit ledger.
//!
//! Every feature route reads and moves credits through [`CreditLedger`]. It validates
//! requests, builds the transaction record and hands it to the store's atomic
//! `apply_delta`. Storage failures are surfaced as `LedgerError::Storage` without retry.

use std::sync::Arc;

use redecor_core::{
    Balance, CreditTransaction, DeltaRequest, LedgerError, Result, TransactionType, UserId,
};

use crate::error::StoreError;
use crate::Store;

/// Balance tracking, delta application and history for every user.
#[derive(Clone)]
pub struct CreditLedger {
    store: Arc<dyn Store>,
}

impl std::fmt::Debug for CreditLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditLedger").finish_non_exhaustive()
    }
}

impl CreditLedger {
    /// Create a ledger over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get a user's balance.
    ///
    /// A user with no account gets [`Balance::ZERO`]; no account is created.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the store fails.
    pub async fn get_balance(&self, user_id: &UserId) -> Result<Balance> {
        let account = self.store.read_account(user_id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to read account");
            LedgerError::from(e)
        })?;

        Ok(account.map_or(Balance::ZERO, |account| account.balance()))
    }

    /// Apply a signed delta to a user's balance and record it.
    ///
    /// The account is created on first use. A debit larger than the balance is
    /// clamped at zero, while the recorded transaction keeps the requested amount.
    /// Returns the recorded transaction; call [`get_balance`](Self::get_balance) for
    /// the post-state.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` / `LedgerError::InvalidRequest` if the request
    ///   fails validation.
    /// - `LedgerError::DuplicateRequest` if the idempotency key was already applied.
    /// - `LedgerError::Storage` if the store fails. Nothing is written in that case.
    pub async fn apply_delta(
        &self,
        user_id: &UserId,
        request: DeltaRequest,
    ) -> Result<CreditTransaction> {
        request.validate()?;

        let transaction = CreditTransaction::new(user_id.clone(), request);

        match self.store.apply_delta(&transaction).await {
            Ok(account) => {
                tracing::info!(
                    user_id = %user_id,
                    transaction_id = %transaction.id,
                    amount = %transaction.amount,
                    transaction_type = %transaction.transaction_type,
                    available_credits = %account.available_credits,
                    "Credit delta applied"
                );
                Ok(transaction)
            }
            Err(StoreError::DuplicateRequest { idempotency_key }) => {
                tracing::warn!(
                    user_id = %user_id,
                    idempotency_key = %idempotency_key,
                    "Duplicate credit delta ignored"
                );
                Err(LedgerError::DuplicateRequest { idempotency_key })
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    amount = %transaction.amount,
                    error = %e,
                    "Failed to apply credit delta"
                );
                Err(e.into())
            }
        }
    }

    /// List every transaction for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the store fails.
    pub async fn list_transactions(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>> {
        Ok(self.store.list_transactions(user_id).await?)
    }

    /// List one page of a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Storage` if the store fails.
    pub async fn list_transactions_page(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>> {
        Ok(self
            .store
            .list_transactions_page(user_id, limit, offset)
            .await?)
    }

    /// Charge `cost` credits for a feature action, if the balance covers it.
    ///
    /// Reads the balance, and only when `available_credits >= cost` applies a
    /// `usage` delta of `-cost`. The check and the debit are two steps, so two
    /// concurrent spends can both pass the check; the clamp still keeps the balance
    /// from going negative.
    ///
    /// # Errors
    ///
    /// - `LedgerError::InvalidAmount` if `cost` is not positive.
    /// - `LedgerError::InsufficientCredits` if the balance is short. Nothing is written.
    /// - `LedgerError::Storage` if the store fails.
    pub async fn spend(
        &self,
        user_id: &UserId,
        cost: i64,
        description: impl Into<String>,
    ) -> Result<CreditTransaction> {
        if cost <= 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "cost must be positive, got {cost}"
            )));
        }

        let balance = self.get_balance(user_id).await?;
        if !balance.has_sufficient_credits(cost) {
            tracing::info!(
                user_id = %user_id,
                available = %balance.available_credits,
                required = %cost,
                "Insufficient credits"
            );
            return Err(LedgerError::InsufficientCredits {
                available: balance.available_credits,
                required: cost,
            });
        }

        self.apply_delta(
            user_id,
            DeltaRequest::new(-cost, TransactionType::Usage).with_description(description),
        )
        .await
    }
}
