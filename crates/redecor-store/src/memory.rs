//! In-memory storage implementation.
//!
//! All state sits behind one `RwLock`; holding the write lock for the whole of
//! `apply_delta` makes the account update and the transaction append a single step.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use redecor_core::{Account, CreditTransaction, UserId};

use crate::error::{Result, StoreError};
use crate::Store;

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<UserId, Account>,
    /// Append-only, in insertion order.
    transactions: Vec<CreditTransaction>,
    idempotency_keys: HashSet<(UserId, String)>,
}

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read_account(&self, user_id: &UserId) -> Result<Option<Account>> {
        Ok(self.state.read().await.accounts.get(user_id).cloned())
    }

    async fn apply_delta(&self, transaction: &CreditTransaction) -> Result<Account> {
        let mut state = self.state.write().await;

        if let Some(key) = &transaction.idempotency_key {
            if state
                .idempotency_keys
                .contains(&(transaction.user_id.clone(), key.clone()))
            {
                return Err(StoreError::DuplicateRequest {
                    idempotency_key: key.clone(),
                });
            }
        }

        let account = state
            .accounts
            .entry(transaction.user_id.clone())
            .or_insert_with(|| {
                Account::new_at(transaction.user_id.clone(), transaction.created_at)
            });
        account.apply_delta(transaction.amount, transaction.created_at);
        let account = account.clone();

        if let Some(key) = &transaction.idempotency_key {
            state
                .idempotency_keys
                .insert((transaction.user_id.clone(), key.clone()));
        }
        state.transactions.push(transaction.clone());

        Ok(account)
    }

    async fn list_transactions(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>> {
        let state = self.state.read().await;

        // Newest insertion first, then a stable sort keeps that order for equal timestamps.
        let mut transactions: Vec<_> = state
            .transactions
            .iter()
            .rev()
            .filter(|tx| &tx.user_id == user_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(transactions)
    }
}
