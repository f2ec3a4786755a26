//! PostgreSQL storage implementation.
//!
//! `apply_delta` runs inside one database transaction: the transaction row is inserted
//! first (so a repeated idempotency key aborts before the balance moves), then the
//! account is upserted with the delta evaluated by the database. The upsert takes the
//! row lock, so concurrent deltas for the same user queue behind each other instead of
//! overwriting a stale read.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;

use redecor_core::{Account, CreditTransaction, TransactionId, TransactionType, UserId};

use crate::error::{Result, StoreError};
use crate::Store;

/// How long to wait for a pooled connection before failing the request.
const ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Unique constraint on `(user_id, idempotency_key)`.
const IDEMPOTENCY_CONSTRAINT: &str = "credit_transactions_idempotency";

/// Sums are taken in `NUMERIC` and capped at `i64::MAX`, matching `Balance::apply`.
const UPSERT_ACCOUNT: &str = r#"
INSERT INTO accounts (user_id, available_credits, lifetime_credits, created_at, updated_at)
VALUES ($1, GREATEST(0, $2::BIGINT), GREATEST(0, $2::BIGINT), $3, $3)
ON CONFLICT (user_id) DO UPDATE SET
    available_credits = LEAST(
        9223372036854775807,
        GREATEST(0, accounts.available_credits::NUMERIC + $2::BIGINT::NUMERIC)
    )::BIGINT,
    lifetime_credits  = LEAST(
        9223372036854775807,
        accounts.lifetime_credits::NUMERIC + GREATEST(0, $2::BIGINT)::NUMERIC
    )::BIGINT,
    updated_at        = $3
RETURNING user_id, available_credits, lifetime_credits, created_at, updated_at
"#;

const INSERT_TRANSACTION: &str = r#"
INSERT INTO credit_transactions (id, user_id, amount, "type", description, idempotency_key, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

const SELECT_ACCOUNT: &str = r"
SELECT user_id, available_credits, lifetime_credits, created_at, updated_at
FROM accounts
WHERE user_id = $1
";

const SELECT_TRANSACTIONS: &str = r#"
SELECT id, user_id, amount, "type", description, idempotency_key, created_at
FROM credit_transactions
WHERE user_id = $1
ORDER BY created_at DESC, seq DESC
"#;

const SELECT_TRANSACTIONS_PAGE: &str = r#"
SELECT id, user_id, amount, "type", description, idempotency_key, created_at
FROM credit_transactions
WHERE user_id = $1
ORDER BY created_at DESC, seq DESC
LIMIT $2 OFFSET $3
"#;

#[derive(Debug, FromRow)]
struct AccountRow {
    user_id: String,
    available_credits: i64,
    lifetime_credits: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self> {
        Ok(Self {
            user_id: UserId::new(row.user_id)
                .map_err(|e| StoreError::Serialization(e.to_string()))?,
            available_credits: row.available_credits,
            lifetime_credits: row.lifetime_credits,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: String,
    user_id: String,
    amount: i64,
    #[sqlx(rename = "type")]
    transaction_type: String,
    description: Option<String>,
    idempotency_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for CreditTransaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let serialization = |e: &dyn std::fmt::Display| StoreError::Serialization(e.to_string());
        Ok(Self {
            id: row
                .id
                .parse::<TransactionId>()
                .map_err(|e| serialization(&e))?,
            user_id: UserId::new(row.user_id).map_err(|e| serialization(&e))?,
            amount: row.amount,
            transaction_type: row
                .transaction_type
                .parse::<TransactionType>()
                .map_err(|e| serialization(&e))?,
            description: row.description,
            idempotency_key: row.idempotency_key,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL-backed storage implementation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database at `url` with a pool of up to `max_connections`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot establish a connection.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Credit ledger migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn read_account(&self, user_id: &UserId) -> Result<Option<Account>> {
        sqlx::query_as::<_, AccountRow>(SELECT_ACCOUNT)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn apply_delta(&self, transaction: &CreditTransaction) -> Result<Account> {
        let mut db_tx = self.pool.begin().await?;

        let inserted = sqlx::query(INSERT_TRANSACTION)
            .bind(transaction.id.to_string())
            .bind(transaction.user_id.as_str())
            .bind(transaction.amount)
            .bind(transaction.transaction_type.as_str())
            .bind(transaction.description.as_deref())
            .bind(transaction.idempotency_key.as_deref())
            .bind(transaction.created_at)
            .execute(&mut *db_tx)
            .await;

        if let Err(err) = inserted {
            // Dropping `db_tx` rolls back.
            if let (sqlx::Error::Database(db_err), Some(key)) =
                (&err, &transaction.idempotency_key)
            {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(IDEMPOTENCY_CONSTRAINT)
                {
                    return Err(StoreError::DuplicateRequest {
                        idempotency_key: key.clone(),
                    });
                }
            }
            return Err(err.into());
        }

        let row = sqlx::query_as::<_, AccountRow>(UPSERT_ACCOUNT)
            .bind(transaction.user_id.as_str())
            .bind(transaction.amount)
            .bind(transaction.created_at)
            .fetch_one(&mut *db_tx)
            .await?;

        db_tx.commit().await?;

        Account::try_from(row)
    }

    async fn list_transactions(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>> {
        sqlx::query_as::<_, TransactionRow>(SELECT_TRANSACTIONS)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(CreditTransaction::try_from)
            .collect()
    }

    async fn list_transactions_page(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        sqlx::query_as::<_, TransactionRow>(SELECT_TRANSACTIONS_PAGE)
            .bind(user_id.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(CreditTransaction::try_from)
            .collect()
    }
}
