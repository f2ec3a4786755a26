//! `RocksDB` storage implementation.
//!
//! Uses a pessimistic `TransactionDB`: `apply_delta` takes an exclusive lock on the
//! account key with `get_for_update_cf`, so concurrent deltas for one user run one at a
//! time, and every write for the delta commits together.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, MultiThreaded, Options,
    TransactionDB, TransactionDBOptions,
};

use redecor_core::{Account, CreditTransaction, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// How long a delta waits for another delta on the same account.
const LOCK_TIMEOUT_MS: i64 = 5_000;

fn db_error(err: rocksdb::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<TransactionDB<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let mut txn_opts = TransactionDBOptions::default();
        txn_opts.set_txn_lock_timeout(LOCK_TIMEOUT_MS);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = TransactionDB::open_cf_descriptors(&opts, &txn_opts, path, cf_descriptors)
            .map_err(db_error)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn read_account_sync(&self, user_id: &UserId) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS)?;

        self.db
            .get_cf(&cf, keys::account_key(user_id))
            .map_err(db_error)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn apply_delta_sync(&self, transaction: &CreditTransaction) -> Result<Account> {
        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let cf_sequences = self.cf(cf::SEQUENCES)?;
        let cf_idempotency = self.cf(cf::IDEMPOTENCY_KEYS)?;

        let user_id = &transaction.user_id;
        let account_key = keys::account_key(user_id);

        // Dropping `txn` without committing rolls everything back.
        let txn = self.db.transaction();

        // Locks the key even when the account does not exist yet.
        let mut account = txn
            .get_for_update_cf(&cf_accounts, &account_key, true)
            .map_err(db_error)?
            .map(|data| Self::deserialize::<Account>(&data))
            .transpose()?
            .unwrap_or_else(|| {
                Account::new_at(user_id.clone(), transaction.created_at)
            });

        let idempotency_key = transaction
            .idempotency_key
            .as_deref()
            .map(|key| keys::idempotency_key(user_id, key));
        if let Some(key) = &idempotency_key {
            if txn.get_cf(&cf_idempotency, key).map_err(db_error)?.is_some() {
                return Err(StoreError::DuplicateRequest {
                    idempotency_key: transaction.idempotency_key.clone().unwrap_or_default(),
                });
            }
        }

        let sequence = match txn.get_cf(&cf_sequences, &account_key).map_err(db_error)? {
            Some(value) => keys::decode_sequence(&value).ok_or_else(|| {
                StoreError::Serialization(format!("corrupt sequence for user {user_id}"))
            })?,
            None => 0,
        };

        account.apply_delta(transaction.amount, transaction.created_at);

        txn.put_cf(&cf_accounts, &account_key, Self::serialize(&account)?)
            .map_err(db_error)?;
        txn.put_cf(
            &cf_by_user,
            keys::user_transaction_key(user_id, sequence),
            Self::serialize(transaction)?,
        )
        .map_err(db_error)?;
        txn.put_cf(&cf_sequences, &account_key, (sequence + 1).to_be_bytes())
            .map_err(db_error)?;
        if let Some(key) = idempotency_key {
            txn.put_cf(&cf_idempotency, key, transaction.id.to_bytes())
                .map_err(db_error)?;
        }

        txn.commit().map_err(db_error)?;

        Ok(account)
    }

    fn list_transactions_sync(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>> {
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let prefix = keys::user_prefix(user_id);

        let mut transactions = Vec::new();
        for item in self
            .db
            .iterator_cf(&cf_by_user, IteratorMode::From(&prefix, Direction::Forward))
        {
            let (key, value) = item.map_err(db_error)?;
            if !key.starts_with(&prefix) {
                break;
            }
            transactions.push(Self::deserialize(&value)?);
        }

        // Keys sort oldest first.
        transactions.reverse();
        Ok(transactions)
    }
}

#[async_trait]
impl Store for RocksStore {
    async fn read_account(&self, user_id: &UserId) -> Result<Option<Account>> {
        self.read_account_sync(user_id)
    }

    async fn apply_delta(&self, transaction: &CreditTransaction) -> Result<Account> {
        self.apply_delta_sync(transaction)
    }

    async fn list_transactions(&self, user_id: &UserId) -> Result<Vec<CreditTransaction>> {
        self.list_transactions_sync(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redecor_core::{DeltaRequest, TransactionType};
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn tx(user_id: &UserId, amount: i64, kind: TransactionType) -> CreditTransaction {
        CreditTransaction::new(user_id.clone(), DeltaRequest::new(amount, kind))
    }

    #[tokio::test]
    async fn lazily_created_account_takes_transaction_time() {
        let (store, _dir) = create_test_store();
        let u1 = user("u1");
        let pending = tx(&u1, 10, TransactionType::Purchase);
        std::thread::sleep(std::time::Duration::from_millis(5));

        let account = store.apply_delta(&pending).await.unwrap();

        assert_eq!(account.created_at, pending.created_at);
        assert!(account.updated_at >= account.created_at);
    }

    #[tokio::test]
    async fn deltas_update_account_and_history() {
        let (store, _dir) = create_test_store();
        let u1 = user("u1");

        store
            .apply_delta(&tx(&u1, 10, TransactionType::Purchase))
            .await
            .unwrap();
        let account = store
            .apply_delta(&tx(&u1, -3, TransactionType::Usage))
            .await
            .unwrap();
        assert_eq!(account.available_credits, 7);
        assert_eq!(account.lifetime_credits, 10);

        let stored = store.read_account(&u1).await.unwrap().unwrap();
        assert_eq!(stored, account);

        let amounts: Vec<i64> = store
            .list_transactions(&u1)
            .await
            .unwrap()
            .iter()
            .map(|t| t.amount)
            .collect();
        assert_eq!(amounts, vec![-3, 10]);
    }

    #[tokio::test]
    async fn overdraw_clamps_to_zero() {
        let (store, _dir) = create_test_store();
        let u1 = user("u1");

        store
            .apply_delta(&tx(&u1, 10, TransactionType::Purchase))
            .await
            .unwrap();
        let account = store
            .apply_delta(&tx(&u1, -100, TransactionType::Usage))
            .await
            .unwrap();
        assert_eq!(account.available_credits, 0);
        assert_eq!(store.list_transactions(&u1).await.unwrap()[0].amount, -100);
    }

    #[tokio::test]
    async fn duplicate_key_writes_nothing() {
        let (store, _dir) = create_test_store();
        let u1 = user("u1");
        let request =
            DeltaRequest::new(30, TransactionType::Purchase).with_idempotency_key("order:1");

        store
            .apply_delta(&CreditTransaction::new(u1.clone(), request.clone()))
            .await
            .unwrap();
        let replay = store
            .apply_delta(&CreditTransaction::new(u1.clone(), request))
            .await;

        assert!(matches!(replay, Err(StoreError::DuplicateRequest { .. })));
        let account = store.read_account(&u1).await.unwrap().unwrap();
        assert_eq!(account.available_credits, 30);
        assert_eq!(store.list_transactions(&u1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn history_is_scoped_to_user() {
        let (store, _dir) = create_test_store();
        // "a" is a byte prefix of "ab".
        let a = user("a");
        let ab = user("ab");

        store
            .apply_delta(&tx(&a, 1, TransactionType::Bonus))
            .await
            .unwrap();
        store
            .apply_delta(&tx(&ab, 2, TransactionType::Bonus))
            .await
            .unwrap();

        assert_eq!(store.list_transactions(&a).await.unwrap().len(), 1);
        assert_eq!(store.list_transactions(&ab).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let u1 = user("u1");
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store
                .apply_delta(&tx(&u1, 5, TransactionType::Bonus))
                .await
                .unwrap();
        }

        let store = RocksStore::open(dir.path()).unwrap();
        let account = store.read_account(&u1).await.unwrap().unwrap();
        assert_eq!(account.available_credits, 5);
        store
            .apply_delta(&tx(&u1, 1, TransactionType::Bonus))
            .await
            .unwrap();
        assert_eq!(store.list_transactions(&u1).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deltas_are_not_lost() {
        let (store, _dir) = create_test_store();
        let store = Arc::new(store);
        let u1 = user("u1");

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                let u1 = u1.clone();
                tokio::spawn(async move { store.apply_delta(&tx(&u1, 1, TransactionType::Bonus)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let account = store.read_account(&u1).await.unwrap().unwrap();
        assert_eq!(account.available_credits, 20);
        assert_eq!(store.list_transactions(&u1).await.unwrap().len(), 20);
    }
}
