//! Transactional key-value substrate over `redb`.
//!
//! One [`StorageEngine`] owns the process-wide database handle, opened
//! once at startup. Documents are JSON-encoded bytes keyed by opaque id
//! strings inside fixed collections. `redb` supplies the concurrency
//! contract the repositories rely on: at most one write transaction at a
//! time (later writers block), snapshot-isolated readers that never see
//! an uncommitted write, and atomic commit-or-discard semantics.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use thiserror::Error;

const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
const QUESTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("questions");
const SUBMISSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("submissions");

/// Fixed collection namespaces within the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// User identity records.
    Users,
    /// Question definitions.
    Questions,
    /// Questionnaire submissions.
    Submissions,
}

impl Collection {
    const ALL: [Self; 3] = [Self::Users, Self::Questions, Self::Submissions];

    fn definition(self) -> TableDefinition<'static, &'static str, &'static [u8]> {
        match self {
            Self::Users => USERS,
            Self::Questions => QUESTIONS,
            Self::Submissions => SUBMISSIONS,
        }
    }
}

/// Failures raised by the storage engine.
///
/// Adapters map these into the generic internal domain error; the
/// underlying detail is logged, never surfaced to callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The database file could not be opened or created.
    #[error("failed to open database: {0}")]
    Open(#[from] redb::DatabaseError),
    /// A transaction could not be started.
    #[error("failed to start transaction: {0}")]
    Transaction(#[from] redb::TransactionError),
    /// A collection table could not be opened.
    #[error("failed to open collection: {0}")]
    Table(#[from] redb::TableError),
    /// A get/put/delete/scan operation failed.
    #[error("storage operation failed: {0}")]
    Storage(#[from] redb::StorageError),
    /// A write transaction failed to commit.
    #[error("failed to commit transaction: {0}")]
    Commit(#[from] redb::CommitError),
    /// A stored document could not be encoded or decoded.
    #[error("document codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Read-only view within a transaction.
pub struct ReadView<'a> {
    txn: &'a redb::ReadTransaction,
}

impl ReadView<'_> {
    /// Fetch a document by key; `None` when absent.
    pub fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>, EngineError> {
        let table = self.txn.open_table(collection.definition())?;
        get_from(&table, key)
    }

    /// All entries of a collection in key order.
    pub fn scan(&self, collection: Collection) -> Result<Vec<(String, Vec<u8>)>, EngineError> {
        let table = self.txn.open_table(collection.definition())?;
        scan_from(&table)
    }
}

/// Read-write view within a write transaction.
pub struct WriteView<'a> {
    txn: &'a redb::WriteTransaction,
}

impl WriteView<'_> {
    /// Fetch a document by key; `None` when absent.
    pub fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>, EngineError> {
        let table = self.txn.open_table(collection.definition())?;
        get_from(&table, key)
    }

    /// All entries of a collection in key order.
    pub fn scan(&self, collection: Collection) -> Result<Vec<(String, Vec<u8>)>, EngineError> {
        let table = self.txn.open_table(collection.definition())?;
        scan_from(&table)
    }

    /// Insert or replace a document.
    pub fn put(&self, collection: Collection, key: &str, document: &[u8]) -> Result<(), EngineError> {
        let mut table = self.txn.open_table(collection.definition())?;
        table.insert(key, document)?;
        Ok(())
    }

    /// Remove a document; removing an absent key is a no-op.
    pub fn delete(&self, collection: Collection, key: &str) -> Result<(), EngineError> {
        let mut table = self.txn.open_table(collection.definition())?;
        table.remove(key)?;
        Ok(())
    }
}

fn get_from(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    key: &str,
) -> Result<Option<Vec<u8>>, EngineError> {
    Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
}

fn scan_from(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
) -> Result<Vec<(String, Vec<u8>)>, EngineError> {
    let mut entries = Vec::new();
    for item in table.iter()? {
        let (key, value) = item?;
        entries.push((key.value().to_owned(), value.value().to_vec()));
    }
    Ok(entries)
}

/// Process-wide transactional document store.
pub struct StorageEngine {
    db: Database,
}

impl StorageEngine {
    /// Open (or create) the database and ensure all collections exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let db = Database::create(path)?;
        let txn = db.begin_write()?;
        for collection in Collection::ALL {
            txn.open_table(collection.definition())?;
        }
        txn.commit()?;
        Ok(Self { db })
    }

    /// Run `body` inside a read transaction.
    ///
    /// Readers observe a consistent snapshot and never block behind, nor
    /// observe, an in-flight write.
    pub fn read<T, E>(&self, body: impl FnOnce(&ReadView<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<EngineError>,
    {
        let txn = self
            .db
            .begin_read()
            .map_err(EngineError::from)
            .map_err(E::from)?;
        body(&ReadView { txn: &txn })
    }

    /// Run `body` inside the single write transaction.
    ///
    /// Blocks until any other write transaction completes. Commits only
    /// when `body` returns `Ok`; any `Err` aborts the transaction and no
    /// partial writes survive.
    pub fn write<T, E>(&self, body: impl FnOnce(&WriteView<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<EngineError>,
    {
        let txn = self
            .db
            .begin_write()
            .map_err(EngineError::from)
            .map_err(E::from)?;

        match body(&WriteView { txn: &txn }) {
            Ok(value) => {
                txn.commit().map_err(EngineError::from).map_err(E::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = txn.abort() {
                    tracing::warn!(error = %abort_err, "write transaction abort failed");
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine").finish_non_exhaustive()
    }
}
