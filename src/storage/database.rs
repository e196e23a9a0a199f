// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded lootbox database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: wallet address → serialized StoredUser
//! - `lootboxes`: lootbox id → serialized StoredLootbox
//! - `prizes`: prize id → serialized Prize
//! - `lootbox_prizes`: (lootbox id, prize id) → ()
//! - `claimed_prizes`: claim id → serialized ClaimedPrize
//! - `user_claims`: composite key (address|claim_id_be) → claim id
//! - `roles`: wallet address → role name
//! - `consumed_nonces`: payload nonce → expiry (unix seconds)
//! - `sequences`: entity name → last issued id
//!
//! redb admits a single writer at a time, so every closure passed to
//! [`LootboxDatabase::write`] observes and mutates a consistent snapshot.

use std::path::Path;

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

pub(crate) const LOOTBOXES: TableDefinition<u64, &[u8]> = TableDefinition::new("lootboxes");

pub(crate) const PRIZES: TableDefinition<u64, &[u8]> = TableDefinition::new("prizes");

/// Ordered association of prizes to their lootbox.
pub(crate) const LOOTBOX_PRIZES: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("lootbox_prizes");

pub(crate) const CLAIMED_PRIZES: TableDefinition<u64, &[u8]> =
    TableDefinition::new("claimed_prizes");

/// Index: `address|claim_id_be` → claim id, for per-user history scans.
pub(crate) const USER_CLAIMS: TableDefinition<&[u8], u64> = TableDefinition::new("user_claims");

pub(crate) const ROLES: TableDefinition<&str, &str> = TableDefinition::new("roles");

pub(crate) const CONSUMED_NONCES: TableDefinition<&str, u64> =
    TableDefinition::new("consumed_nonces");

pub(crate) const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Encoding Helpers
// =============================================================================

pub(crate) fn encode<T: Serialize>(value: &T) -> DbResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> DbResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Allocate the next id for `entity` inside an open write transaction.
///
/// Ids start at 1. An aborted transaction rolls its bump back.
pub(crate) fn next_id(txn: &WriteTransaction, entity: &str) -> DbResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let current = table.get(entity)?.map(|v| v.value()).unwrap_or(0);
    let next = current + 1;
    table.insert(entity, next)?;
    Ok(next)
}

// =============================================================================
// LootboxDatabase
// =============================================================================

/// Embedded ACID database holding all lootbox service state.
pub struct LootboxDatabase {
    db: Database,
}

impl LootboxDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(LOOTBOXES)?;
            let _ = write_txn.open_table(PRIZES)?;
            let _ = write_txn.open_table(LOOTBOX_PRIZES)?;
            let _ = write_txn.open_table(CLAIMED_PRIZES)?;
            let _ = write_txn.open_table(USER_CLAIMS)?;
            let _ = write_txn.open_table(ROLES)?;
            let _ = write_txn.open_table(CONSUMED_NONCES)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Begin a read-only snapshot.
    pub fn read(&self) -> DbResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    /// Run `f` inside a single write transaction.
    ///
    /// The transaction commits only when `f` returns `Ok`; any error aborts
    /// it and none of its mutations become visible.
    pub fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&WriteTransaction) -> Result<T, E>,
        E: From<DbError>,
    {
        let txn = self.db.begin_write().map_err(DbError::from)?;
        match f(&txn) {
            Ok(value) => {
                txn.commit().map_err(DbError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = txn.abort() {
                    tracing::warn!(error = %abort_err, "Failed to abort write transaction");
                }
                Err(e)
            }
        }
    }

    /// Cheap liveness probe used by the health endpoint.
    pub fn health_check(&self) -> DbResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(SEQUENCES)?;
        Ok(())
    }
}
