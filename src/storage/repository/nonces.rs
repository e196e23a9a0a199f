// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Single-use tracking for challenge payload nonces.

use redb::ReadableTable;

use super::super::database::{DbResult, LootboxDatabase, CONSUMED_NONCES};

/// Repository for consumed payload nonces.
pub struct NonceRepository<'a> {
    db: &'a LootboxDatabase,
}

impl<'a> NonceRepository<'a> {
    pub fn new(db: &'a LootboxDatabase) -> Self {
        Self { db }
    }

    /// Mark `nonce` as used until `expires_at` (unix seconds).
    ///
    /// Returns `false` if the nonce was already consumed.
    pub fn consume(&self, nonce: &str, expires_at: u64) -> DbResult<bool> {
        self.db.write(|txn| {
            let mut table = txn.open_table(CONSUMED_NONCES)?;
            if table.get(nonce)?.is_some() {
                return Ok(false);
            }
            table.insert(nonce, expires_at)?;
            Ok(true)
        })
    }

    /// Drop nonces whose payload has expired by `now` (unix seconds).
    ///
    /// Once a payload is past its expiry the token itself is rejected, so the
    /// record is no longer needed. Returns the number of entries removed.
    pub fn prune_expired(&self, now: u64) -> DbResult<usize> {
        self.db.write(|txn| {
            let mut table = txn.open_table(CONSUMED_NONCES)?;
            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (nonce, expires_at) = entry?;
                if expires_at.value() < now {
                    expired.push(nonce.value().to_string());
                }
            }
            for nonce in &expired {
                table.remove(nonce.as_str())?;
            }
            Ok(expired.len())
        })
    }
}
