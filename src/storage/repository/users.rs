// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Users are keyed by their verified wallet address: EIP-55 checksum form
//! for EVM wallets, raw `workchain:hex` for TON wallets.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::database::{decode, encode, DbError, DbResult, LootboxDatabase, USERS};

/// A player account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredUser {
    pub id: Uuid,
    pub address: String,
    pub name: Option<String>,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn new(address: impl Into<String>, name: Option<String>, balance: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            address: address.into(),
            name,
            balance,
            created_at: Utc::now(),
        }
    }
}

/// Load a user inside an open write transaction.
pub(crate) fn load_user(txn: &WriteTransaction, address: &str) -> DbResult<Option<StoredUser>> {
    let table = txn.open_table(USERS)?;
    let user = match table.get(address)? {
        Some(value) => Some(decode(value.value())?),
        None => None,
    };
    Ok(user)
}

/// Persist a user inside an open write transaction.
pub(crate) fn store_user(txn: &WriteTransaction, user: &StoredUser) -> DbResult<()> {
    let json = encode(user)?;
    let mut table = txn.open_table(USERS)?;
    table.insert(user.address.as_str(), json.as_slice())?;
    Ok(())
}

/// Repository for user accounts.
pub struct UserRepository<'a> {
    db: &'a LootboxDatabase,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a LootboxDatabase) -> Self {
        Self { db }
    }

    /// Look up a user by wallet address.
    pub fn find_by_address(&self, address: &str) -> DbResult<Option<StoredUser>> {
        let read_txn = self.db.read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(address)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a user by wallet address, failing if absent.
    pub fn get(&self, address: &str) -> DbResult<StoredUser> {
        self.find_by_address(address)?
            .ok_or_else(|| DbError::NotFound(format!("User {address}")))
    }

    /// Create a new user.
    ///
    /// # Returns
    /// - `Err(DbError::AlreadyExists)` if the address is already registered
    pub fn create(&self, user: &StoredUser) -> DbResult<()> {
        self.db.write(|txn| {
            if load_user(txn, &user.address)?.is_some() {
                return Err(DbError::AlreadyExists(format!("User {}", user.address)));
            }
            store_user(txn, user)
        })
    }

    /// Return the user for `address`, creating it with `initial_balance` if
    /// this is the first sign-in. The lookup and insert share one write
    /// transaction so concurrent first sign-ins create a single account.
    ///
    /// Returns the user and whether it was created by this call.
    pub fn get_or_create(
        &self,
        address: &str,
        name: Option<String>,
        initial_balance: Decimal,
    ) -> DbResult<(StoredUser, bool)> {
        self.db.write(|txn| {
            if let Some(existing) = load_user(txn, address)? {
                return Ok((existing, false));
            }
            let user = StoredUser::new(address, name, initial_balance);
            store_user(txn, &user)?;
            Ok((user, true))
        })
    }
}
