// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role assignments keyed by wallet address.

use super::super::database::{DbResult, LootboxDatabase, ROLES};
use crate::auth::Role;

/// Repository for role assignments.
pub struct RoleRepository<'a> {
    db: &'a LootboxDatabase,
}

impl<'a> RoleRepository<'a> {
    pub fn new(db: &'a LootboxDatabase) -> Self {
        Self { db }
    }

    /// Role for `address`; addresses without an assignment are players.
    pub fn get(&self, address: &str) -> DbResult<Role> {
        let read_txn = self.db.read()?;
        let table = read_txn.open_table(ROLES)?;
        let role = match table.get(address)? {
            Some(value) => Role::parse(value.value()).unwrap_or_else(|| {
                tracing::warn!(address, role = value.value(), "Unknown stored role");
                Role::Player
            }),
            None => Role::Player,
        };
        Ok(role)
    }

    /// Assign `role` to `address`, replacing any previous assignment.
    pub fn set(&self, address: &str, role: Role) -> DbResult<()> {
        self.db.write(|txn| {
            let mut table = txn.open_table(ROLES)?;
            table.insert(address, role.as_str())?;
            Ok(())
        })
    }

    /// Grant admin to every address in `addresses`.
    pub fn seed_admins<S: AsRef<str>>(&self, addresses: &[S]) -> DbResult<()> {
        self.db.write(|txn| {
            let mut table = txn.open_table(ROLES)?;
            for address in addresses {
                table.insert(address.as_ref(), Role::Admin.as_str())?;
            }
            Ok(())
        })
    }
}
