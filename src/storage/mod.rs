// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state lives in a single redb database file under `DATA_DIR`.
//! redb is a pure-Rust embedded store with serializable write transactions,
//! which is what keeps lootbox balance updates free of double spends.
//!
//! ## Layout
//!
//! ```text
//! $DATA_DIR/
//!   lootbox.redb    # users, lootboxes, prizes, claims, roles, nonces
//! ```

pub mod database;
pub mod repository;

pub use database::{DbError, DbResult, LootboxDatabase};
pub use repository::{
    ClaimedPrize, ClaimedPrizeRepository, Lootbox, LootboxRepository, NewLootbox, NewPrize,
    NonceRepository, Prize, PrizeQuality, PrizeRepository, PrizeType, RoleRepository, StoredUser,
    UserRepository,
};
