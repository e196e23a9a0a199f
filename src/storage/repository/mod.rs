// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the lootbox database.
//!
//! Each repository provides CRUD operations for a specific entity type.
//! Operations that must be atomic with other writes (the lootbox opening
//! engine) use the crate-internal `load_*`/`store_*`/`insert_*` helpers inside a
//! [`LootboxDatabase::write`](super::LootboxDatabase::write) closure.

pub mod claimed;
pub mod lootboxes;
pub mod nonces;
pub mod prizes;
pub mod roles;
pub mod users;

pub use claimed::{ClaimedPrize, ClaimedPrizeRepository};
pub use lootboxes::{Lootbox, LootboxRepository, NewLootbox};
pub use nonces::NonceRepository;
pub use prizes::{NewPrize, Prize, PrizeQuality, PrizeRepository, PrizeType};
pub use roles::RoleRepository;
pub use users::{StoredUser, UserRepository};
