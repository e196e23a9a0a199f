// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prize repository.
//!
//! Prizes belong to exactly one lootbox. The `lootbox_prizes` index keeps
//! them in ascending id order, which is the order draws are weighted over.

use redb::{ReadableTable, WriteTransaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    decode, encode, next_id, DbError, DbResult, LootboxDatabase, LOOTBOXES, LOOTBOX_PRIZES,
    PRIZES,
};

/// Rarity tier shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PrizeQuality {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// What a prize pays out.
///
/// Only `Tokens` can be awarded; `NFT` exists on the wire but opening a
/// lootbox that draws one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PrizeType {
    Tokens,
    #[serde(rename = "NFT")]
    Nft,
}

impl std::fmt::Display for PrizeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrizeType::Tokens => write!(f, "Tokens"),
            PrizeType::Nft => write!(f, "NFT"),
        }
    }
}

/// A prize as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Prize {
    pub id: u64,
    pub name: String,
    pub lootbox_id: u64,
    pub quality: PrizeQuality,
    /// Relative draw weight; weights in a lootbox need not sum to 1.
    pub drop_chance: Decimal,
    #[serde(rename = "type")]
    pub prize_type: PrizeType,
    /// Balance credited when `type` is `Tokens`.
    pub tokens_amount: Decimal,
}

/// Fields required to create a prize.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewPrize {
    pub name: String,
    pub lootbox_id: u64,
    pub quality: PrizeQuality,
    pub drop_chance: Decimal,
    #[serde(rename = "type")]
    pub prize_type: PrizeType,
    #[serde(default)]
    pub tokens_amount: Decimal,
}

/// Insert a prize inside an open write transaction.
pub(crate) fn insert_prize(txn: &WriteTransaction, new: NewPrize) -> DbResult<Prize> {
    {
        let lootboxes = txn.open_table(LOOTBOXES)?;
        if lootboxes.get(new.lootbox_id)?.is_none() {
            return Err(DbError::NotFound(format!("Lootbox {}", new.lootbox_id)));
        }
    }

    let prize = Prize {
        id: next_id(txn, "prizes")?,
        name: new.name,
        lootbox_id: new.lootbox_id,
        quality: new.quality,
        drop_chance: new.drop_chance,
        prize_type: new.prize_type,
        tokens_amount: new.tokens_amount,
    };

    let json = encode(&prize)?;
    let mut prizes = txn.open_table(PRIZES)?;
    prizes.insert(prize.id, json.as_slice())?;
    let mut links = txn.open_table(LOOTBOX_PRIZES)?;
    links.insert((prize.lootbox_id, prize.id), ())?;

    Ok(prize)
}

/// Repository for prize operations.
pub struct PrizeRepository<'a> {
    db: &'a LootboxDatabase,
}

impl<'a> PrizeRepository<'a> {
    pub fn new(db: &'a LootboxDatabase) -> Self {
        Self { db }
    }

    /// Create a prize attached to an existing lootbox.
    ///
    /// # Returns
    /// - `Err(DbError::NotFound)` if the lootbox does not exist
    pub fn create(&self, new: NewPrize) -> DbResult<Prize> {
        self.db.write(|txn| insert_prize(txn, new))
    }

    /// Get a single prize by id.
    pub fn get(&self, prize_id: u64) -> DbResult<Prize> {
        let read_txn = self.db.read()?;
        let table = read_txn.open_table(PRIZES)?;
        match table.get(prize_id)? {
            Some(value) => decode(value.value()),
            None => Err(DbError::NotFound(format!("Prize {prize_id}"))),
        }
    }

    /// List every prize across all lootboxes (admin view).
    pub fn list(&self) -> DbResult<Vec<Prize>> {
        let read_txn = self.db.read()?;
        let table = read_txn.open_table(PRIZES)?;
        let mut prizes = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            prizes.push(decode(value.value())?);
        }
        Ok(prizes)
    }
}
