// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lootbox repository.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    decode, encode, next_id, DbError, DbResult, LootboxDatabase, LOOTBOXES, LOOTBOX_PRIZES,
    PRIZES,
};
use super::prizes::Prize;

/// Lootbox row as persisted (prizes live in their own table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLootbox {
    pub id: u64,
    pub name: String,
    pub image_url: Option<String>,
    pub open_price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A lootbox together with its prize set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Lootbox {
    pub id: u64,
    pub name: String,
    pub image_url: Option<String>,
    pub open_price: Decimal,
    pub prizes: Vec<Prize>,
}

/// Fields required to create a lootbox.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewLootbox {
    pub name: String,
    pub open_price: Decimal,
}

/// Assemble a lootbox and its prizes from any readable view of the tables.
///
/// Shared by read snapshots and by the opening engine's write transaction.
pub(crate) fn load_lootbox<L, P, J>(
    lootboxes: &L,
    prizes: &P,
    links: &J,
    lootbox_id: u64,
) -> DbResult<Option<Lootbox>>
where
    L: ReadableTable<u64, &'static [u8]>,
    P: ReadableTable<u64, &'static [u8]>,
    J: ReadableTable<(u64, u64), ()>,
{
    let stored: StoredLootbox = match lootboxes.get(lootbox_id)? {
        Some(value) => decode(value.value())?,
        None => return Ok(None),
    };

    let mut items = Vec::new();
    for entry in links.range((lootbox_id, 0)..=(lootbox_id, u64::MAX))? {
        let (key, _) = entry?;
        let (_, prize_id) = key.value();
        match prizes.get(prize_id)? {
            Some(value) => items.push(decode(value.value())?),
            None => tracing::warn!(lootbox_id, prize_id, "Dangling lootbox prize link"),
        }
    }

    Ok(Some(Lootbox {
        id: stored.id,
        name: stored.name,
        image_url: stored.image_url,
        open_price: stored.open_price,
        prizes: items,
    }))
}

/// Insert a lootbox inside an open write transaction.
pub(crate) fn insert_lootbox(txn: &WriteTransaction, new: NewLootbox) -> DbResult<Lootbox> {
    let stored = StoredLootbox {
        id: next_id(txn, "lootboxes")?,
        name: new.name,
        image_url: None,
        open_price: new.open_price,
        created_at: Utc::now(),
    };

    let json = encode(&stored)?;
    let mut table = txn.open_table(LOOTBOXES)?;
    table.insert(stored.id, json.as_slice())?;

    Ok(Lootbox {
        id: stored.id,
        name: stored.name,
        image_url: None,
        open_price: stored.open_price,
        prizes: Vec::new(),
    })
}

/// Repository for lootbox operations.
pub struct LootboxRepository<'a> {
    db: &'a LootboxDatabase,
}

impl<'a> LootboxRepository<'a> {
    pub fn new(db: &'a LootboxDatabase) -> Self {
        Self { db }
    }

    /// Create a lootbox with no prizes.
    pub fn create(&self, new: NewLootbox) -> DbResult<Lootbox> {
        self.db.write(|txn| insert_lootbox(txn, new))
    }

    /// Find a lootbox with its prizes.
    pub fn find_by_id(&self, lootbox_id: u64) -> DbResult<Option<Lootbox>> {
        let read_txn = self.db.read()?;
        let lootboxes = read_txn.open_table(LOOTBOXES)?;
        let prizes = read_txn.open_table(PRIZES)?;
        let links = read_txn.open_table(LOOTBOX_PRIZES)?;
        load_lootbox(&lootboxes, &prizes, &links, lootbox_id)
    }

    /// Get a lootbox with its prizes, failing if absent.
    pub fn get(&self, lootbox_id: u64) -> DbResult<Lootbox> {
        self.find_by_id(lootbox_id)?
            .ok_or_else(|| DbError::NotFound(format!("Lootbox {lootbox_id}")))
    }

    /// List all lootboxes in id order, each with its prizes.
    pub fn list(&self) -> DbResult<Vec<Lootbox>> {
        let read_txn = self.db.read()?;
        let lootboxes = read_txn.open_table(LOOTBOXES)?;
        let prizes = read_txn.open_table(PRIZES)?;
        let links = read_txn.open_table(LOOTBOX_PRIZES)?;

        let mut ids = Vec::new();
        for entry in lootboxes.iter()? {
            let (key, _) = entry?;
            ids.push(key.value());
        }

        let mut result = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(lootbox) = load_lootbox(&lootboxes, &prizes, &links, id)? {
                result.push(lootbox);
            }
        }
        Ok(result)
    }

    /// Replace the image reference, the only mutable lootbox field.
    pub fn set_image_url(&self, lootbox_id: u64, image_url: Option<String>) -> DbResult<Lootbox> {
        self.db.write(|txn| {
            {
                let mut table = txn.open_table(LOOTBOXES)?;
                let existing_bytes = {
                    let existing = table
                        .get(lootbox_id)?
                        .ok_or_else(|| DbError::NotFound(format!("Lootbox {lootbox_id}")))?;
                    existing.value().to_vec()
                };

                let mut stored: StoredLootbox = decode(&existing_bytes)?;
                stored.image_url = image_url;
                let json = encode(&stored)?;
                table.insert(lootbox_id, json.as_slice())?;
            }

            let lootboxes = txn.open_table(LOOTBOXES)?;
            let prizes = txn.open_table(PRIZES)?;
            let links = txn.open_table(LOOTBOX_PRIZES)?;
            load_lootbox(&lootboxes, &prizes, &links, lootbox_id)?
                .ok_or_else(|| DbError::NotFound(format!("Lootbox {lootbox_id}")))
        })
    }
}
