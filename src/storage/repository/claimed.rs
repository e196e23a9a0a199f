// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Append-only history of awarded prizes.

use chrono::{DateTime, Utc};
use redb::WriteTransaction;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::super::database::{
    decode, encode, next_id, DbResult, LootboxDatabase, CLAIMED_PRIZES, USER_CLAIMS,
};
use super::prizes::Prize;
use super::users::StoredUser;

/// One prize awarded to one user by one lootbox opening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClaimedPrize {
    pub id: u64,
    pub claim_date: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_address: String,
    /// Snapshot of the prize at the time it was awarded.
    pub prize: Prize,
}

/// Build a composite key for the user_claims index.
///
/// Format: `address | claim_id_be_bytes`, so a forward scan yields claims
/// oldest first.
fn make_index_key(address: &str, claim_id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(address.len() + 1 + 8);
    key.extend_from_slice(address.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&claim_id.to_be_bytes());
    key
}

fn make_prefix(address: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(address.len() + 1);
    prefix.extend_from_slice(address.as_bytes());
    prefix.push(b'|');
    prefix
}

fn make_prefix_end(address: &str) -> Vec<u8> {
    let mut end = make_prefix(address);
    end.extend_from_slice(&[0xFF; 9]);
    end
}

/// Record a claim inside an open write transaction.
pub(crate) fn insert_claim(
    txn: &WriteTransaction,
    prize: &Prize,
    user: &StoredUser,
) -> DbResult<ClaimedPrize> {
    let claim = ClaimedPrize {
        id: next_id(txn, "claimed_prizes")?,
        claim_date: Utc::now(),
        user_id: user.id,
        user_address: user.address.clone(),
        prize: prize.clone(),
    };

    let json = encode(&claim)?;
    let mut claims = txn.open_table(CLAIMED_PRIZES)?;
    claims.insert(claim.id, json.as_slice())?;

    let key = make_index_key(&user.address, claim.id);
    let mut index = txn.open_table(USER_CLAIMS)?;
    index.insert(key.as_slice(), claim.id)?;

    Ok(claim)
}

/// Repository for claimed prize history.
pub struct ClaimedPrizeRepository<'a> {
    db: &'a LootboxDatabase,
}

impl<'a> ClaimedPrizeRepository<'a> {
    pub fn new(db: &'a LootboxDatabase) -> Self {
        Self { db }
    }

    /// List every prize claimed by `address`, oldest first.
    pub fn list_for_user(&self, address: &str) -> DbResult<Vec<ClaimedPrize>> {
        let read_txn = self.db.read()?;
        let index = read_txn.open_table(USER_CLAIMS)?;
        let claims = read_txn.open_table(CLAIMED_PRIZES)?;

        let start = make_prefix(address);
        let end = make_prefix_end(address);

        let mut result = Vec::new();
        for entry in index.range(start.as_slice()..end.as_slice())? {
            let (_, claim_id) = entry?;
            if let Some(value) = claims.get(claim_id.value())? {
                result.push(decode(value.value())?);
            }
        }
        Ok(result)
    }
}
