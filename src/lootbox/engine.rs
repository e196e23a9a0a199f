// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lootbox opening.
//!
//! An open reads the lootbox and the spender, checks and debits the balance,
//! draws a prize and credits its payout, all inside one redb write
//! transaction. Write transactions are serialized, so two concurrent opens
//! against a balance that only affords one cannot both succeed, and any
//! failure after the debit leaves no trace.

use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::sampler::{select_prize, SampleError};
use crate::storage::database::{LOOTBOXES, LOOTBOX_PRIZES, PRIZES};
use crate::storage::repository::claimed::insert_claim;
use crate::storage::repository::lootboxes::load_lootbox;
use crate::storage::repository::users::{load_user, store_user};
use crate::storage::{ClaimedPrize, DbError, LootboxDatabase, Prize, PrizeType};

/// Why an open was refused.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("Lootbox {0} not found")]
    LootboxNotFound(u64),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Lootbox {0} has no prizes")]
    EmptyLootbox(u64),

    #[error("Insufficient balance: {balance} available, {price} required")]
    InsufficientBalance { balance: Decimal, price: Decimal },

    #[error("Lootbox {0} has no prize with a positive drop chance")]
    NoSelectablePrize(u64),

    #[error("Lootbox {lootbox_id} has invalid drop chances: {reason}")]
    InvalidWeights { lootbox_id: u64, reason: String },

    #[error("Prize type {0} cannot be awarded")]
    UnsupportedPrizeType(PrizeType),

    #[error("Payout of prize {prize_id} overflows the spender balance")]
    BalanceOverflow { prize_id: u64 },

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Result of a successful open.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OpenOutcome {
    pub prize: Prize,
    pub claim: ClaimedPrize,
    /// Spender balance after debit and payout
    pub balance: Decimal,
}

/// Opens lootboxes against the shared database.
pub struct LootboxEngine<'a> {
    db: &'a LootboxDatabase,
}

impl<'a> LootboxEngine<'a> {
    pub fn new(db: &'a LootboxDatabase) -> Self {
        Self { db }
    }

    /// Open `lootbox_id` on behalf of `address` using the thread RNG.
    pub fn open(&self, lootbox_id: u64, address: &str) -> Result<OpenOutcome, OpenError> {
        self.open_with(&mut rand::rng(), lootbox_id, address)
    }

    /// Open `lootbox_id` on behalf of `address`, drawing from `rng`.
    pub fn open_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        lootbox_id: u64,
        address: &str,
    ) -> Result<OpenOutcome, OpenError> {
        let outcome = self.db.write(|txn| {
            let lootbox = {
                let lootboxes = txn.open_table(LOOTBOXES).map_err(DbError::from)?;
                let prizes = txn.open_table(PRIZES).map_err(DbError::from)?;
                let links = txn.open_table(LOOTBOX_PRIZES).map_err(DbError::from)?;
                load_lootbox(&lootboxes, &prizes, &links, lootbox_id)?
            }
            .ok_or(OpenError::LootboxNotFound(lootbox_id))?;

            if lootbox.prizes.is_empty() {
                return Err(OpenError::EmptyLootbox(lootbox_id));
            }

            let mut user =
                load_user(txn, address)?.ok_or_else(|| OpenError::UserNotFound(address.into()))?;

            if user.balance < lootbox.open_price {
                return Err(OpenError::InsufficientBalance {
                    balance: user.balance,
                    price: lootbox.open_price,
                });
            }
            user.balance -= lootbox.open_price;

            let prize = select_prize(&lootbox.prizes, rng)
                .map_err(|e| match e {
                    SampleError::Empty => OpenError::EmptyLootbox(lootbox_id),
                    SampleError::NoPositiveWeight => OpenError::NoSelectablePrize(lootbox_id),
                    SampleError::InvalidWeight(reason) => {
                        OpenError::InvalidWeights { lootbox_id, reason }
                    }
                })?
                .clone();

            user.balance = match prize.prize_type {
                PrizeType::Tokens => user
                    .balance
                    .checked_add(prize.tokens_amount)
                    .ok_or(OpenError::BalanceOverflow { prize_id: prize.id })?,
                other => return Err(OpenError::UnsupportedPrizeType(other)),
            };

            store_user(txn, &user)?;
            let claim = insert_claim(txn, &prize, &user)?;

            Ok(OpenOutcome {
                prize,
                claim,
                balance: user.balance,
            })
        });

        match &outcome {
            Ok(opened) => tracing::info!(
                lootbox_id,
                address,
                prize_id = opened.prize.id,
                claim_id = opened.claim.id,
                balance = %opened.balance,
                "Lootbox opened"
            ),
            Err(OpenError::Database(e)) => {
                tracing::error!(lootbox_id, address, error = %e, "Lootbox open failed")
            }
            Err(e) => tracing::info!(lootbox_id, address, reason = %e, "Lootbox open refused"),
        }

        outcome
    }
}
