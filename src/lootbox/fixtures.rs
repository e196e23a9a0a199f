// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reference lootboxes for demos and tests.

use rust_decimal::Decimal;

use crate::storage::repository::lootboxes::insert_lootbox;
use crate::storage::repository::prizes::insert_prize;
use crate::storage::{
    DbResult, Lootbox, LootboxDatabase, NewLootbox, NewPrize, PrizeQuality, PrizeType,
};

struct PrizeTemplate {
    name: &'static str,
    quality: PrizeQuality,
    drop_chance: Decimal,
    tokens: i64,
}

struct LootboxTemplate {
    name: &'static str,
    price: i64,
    prizes: Vec<PrizeTemplate>,
}

fn prize(name: &'static str, quality: PrizeQuality, per_mille: i64, tokens: i64) -> PrizeTemplate {
    PrizeTemplate {
        name,
        quality,
        drop_chance: Decimal::new(per_mille, 3),
        tokens,
    }
}

fn reference_set() -> Vec<LootboxTemplate> {
    use PrizeQuality::*;

    vec![
        LootboxTemplate {
            name: "Basic Lootbox",
            price: 5,
            prizes: vec![
                prize("Common Token", Common, 500, 10),
                prize("Uncommon Token", Uncommon, 300, 20),
                prize("Rare Token", Rare, 150, 50),
                prize("Epic Token", Epic, 40, 100),
                prize("Legendary Token", Legendary, 10, 200),
            ],
        },
        LootboxTemplate {
            name: "Premium Lootbox",
            price: 10,
            prizes: vec![
                prize("Uncommon Token", Uncommon, 400, 20),
                prize("Rare Token", Rare, 300, 50),
                prize("Epic Token", Epic, 200, 100),
                prize("Legendary Token", Legendary, 100, 200),
            ],
        },
    ]
}

/// Insert the Basic and Premium lootboxes with their token prizes.
///
/// Everything is written in one transaction. Calling it again adds another
/// copy of the set.
pub fn seed_reference_lootboxes(db: &LootboxDatabase) -> DbResult<Vec<Lootbox>> {
    let seeded = db.write(|txn| -> DbResult<_> {
        let mut created = Vec::new();
        for entry in reference_set() {
            let mut lootbox = insert_lootbox(
                txn,
                NewLootbox {
                    name: entry.name.to_string(),
                    open_price: Decimal::from(entry.price),
                },
            )?;
            for prize in entry.prizes {
                let prize = insert_prize(
                    txn,
                    NewPrize {
                        name: prize.name.to_string(),
                        lootbox_id: lootbox.id,
                        quality: prize.quality,
                        drop_chance: prize.drop_chance,
                        prize_type: PrizeType::Tokens,
                        tokens_amount: Decimal::from(prize.tokens),
                    },
                )?;
                lootbox.prizes.push(prize);
            }
            created.push(lootbox);
        }
        Ok(created)
    })?;

    tracing::info!(count = seeded.len(), "Seeded reference lootboxes");
    Ok(seeded)
}
