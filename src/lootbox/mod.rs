// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Lootbox Module
//!
//! - [`engine`]: atomic check, debit, draw and payout for one open
//! - [`sampler`]: weighted prize selection
//! - [`fixtures`]: the reference Basic/Premium lootbox set

pub mod engine;
pub mod fixtures;
pub mod sampler;

pub use engine::{LootboxEngine, OpenError, OpenOutcome};
pub use fixtures::seed_reference_lootboxes;
pub use sampler::{select_prize, SampleError};
