// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Weighted prize selection.

use rand::distr::weighted::{Error as WeightError, WeightedIndex};
use rand::distr::Distribution;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;

use crate::storage::Prize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("no prizes to draw from")]
    Empty,
    #[error("no prize has a positive drop chance")]
    NoPositiveWeight,
    #[error("invalid drop chance: {0}")]
    InvalidWeight(String),
}

/// Draw one prize with probability proportional to its `drop_chance`.
///
/// Weights are used as given; they do not have to sum to one.
pub fn select_prize<'p, R: Rng + ?Sized>(
    prizes: &'p [Prize],
    rng: &mut R,
) -> Result<&'p Prize, SampleError> {
    if prizes.is_empty() {
        return Err(SampleError::Empty);
    }

    let weights = prizes
        .iter()
        .map(|prize| {
            prize
                .drop_chance
                .to_f64()
                .filter(|weight| weight.is_finite() && *weight >= 0.0)
                .ok_or_else(|| {
                    SampleError::InvalidWeight(format!("prize {}: {}", prize.id, prize.drop_chance))
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let index = WeightedIndex::new(&weights).map_err(|e| match e {
        WeightError::InsufficientNonZero => SampleError::NoPositiveWeight,
        WeightError::InvalidInput => SampleError::Empty,
        other => SampleError::InvalidWeight(other.to_string()),
    })?;

    Ok(&prizes[index.sample(rng)])
}
