// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Nonce Janitor
//!
//! Background task that drops consumed challenge nonces once their payload
//! token can no longer validate. Without it the `consumed_nonces` table grows
//! with every sign-in.
//!
//! ## Shutdown
//!
//! Stops when its `tokio_util::sync::CancellationToken` is cancelled, which
//! `main` does on Ctrl-C / SIGTERM alongside axum's graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::storage::{LootboxDatabase, NonceRepository};

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Periodically prunes expired payload nonces.
pub struct NonceJanitor {
    db: Arc<LootboxDatabase>,
    sweep_interval: Duration,
}

impl NonceJanitor {
    pub fn new(db: Arc<LootboxDatabase>) -> Self {
        Self {
            db,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(janitor.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.sweep_interval.as_secs(),
            "Nonce janitor starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.sweep_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Nonce janitor shutting down");
                    return;
                }
            }

            self.sweep();
        }
    }

    /// Remove every nonce that expired before now. Returns the count removed.
    pub fn sweep(&self) -> usize {
        let now = Utc::now().timestamp().max(0) as u64;
        match NonceRepository::new(&self.db).prune_expired(now) {
            Ok(0) => {
                debug!("Nonce janitor: nothing to prune");
                0
            }
            Ok(removed) => {
                info!(removed, "Nonce janitor: pruned expired nonces");
                removed
            }
            Err(e) => {
                warn!(error = %e, "Nonce janitor: sweep failed");
                0
            }
        }
    }
}
