// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::auth::SessionIssuer;
use crate::config::{AppConfig, AuthSettings};
use crate::storage::LootboxDatabase;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<LootboxDatabase>,
    pub sessions: Arc<SessionIssuer>,
    pub auth: Arc<AuthSettings>,
    /// Balance credited to accounts created on first sign-in
    pub initial_balance: Decimal,
}

impl AppState {
    pub fn new(db: LootboxDatabase, auth: AuthSettings, initial_balance: Decimal) -> Self {
        Self {
            db: Arc::new(db),
            sessions: Arc::new(SessionIssuer::new(&auth)),
            auth: Arc::new(auth),
            initial_balance,
        }
    }

    pub fn from_config(db: LootboxDatabase, config: &AppConfig) -> Self {
        Self::new(db, config.auth.clone(), config.initial_balance)
    }
}
