// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lootbox Server - Wallet-authenticated NFT lootbox backend
//!
//! Players sign in with an EVM personal-message signature or a TON-Connect
//! proof, receive a session token and spend their token balance opening
//! lootboxes whose prizes are drawn by weighted random selection.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum) and the OpenAPI document
//! - `auth` - Wallet signature verification, sessions and roles
//! - `lootbox` - Prize sampling and the atomic open operation
//! - `storage` - Embedded redb database and repositories
//! - `janitor` - Background pruning of spent challenge nonces

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod janitor;
pub mod lootbox;
pub mod models;
pub mod state;
pub mod storage;
