// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies shared across the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI.
//!
//! ## Wire conventions
//!
//! - Decimals (balances, prices, drop chances) are JSON strings
//! - EVM sign-in answers in snake_case, TON sign-in in camelCase, matching
//!   what the respective wallet SDKs send and expect

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{Role, TonProof};
use crate::storage::StoredUser;

pub const TOKEN_TYPE: &str = "bearer";

// =============================================================================
// Authentication
// =============================================================================

/// Challenge payload to embed in a wallet proof.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayloadResponse {
    pub payload: String,
}

/// EVM sign-in request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EvmVerifyRequest {
    /// 65-byte `r ‖ s ‖ v` signature, hex encoded
    pub signature: String,
    /// Address the client claims to sign with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Payload from `GET /auth/payload`, if the challenge included one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

/// TON-Connect sign-in request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TonVerifyRequest {
    /// Display name stored on first sign-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Raw `workchain:hex` address
    pub address: String,
    /// Hex encoded Ed25519 public key
    pub public_key: String,
    pub proof: TonProof,
}

/// Body of `POST /auth/verify`: either wallet family.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum VerifyRequest {
    Ton(TonVerifyRequest),
    Evm(EvmVerifyRequest),
}

/// Session token for EVM sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// Session token for TON sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TonAccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// Response of `POST /auth/verify`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum VerifyResponse {
    Evm(AccessToken),
    Ton(TonAccessToken),
}

// =============================================================================
// Users
// =============================================================================

/// The signed-in account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub address: String,
    pub name: Option<String>,
    pub balance: Decimal,
    pub role: Role,
}

impl UserResponse {
    pub fn new(user: StoredUser, role: Role) -> Self {
        Self {
            id: user.id,
            address: user.address,
            name: user.name,
            balance: user.balance,
            role,
        }
    }
}

// =============================================================================
// Lootboxes
// =============================================================================

/// Lootbox to open.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpenLootboxRequest {
    pub id: u64,
}

/// New image reference for a lootbox.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetImageRequest {
    /// `None` clears the image
    pub image_url: Option<String>,
}

// =============================================================================
// Administration
// =============================================================================

/// Role to assign to an address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignRoleRequest {
    pub role: Role,
}

/// Result of a role assignment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleAssignment {
    pub address: String,
    pub role: Role,
}
