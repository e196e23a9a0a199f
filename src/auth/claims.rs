// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated caller representation.

use serde::Serialize;
use utoipa::ToSchema;

use super::roles::Role;
use super::session::SessionClaims;

/// Authenticated caller extracted from a valid session token.
///
/// This is what handlers receive after successful authentication.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Wallet address the session was issued for
    pub address: String,

    /// Role looked up for the address at request time
    pub role: Role,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: SessionClaims, role: Role) -> Self {
        Self {
            address: claims.wallet_address,
            role,
            expires_at: claims.exp,
        }
    }

    /// Check if user has at least the specified role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }
}
