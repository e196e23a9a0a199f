// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Wallet sign-in and session handling for the lootbox API.
//!
//! ## Auth Flow
//!
//! 1. Client fetches a challenge payload from `GET /auth/payload`
//! 2. Wallet proves control of its address:
//!    - EVM: `personal_sign` over the challenge message ([`evm`])
//!    - TON: TON-Connect `ton_proof` embedding the payload ([`ton`])
//! 3. Server verifies the proof, consumes the payload nonce, creates the
//!    account on first sign-in and issues a session token ([`session`])
//! 4. Client sends `Authorization: Bearer <token>` on every request; the
//!    [`Auth`] extractor validates it and resolves the caller's [`Role`]
//!
//! ## Security
//!
//! - Payload nonces are single use
//! - Session and payload tokens share the HS256 secret but are not
//!   interchangeable
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod evm;
pub mod extractor;
pub mod roles;
pub mod session;
pub mod ton;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use roles::Role;
pub use session::{PayloadClaims, SessionIssuer, SignedPayload};
pub use ton::{TonProof, TonVerifier};

/// Canonical form of a wallet address.
///
/// EVM addresses are EIP-55 checksummed; anything else (TON raw addresses)
/// is only trimmed.
pub fn normalize_address(raw: &str) -> String {
    evm::checksum_address(raw).unwrap_or_else(|| raw.trim().to_string())
}
