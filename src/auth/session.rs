// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session and challenge-payload tokens.
//!
//! Both are HS256 JWTs signed with the configured `JWT_SECRET`:
//!
//! - **Session tokens** carry `wallet_address` and are presented as
//!   `Authorization: Bearer <token>` on every authenticated request.
//! - **Payload tokens** carry a random `nonce` and `purpose = "ton-proof"`.
//!   Clients echo them inside a wallet proof so the server can tell the
//!   proof was produced for a challenge it issued recently.
//!
//! The claim sets are disjoint, so neither kind of token decodes as the other.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::config::AuthSettings;

/// Clock skew tolerance (60 seconds).
pub const CLOCK_SKEW_LEEWAY: u64 = 60;

/// `purpose` claim of challenge payload tokens.
pub const PAYLOAD_PURPOSE: &str = "ton-proof";

/// Claims of a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub wallet_address: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims of a challenge payload token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadClaims {
    pub purpose: String,
    pub nonce: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted challenge payload.
#[derive(Debug, Clone)]
pub struct SignedPayload {
    pub token: String,
    pub nonce: String,
    pub expires_at: i64,
}

/// Issues and validates session and payload tokens.
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl: Duration,
    payload_ttl: Duration,
}

impl SessionIssuer {
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = settings.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            session_ttl: Duration::seconds(settings.session_ttl_secs as i64),
            payload_ttl: Duration::seconds(settings.payload_ttl_secs as i64),
        }
    }

    /// Issue a session token for a verified wallet address.
    pub fn issue(&self, address: &str) -> Result<String, AuthError> {
        self.issue_at(address, Utc::now())
    }

    /// Issue a session token as if the current time were `now`.
    pub fn issue_at(&self, address: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = SessionClaims {
            wallet_address: address.to_string(),
            iat: now.timestamp(),
            exp: (now + self.session_ttl).timestamp(),
        };
        self.sign(&claims)
    }

    /// Validate a session token and return its claims.
    pub fn parse(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })?;

        if data.claims.wallet_address.is_empty() {
            return Err(AuthError::TokenInvalid);
        }
        Ok(data.claims)
    }

    /// Mint a short-lived challenge payload.
    pub fn issue_payload(&self) -> Result<SignedPayload, AuthError> {
        self.issue_payload_at(Utc::now())
    }

    /// Mint a challenge payload as if the current time were `now`.
    pub fn issue_payload_at(&self, now: DateTime<Utc>) -> Result<SignedPayload, AuthError> {
        let claims = PayloadClaims {
            purpose: PAYLOAD_PURPOSE.to_string(),
            nonce: Uuid::new_v4().simple().to_string(),
            iat: now.timestamp(),
            exp: (now + self.payload_ttl).timestamp(),
        };
        let token = self.sign(&claims)?;
        Ok(SignedPayload {
            token,
            nonce: claims.nonce,
            expires_at: claims.exp,
        })
    }

    /// Validate a payload token echoed back by a client.
    ///
    /// Any failure (bad signature, expiry, wrong token kind) is reported as
    /// [`AuthError::PayloadInvalid`].
    pub fn parse_payload(&self, token: &str) -> Result<PayloadClaims, AuthError> {
        let data = decode::<PayloadClaims>(token, &self.decoding_key, &validation())
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected proof payload");
                AuthError::PayloadInvalid
            })?;

        if data.claims.purpose != PAYLOAD_PURPOSE || data.claims.nonce.is_empty() {
            return Err(AuthError::PayloadInvalid);
        }
        Ok(data.claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token encoding failed: {e}")))
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);
    validation
}
