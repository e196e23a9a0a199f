// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Covers wallet proof verification (sign-in) and session token handling
/// (every authenticated request).
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Wallet signature did not verify or recover to the expected address
    InvalidSignature,
    /// Challenge payload is malformed, forged, expired or already used
    PayloadInvalid,
    /// TON proof timestamp is outside the freshness window
    ProofExpired,
    /// Session token has expired
    TokenExpired,
    /// Session token is malformed or its signature is invalid
    TokenInvalid,
    /// Session token names a wallet with no account
    UnknownUser,
    /// Caller lacks the role required for this action
    AccessDenied,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::PayloadInvalid => "payload_invalid",
            AuthError::ProofExpired => "proof_expired",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::UnknownUser => "unknown_user",
            AuthError::AccessDenied => "access_denied",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidSignature
            | AuthError::PayloadInvalid
            | AuthError::ProofExpired => StatusCode::BAD_REQUEST,
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidSignature => write!(f, "Invalid signature"),
            AuthError::PayloadInvalid => write!(f, "Proof payload is invalid or expired"),
            AuthError::ProofExpired => write!(f, "Proof has expired"),
            AuthError::TokenExpired => write!(f, "Token expired"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::UnknownUser => write!(f, "User not found"),
            AuthError::AccessDenied => write!(f, "Access denied"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Authentication failed with internal error");
        }
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
