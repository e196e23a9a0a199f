// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet sign-in endpoints.
//!
//! `GET /auth/payload` hands out a single-use challenge; `POST /auth/verify`
//! accepts an EVM signature or a TON-Connect proof, creates the account on
//! first sign-in and returns a session token.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    auth::{evm, session::CLOCK_SKEW_LEEWAY, AuthError, PayloadClaims, TonVerifier},
    error::ApiError,
    models::{
        AccessToken, EvmVerifyRequest, PayloadResponse, TonAccessToken, TonVerifyRequest,
        VerifyRequest, VerifyResponse, TOKEN_TYPE,
    },
    state::AppState,
    storage::{NonceRepository, UserRepository},
};

/// Issue a challenge payload.
///
/// TON wallets embed it in `ton_proof`; EVM wallets may append it to the
/// signed message as `"\n\nNonce: <payload>"`.
#[utoipa::path(
    get,
    path = "/auth/payload",
    tag = "Auth",
    responses(
        (status = 200, description = "Challenge payload", body = PayloadResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn issue_payload(
    State(state): State<AppState>,
) -> Result<Json<PayloadResponse>, ApiError> {
    let payload = state.sessions.issue_payload()?;
    Ok(Json(PayloadResponse {
        payload: payload.token,
    }))
}

/// Verify a wallet proof and start a session.
#[utoipa::path(
    post,
    path = "/auth/verify",
    tag = "Auth",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Session issued", body = VerifyResponse),
        (status = 400, description = "Invalid signature, payload or proof"),
        (status = 422, description = "Malformed request body")
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let response = match request {
        VerifyRequest::Evm(request) => VerifyResponse::Evm(verify_evm(&state, request)?),
        VerifyRequest::Ton(request) => VerifyResponse::Ton(verify_ton(&state, request)?),
    };
    Ok(Json(response))
}

fn verify_evm(state: &AppState, request: EvmVerifyRequest) -> Result<AccessToken, ApiError> {
    let payload = match request.payload.as_deref() {
        Some(token) => Some(state.sessions.parse_payload(token)?),
        None if state.auth.evm_require_payload => return Err(AuthError::PayloadInvalid.into()),
        None => None,
    };
    if state.auth.evm_require_payload && request.address.is_none() {
        return Err(AuthError::InvalidSignature.into());
    }

    let challenge =
        evm::challenge_message(&state.auth.challenge_message, request.payload.as_deref());
    let address = evm::verify(&challenge, &request.signature, request.address.as_deref())
        .inspect_err(|e| tracing::info!(reason = %e, "EVM sign-in rejected"))?;

    if let Some(claims) = payload {
        consume_nonce(state, &claims)?;
    }

    let access_token = start_session(state, &address, None)?;
    Ok(AccessToken {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    })
}

fn verify_ton(state: &AppState, request: TonVerifyRequest) -> Result<TonAccessToken, ApiError> {
    let now = Utc::now().timestamp().max(0) as u64;
    let verified = TonVerifier::new(&state.sessions, state.auth.proof_ttl_secs)
        .verify(&request.address, &request.public_key, &request.proof, now)
        .inspect_err(|e| {
            tracing::info!(address = %request.address, reason = %e, "TON sign-in rejected")
        })?;

    consume_nonce(state, &verified.payload)?;

    let access_token = start_session(state, &verified.address, request.name)?;
    Ok(TonAccessToken {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
    })
}

/// Mark a payload as spent; a second use of the same payload is rejected.
///
/// The record outlives the token's expiry by the validation leeway.
fn consume_nonce(state: &AppState, claims: &PayloadClaims) -> Result<(), ApiError> {
    let expires_at = claims.exp.max(0) as u64 + CLOCK_SKEW_LEEWAY;
    if !NonceRepository::new(&state.db).consume(&claims.nonce, expires_at)? {
        tracing::info!(nonce = %claims.nonce, "Rejected replayed payload");
        return Err(AuthError::PayloadInvalid.into());
    }
    Ok(())
}

fn start_session(
    state: &AppState,
    address: &str,
    name: Option<String>,
) -> Result<String, ApiError> {
    let (user, created) =
        UserRepository::new(&state.db).get_or_create(address, name, state.initial_balance)?;
    if created {
        tracing::info!(address = %user.address, balance = %user.balance, "Created account");
    }

    let token = state.sessions.issue(&user.address)?;
    tracing::info!(address = %user.address, "Signed in");
    Ok(token)
}
