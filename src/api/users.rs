// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Endpoints for the signed-in account.

use axum::{extract::State, Json};

use crate::{
    auth::{Auth, AuthError},
    error::ApiError,
    models::UserResponse,
    state::AppState,
    storage::{ClaimedPrize, ClaimedPrizeRepository, UserRepository},
};

/// Get the signed-in user with current balance and role.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_me(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let stored = UserRepository::new(&state.db)
        .find_by_address(&user.address)?
        .ok_or(AuthError::UnknownUser)?;
    Ok(Json(UserResponse::new(stored, user.role)))
}

/// List prizes won by the signed-in user, oldest first.
#[utoipa::path(
    get,
    path = "/users/me/prizes",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Claimed prizes", body = Vec<ClaimedPrize>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_my_prizes(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClaimedPrize>>, ApiError> {
    let claims = ClaimedPrizeRepository::new(&state.db).list_for_user(&user.address)?;
    Ok(Json(claims))
}
