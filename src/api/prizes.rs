// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::AdminOnly,
    error::ApiError,
    state::AppState,
    storage::{NewPrize, Prize, PrizeRepository},
};

/// List every prize across all lootboxes (admin only).
///
/// Players see prizes through `/lootboxes`.
#[utoipa::path(
    get,
    path = "/prizes",
    tag = "Prizes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All prizes", body = Vec<Prize>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_prizes(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<Vec<Prize>>, ApiError> {
    Ok(Json(PrizeRepository::new(&state.db).list()?))
}

/// Get one prize (admin only).
#[utoipa::path(
    get,
    path = "/prizes/{id}",
    tag = "Prizes",
    security(("bearer_auth" = [])),
    params(("id" = u64, Path, description = "Prize id")),
    responses(
        (status = 200, description = "Prize", body = Prize),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Prize not found")
    )
)]
pub async fn get_prize(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Prize>, ApiError> {
    Ok(Json(PrizeRepository::new(&state.db).get(id)?))
}

/// Add a prize to a lootbox (admin only).
#[utoipa::path(
    post,
    path = "/prizes",
    tag = "Prizes",
    security(("bearer_auth" = [])),
    request_body = NewPrize,
    responses(
        (status = 201, description = "Prize created", body = Prize),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Lootbox not found"),
        (status = 422, description = "Negative drop chance or payout")
    )
)]
pub async fn create_prize(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<NewPrize>,
) -> Result<(StatusCode, Json<Prize>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::unprocessable("name must not be empty"));
    }
    if request.drop_chance.is_sign_negative() {
        return Err(ApiError::unprocessable("drop_chance must not be negative"));
    }
    if request.tokens_amount.is_sign_negative() {
        return Err(ApiError::unprocessable("tokens_amount must not be negative"));
    }

    let prize = PrizeRepository::new(&state.db).create(request)?;
    tracing::info!(
        prize_id = prize.id,
        lootbox_id = prize.lootbox_id,
        admin = %admin.address,
        "Created prize"
    );
    Ok((StatusCode::CREATED, Json(prize)))
}
