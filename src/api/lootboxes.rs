// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lootbox catalogue and opening.
//!
//! Listing is public. Creating lootboxes and changing their image needs the
//! admin role; opening needs a session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    lootbox::LootboxEngine,
    models::{OpenLootboxRequest, SetImageRequest},
    state::AppState,
    storage::{Lootbox, LootboxRepository, NewLootbox, Prize},
};

/// List all lootboxes with their prizes.
#[utoipa::path(
    get,
    path = "/lootboxes",
    tag = "Lootboxes",
    responses(
        (status = 200, description = "All lootboxes", body = Vec<Lootbox>)
    )
)]
pub async fn list_lootboxes(State(state): State<AppState>) -> Result<Json<Vec<Lootbox>>, ApiError> {
    Ok(Json(LootboxRepository::new(&state.db).list()?))
}

/// Get one lootbox with its prizes.
#[utoipa::path(
    get,
    path = "/lootboxes/{id}",
    tag = "Lootboxes",
    params(("id" = u64, Path, description = "Lootbox id")),
    responses(
        (status = 200, description = "Lootbox", body = Lootbox),
        (status = 404, description = "Lootbox not found")
    )
)]
pub async fn get_lootbox(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Lootbox>, ApiError> {
    Ok(Json(LootboxRepository::new(&state.db).get(id)?))
}

/// Create a lootbox (admin only).
#[utoipa::path(
    post,
    path = "/lootboxes",
    tag = "Lootboxes",
    security(("bearer_auth" = [])),
    request_body = NewLootbox,
    responses(
        (status = 201, description = "Lootbox created", body = Lootbox),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 422, description = "Invalid name or price")
    )
)]
pub async fn create_lootbox(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<NewLootbox>,
) -> Result<(StatusCode, Json<Lootbox>), ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::unprocessable("name must not be empty"));
    }
    if request.open_price.is_sign_negative() {
        return Err(ApiError::unprocessable("open_price must not be negative"));
    }

    let lootbox = LootboxRepository::new(&state.db).create(request)?;
    tracing::info!(lootbox_id = lootbox.id, admin = %admin.address, "Created lootbox");
    Ok((StatusCode::CREATED, Json(lootbox)))
}

/// Set or clear a lootbox image (admin only).
#[utoipa::path(
    put,
    path = "/lootboxes/{id}/image",
    tag = "Lootboxes",
    security(("bearer_auth" = [])),
    params(("id" = u64, Path, description = "Lootbox id")),
    request_body = SetImageRequest,
    responses(
        (status = 200, description = "Lootbox updated", body = Lootbox),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Lootbox not found")
    )
)]
pub async fn set_lootbox_image(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<SetImageRequest>,
) -> Result<Json<Lootbox>, ApiError> {
    let image_url = request
        .image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    Ok(Json(LootboxRepository::new(&state.db).set_image_url(id, image_url)?))
}

/// Spend the open price and draw a prize.
#[utoipa::path(
    post,
    path = "/lootboxes/open",
    tag = "Lootboxes",
    security(("bearer_auth" = [])),
    request_body = OpenLootboxRequest,
    responses(
        (status = 200, description = "Awarded prize", body = Prize),
        (status = 400, description = "Empty lootbox, insufficient balance or unsupported prize"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lootbox not found")
    )
)]
pub async fn open_lootbox(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<OpenLootboxRequest>,
) -> Result<Json<Prize>, ApiError> {
    let outcome = LootboxEngine::new(&state.db).open(request.id, &user.address)?;
    Ok(Json(outcome.prize))
}
