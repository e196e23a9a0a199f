// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{normalize_address, AdminOnly},
    error::ApiError,
    lootbox::seed_reference_lootboxes,
    models::{AssignRoleRequest, RoleAssignment},
    state::AppState,
    storage::{Lootbox, RoleRepository},
};

/// Assign a role to a wallet address.
///
/// The address does not need an account yet; the role applies from its
/// first sign-in.
#[utoipa::path(
    put,
    path = "/admin/roles/{address}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("address" = String, Path, description = "Wallet address")),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role assigned", body = RoleAssignment),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn assign_role(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(request): Json<AssignRoleRequest>,
) -> Result<Json<RoleAssignment>, ApiError> {
    let address = normalize_address(&address);
    if address.is_empty() {
        return Err(ApiError::unprocessable("address must not be empty"));
    }

    RoleRepository::new(&state.db).set(&address, request.role)?;
    tracing::info!(
        admin = %admin.address,
        target = %address,
        role = %request.role,
        "Role assigned"
    );

    Ok(Json(RoleAssignment {
        address,
        role: request.role,
    }))
}

/// Insert the reference Basic and Premium lootboxes.
#[utoipa::path(
    post,
    path = "/admin/seed",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Lootboxes created", body = Vec<Lootbox>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn seed_lootboxes(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<Lootbox>>), ApiError> {
    let lootboxes = seed_reference_lootboxes(&state.db)?;
    Ok((StatusCode::CREATED, Json(lootboxes)))
}
