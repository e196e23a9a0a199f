// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;
use crate::storage::{RoleRepository, UserRepository};

/// Extractor for authenticated users.
///
/// Validates the bearer session token, checks that the wallet still has an
/// account and resolves its role.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.sessions.parse(token)?;

        let exists = UserRepository::new(&state.db)
            .find_by_address(&claims.wallet_address)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .is_some();
        if !exists {
            return Err(AuthError::UnknownUser);
        }

        let role = RoleRepository::new(&state.db)
            .get(&claims.wallet_address)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        Ok(Auth(AuthenticatedUser::from_claims(claims, role)))
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.has_role(Role::Admin) {
            tracing::info!(address = %user.address, "Rejected non-admin caller");
            return Err(AuthError::AccessDenied);
        }

        Ok(AdminOnly(user))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use crate::config::AuthSettings;
    use crate::storage::LootboxDatabase;

    fn state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = LootboxDatabase::open(&dir.path().join("auth.redb")).unwrap();
        let auth = AuthSettings::with_secret("extractor-secret");
        let state = AppState::new(db, auth, Decimal::from(1000));
        (state, dir)
    }

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/users/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let (state, _dir) = state();
        let mut parts = parts_with(None);
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn non_bearer_header_is_rejected() {
        let (state, _dir) = state();
        let mut parts = parts_with(Some("Basic abc"));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn token_for_absent_user_is_unknown() {
        let (state, _dir) = state();
        let token = state.sessions.issue("0:ghost").unwrap();
        let mut parts = parts_with(Some(&format!("Bearer {token}")));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::UnknownUser)));
    }

    #[tokio::test]
    async fn admin_only_checks_role() {
        let (state, _dir) = state();
        UserRepository::new(&state.db)
            .get_or_create("0:player", None, Decimal::ZERO)
            .unwrap();
        let token = state.sessions.issue("0:player").unwrap();
        let header = format!("Bearer {token}");

        let mut parts = parts_with(Some(&header));
        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.role, Role::Player);

        let mut parts = parts_with(Some(&header));
        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::AccessDenied)));

        RoleRepository::new(&state.db).set("0:player", Role::Admin).unwrap();
        let mut parts = parts_with(Some(&header));
        assert!(AdminOnly::from_request_parts(&mut parts, &state).await.is_ok());
    }
}
