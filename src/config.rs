// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] loaded once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the redb database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC secret for session and payload tokens | Required |
//! | `SESSION_TTL_SECS` | Session token lifetime | `86400` |
//! | `TON_PAYLOAD_TTL_SECS` | Challenge payload lifetime | `600` |
//! | `TON_PROOF_TTL_SECS` | Maximum age of a TON proof timestamp | `900` |
//! | `AUTH_CHALLENGE_MESSAGE` | Text signed by EVM wallets | `Authenticate on NFT lootboxes` |
//! | `EVM_REQUIRE_PAYLOAD` | Require a server nonce in EVM sign-in | `false` |
//! | `INITIAL_BALANCE` | Balance granted to new users | `1000` |
//! | `ADMIN_ADDRESSES` | Comma separated admin wallet addresses | empty |
//! | `CORS_ALLOWED_ORIGINS` | Comma separated allowed origins | `http://localhost:8000,http://localhost:3000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const SESSION_TTL_ENV: &str = "SESSION_TTL_SECS";
pub const TON_PAYLOAD_TTL_ENV: &str = "TON_PAYLOAD_TTL_SECS";
pub const TON_PROOF_TTL_ENV: &str = "TON_PROOF_TTL_SECS";
pub const CHALLENGE_MESSAGE_ENV: &str = "AUTH_CHALLENGE_MESSAGE";
pub const EVM_REQUIRE_PAYLOAD_ENV: &str = "EVM_REQUIRE_PAYLOAD";
pub const INITIAL_BALANCE_ENV: &str = "INITIAL_BALANCE";
pub const ADMIN_ADDRESSES_ENV: &str = "ADMIN_ADDRESSES";
pub const CORS_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Database file name inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "lootbox.redb";

pub const DEFAULT_CHALLENGE_MESSAGE: &str = "Authenticate on NFT lootboxes";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_TON_PAYLOAD_TTL_SECS: u64 = 600;
pub const DEFAULT_TON_PROOF_TTL_SECS: u64 = 900;
pub const DEFAULT_INITIAL_BALANCE: i64 = 1000;
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8000,http://localhost:3000";

#[cfg(feature = "dev")]
const DEV_JWT_SECRET: &str = "dev-only-secret-do-not-deploy";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Settings for wallet sign-in and session tokens.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub session_ttl_secs: u64,
    pub payload_ttl_secs: u64,
    pub proof_ttl_secs: u64,
    pub challenge_message: String,
    pub evm_require_payload: bool,
}

impl AuthSettings {
    /// Settings with default lifetimes and the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            payload_ttl_secs: DEFAULT_TON_PAYLOAD_TTL_SECS,
            proof_ttl_secs: DEFAULT_TON_PROOF_TTL_SECS,
            challenge_message: DEFAULT_CHALLENGE_MESSAGE.to_string(),
            evm_require_payload: false,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub auth: AuthSettings,
    pub initial_balance: Decimal,
    pub admin_addresses: Vec<String>,
    pub cors_origins: Vec<String>,
    pub json_logs: bool,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = match env::var(JWT_SECRET_ENV) {
            Ok(secret) if !secret.is_empty() => secret,
            _ => dev_secret()?,
        };

        let auth = AuthSettings {
            jwt_secret,
            session_ttl_secs: parse_or(SESSION_TTL_ENV, DEFAULT_SESSION_TTL_SECS)?,
            payload_ttl_secs: parse_or(TON_PAYLOAD_TTL_ENV, DEFAULT_TON_PAYLOAD_TTL_SECS)?,
            proof_ttl_secs: parse_or(TON_PROOF_TTL_ENV, DEFAULT_TON_PROOF_TTL_SECS)?,
            challenge_message: env::var(CHALLENGE_MESSAGE_ENV)
                .unwrap_or_else(|_| DEFAULT_CHALLENGE_MESSAGE.to_string()),
            evm_require_payload: parse_or(EVM_REQUIRE_PAYLOAD_ENV, false)?,
        };

        let initial_balance =
            parse_or(INITIAL_BALANCE_ENV, Decimal::from(DEFAULT_INITIAL_BALANCE))?;
        if initial_balance.is_sign_negative() {
            return Err(ConfigError::Invalid {
                name: INITIAL_BALANCE_ENV,
                value: initial_balance.to_string(),
            });
        }

        Ok(Self {
            host: env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or(PORT_ENV, 8080)?,
            data_dir: env::var(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            auth,
            initial_balance,
            admin_addresses: split_list(&env::var(ADMIN_ADDRESSES_ENV).unwrap_or_default()),
            cors_origins: split_list(
                &env::var(CORS_ORIGINS_ENV).unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            json_logs: env::var(LOG_FORMAT_ENV)
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    /// Path of the redb database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

#[cfg(feature = "dev")]
fn dev_secret() -> Result<String, ConfigError> {
    Ok(DEV_JWT_SECRET.to_string())
}

#[cfg(not(feature = "dev"))]
fn dev_secret() -> Result<String, ConfigError> {
    Err(ConfigError::Missing(JWT_SECRET_ENV))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        _ => Ok(default),
    }
}

/// Split a comma separated list, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
