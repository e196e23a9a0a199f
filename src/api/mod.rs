// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{ton::TonDomain, Role, TonProof},
    models::{
        AccessToken, AssignRoleRequest, EvmVerifyRequest, OpenLootboxRequest, PayloadResponse,
        RoleAssignment, SetImageRequest, TonAccessToken, TonVerifyRequest, UserResponse,
        VerifyRequest, VerifyResponse,
    },
    state::AppState,
    storage::{ClaimedPrize, Lootbox, NewLootbox, NewPrize, Prize, PrizeQuality, PrizeType},
};

pub mod admin;
pub mod auth;
pub mod health;
pub mod lootboxes;
pub mod prizes;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/auth/payload", get(auth::issue_payload))
        .route("/auth/verify", post(auth::verify))
        .route("/users/me", get(users::get_me))
        .route("/users/me/prizes", get(users::list_my_prizes))
        .route(
            "/lootboxes",
            get(lootboxes::list_lootboxes).post(lootboxes::create_lootbox),
        )
        .route("/lootboxes/open", post(lootboxes::open_lootbox))
        .route("/lootboxes/{id}", get(lootboxes::get_lootbox))
        .route("/lootboxes/{id}/image", put(lootboxes::set_lootbox_image))
        .route(
            "/prizes",
            get(prizes::list_prizes).post(prizes::create_prize),
        )
        .route("/prizes/{id}", get(prizes::get_prize))
        .route("/admin/roles/{address}", put(admin::assign_role))
        .route("/admin/seed", post(admin::seed_lootboxes))
        .with_state(state);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(cors_origins))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        auth::issue_payload,
        auth::verify,
        users::get_me,
        users::list_my_prizes,
        lootboxes::list_lootboxes,
        lootboxes::get_lootbox,
        lootboxes::create_lootbox,
        lootboxes::set_lootbox_image,
        lootboxes::open_lootbox,
        prizes::list_prizes,
        prizes::get_prize,
        prizes::create_prize,
        admin::assign_role,
        admin::seed_lootboxes
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            PayloadResponse,
            VerifyRequest,
            VerifyResponse,
            EvmVerifyRequest,
            TonVerifyRequest,
            TonProof,
            TonDomain,
            AccessToken,
            TonAccessToken,
            UserResponse,
            Role,
            Lootbox,
            NewLootbox,
            SetImageRequest,
            OpenLootboxRequest,
            Prize,
            NewPrize,
            PrizeQuality,
            PrizeType,
            ClaimedPrize,
            AssignRoleRequest,
            RoleAssignment
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Wallet sign-in"),
        (name = "Users", description = "Signed-in account"),
        (name = "Lootboxes", description = "Lootbox catalogue and opening"),
        (name = "Prizes", description = "Prize catalogue"),
        (name = "Admin", description = "Role management and fixtures")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::AuthSettings;
    use crate::storage::{LootboxDatabase, RoleRepository, UserRepository};

    const PLAYER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const PLAYER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const ADMIN: &str = "0:admin";

    struct TestApp {
        state: AppState,
        app: Router,
        _dir: TempDir,
    }

    impl TestApp {
        fn new() -> Self {
            Self::with_auth(AuthSettings::with_secret("api-secret"))
        }

        fn with_auth(auth: AuthSettings) -> Self {
            let dir = TempDir::new().unwrap();
            let db = LootboxDatabase::open(&dir.path().join("api.redb")).unwrap();
            let state = AppState::new(db, auth, Decimal::from(1000));
            let app = router(state.clone(), &["http://localhost:3000".to_string()]);
            Self {
                state,
                app,
                _dir: dir,
            }
        }

        fn admin_token(&self) -> String {
            UserRepository::new(&self.state.db)
                .get_or_create(ADMIN, None, Decimal::ZERO)
                .unwrap();
            RoleRepository::new(&self.state.db)
                .seed_admins(&[ADMIN])
                .unwrap();
            self.state.sessions.issue(ADMIN).unwrap()
        }

        async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> Response {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            let body = match body {
                Some(json) => {
                    builder = builder.header(CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };
            self.app
                .clone()
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap()
        }

        async fn sign_in_player(&self) -> String {
            let signer: PrivateKeySigner = PLAYER_KEY.parse().unwrap();
            let message = &self.state.auth.challenge_message;
            let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
            let body = json!({ "signature": alloy::hex::encode_prefixed(signature.as_bytes()) });

            let response = self.send("POST", "/auth/verify", None, Some(body)).await;
            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            body["access_token"].as_str().unwrap().to_string()
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = TestApp::new();
        let response = app.send("GET", "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = json_body(response).await;
        assert_eq!(body["checks"]["database"], "ok");
    }

    #[test]
    fn openapi_lists_secured_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/lootboxes/open"));
        assert!(doc.paths.paths.contains_key("/admin/roles/{address}"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[tokio::test]
    async fn evm_sign_in_creates_account_with_initial_balance() {
        let app = TestApp::new();
        let token = app.sign_in_player().await;

        let response = app.send("GET", "/users/me", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let me = json_body(response).await;
        assert_eq!(me["address"], PLAYER);
        assert_eq!(me["balance"], "1000");
        assert_eq!(me["role"], "player");

        // second sign-in reuses the account
        app.sign_in_player().await;
        let response = app.send("GET", "/users/me/prizes", Some(&token), None).await;
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn garbage_signature_is_rejected() {
        let app = TestApp::new();
        let body = json!({ "signature": "0xdeadbeef" });
        let response = app.send("POST", "/auth/verify", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "invalid_signature");
    }

    #[tokio::test]
    async fn evm_payload_cannot_be_replayed() {
        let app = TestApp::new();
        let response = app.send("GET", "/auth/payload", None, None).await;
        let payload = json_body(response).await["payload"].as_str().unwrap().to_string();

        let signer: PrivateKeySigner = PLAYER_KEY.parse().unwrap();
        let challenge = format!("{}\n\nNonce: {payload}", app.state.auth.challenge_message);
        let signature = signer.sign_message_sync(challenge.as_bytes()).unwrap();
        let body = json!({
            "signature": alloy::hex::encode_prefixed(signature.as_bytes()),
            "address": PLAYER,
            "payload": payload,
        });

        let first = app.send("POST", "/auth/verify", None, Some(body.clone())).await;
        assert_eq!(first.status(), StatusCode::OK);

        let replay = app.send("POST", "/auth/verify", None, Some(body)).await;
        assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(replay).await["error_code"], "payload_invalid");
    }

    #[tokio::test]
    async fn strict_evm_sign_in_needs_payload_and_address() {
        let mut auth = AuthSettings::with_secret("api-secret");
        auth.evm_require_payload = true;
        let app = TestApp::with_auth(auth);
        let signer: PrivateKeySigner = PLAYER_KEY.parse().unwrap();

        let plain = signer
            .sign_message_sync(app.state.auth.challenge_message.as_bytes())
            .unwrap();
        let body = json!({
            "signature": alloy::hex::encode_prefixed(plain.as_bytes()),
            "address": PLAYER,
        });
        let response = app.send("POST", "/auth/verify", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "payload_invalid");

        let response = app.send("GET", "/auth/payload", None, None).await;
        let payload = json_body(response).await["payload"].as_str().unwrap().to_string();
        let challenge = format!("{}\n\nNonce: {payload}", app.state.auth.challenge_message);
        let signature = signer.sign_message_sync(challenge.as_bytes()).unwrap();
        let signature = alloy::hex::encode_prefixed(signature.as_bytes());

        let body = json!({ "signature": signature, "payload": payload });
        let response = app.send("POST", "/auth/verify", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "invalid_signature");

        let body = json!({ "signature": signature, "address": PLAYER, "payload": payload });
        let response = app.send("POST", "/auth/verify", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ton_sign_in_returns_camel_case_token() {
        use crate::auth::ton::{proof_message, signed_digest, TonAddress};
        use base64ct::{Base64, Encoding};
        use ed25519_dalek::{Signer, SigningKey};

        let app = TestApp::new();
        let response = app.send("GET", "/auth/payload", None, None).await;
        let payload = json_body(response).await["payload"].as_str().unwrap().to_string();

        let address = format!("0:{}", "5a".repeat(32));
        let key = SigningKey::from_bytes(&[3u8; 32]);
        let mut proof = TonProof {
            timestamp: chrono::Utc::now().timestamp() as u64,
            domain: TonDomain {
                length_bytes: 11,
                value: "example.org".to_string(),
            },
            signature: String::new(),
            payload,
        };
        let parsed: TonAddress = address.parse().unwrap();
        let digest = signed_digest(&proof_message(&parsed, &proof));
        proof.signature = Base64::encode_string(&key.sign(&digest).to_bytes());

        let body = json!({
            "name": "Tonny",
            "address": address,
            "publicKey": alloy::hex::encode(key.verifying_key().to_bytes()),
            "proof": proof,
        });
        let response = app.send("POST", "/auth/verify", None, Some(body.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let tokens = json_body(response).await;
        assert_eq!(tokens["tokenType"], "bearer");
        let token = tokens["accessToken"].as_str().unwrap();

        let response = app.send("GET", "/users/me", Some(token), None).await;
        let me = json_body(response).await;
        assert_eq!(me["address"], address);
        assert_eq!(me["name"], "Tonny");

        let replay = app.send("POST", "/auth/verify", None, Some(body)).await;
        assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(replay).await["error_code"], "payload_invalid");
    }

    #[tokio::test]
    async fn authenticated_routes_require_token() {
        let app = TestApp::new();
        let response = app.send("GET", "/users/me", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.send("GET", "/users/me", Some("garbage"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error_code"], "token_invalid");
    }

    #[tokio::test]
    async fn players_cannot_use_admin_routes() {
        let app = TestApp::new();
        let token = app.sign_in_player().await;
        let body = json!({ "name": "Mine", "open_price": "1" });
        let response = app.send("POST", "/lootboxes", Some(&token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.send("POST", "/admin/seed", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.send("GET", "/prizes", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = app.send("GET", "/prizes", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_reads_prize_catalogue() {
        let app = TestApp::new();
        let admin = app.admin_token();
        app.send("POST", "/admin/seed", Some(&admin), None).await;

        let response = app.send("GET", "/prizes", Some(&admin), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let prizes = json_body(response).await;
        assert_eq!(prizes.as_array().unwrap().len(), 9);

        let id = prizes[0]["id"].as_u64().unwrap();
        let response = app.send("GET", &format!("/prizes/{id}"), Some(&admin), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], prizes[0]["name"]);

        let response = app.send("GET", "/prizes/999", Some(&admin), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error_code"], "not_found");
    }

    #[tokio::test]
    async fn admin_builds_catalogue_and_player_opens() {
        let app = TestApp::new();
        let admin = app.admin_token();

        let body = json!({ "name": "Starter", "open_price": "25" });
        let response = app.send("POST", "/lootboxes", Some(&admin), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let lootbox = json_body(response).await;
        let id = lootbox["id"].as_u64().unwrap();

        let body = json!({
            "name": "Jackpot",
            "lootbox_id": id,
            "quality": "Legendary",
            "drop_chance": "1",
            "type": "Tokens",
            "tokens_amount": "100"
        });
        let response = app.send("POST", "/prizes", Some(&admin), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json!({ "image_url": "https://cdn.example.org/starter.png" });
        let uri = format!("/lootboxes/{id}/image");
        let response = app.send("PUT", &uri, Some(&admin), Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.send("GET", &format!("/lootboxes/{id}"), None, None).await;
        let listed = json_body(response).await;
        assert_eq!(listed["image_url"], "https://cdn.example.org/starter.png");
        assert_eq!(listed["prizes"][0]["type"], "Tokens");

        let player = app.sign_in_player().await;
        let response = app
            .send("POST", "/lootboxes/open", Some(&player), Some(json!({ "id": id })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "Jackpot");

        let response = app.send("GET", "/users/me", Some(&player), None).await;
        assert_eq!(json_body(response).await["balance"], "1075");

        let response = app.send("GET", "/users/me/prizes", Some(&player), None).await;
        let claims = json_body(response).await;
        assert_eq!(claims.as_array().unwrap().len(), 1);
        assert_eq!(claims[0]["user_address"], PLAYER);
    }

    #[tokio::test]
    async fn negative_values_are_unprocessable() {
        let app = TestApp::new();
        let admin = app.admin_token();

        let body = json!({ "name": "Broken", "open_price": "-1" });
        let response = app.send("POST", "/lootboxes", Some(&admin), Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app.send("POST", "/admin/seed", Some(&admin), None).await;
        let seeded = json_body(response).await;
        let body = json!({
            "name": "Cursed",
            "lootbox_id": seeded[0]["id"],
            "quality": "Common",
            "drop_chance": "-0.2",
            "type": "Tokens",
            "tokens_amount": "1"
        });
        let response = app.send("POST", "/prizes", Some(&admin), Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn opening_missing_or_empty_lootbox_fails() {
        let app = TestApp::new();
        let admin = app.admin_token();
        let player = app.sign_in_player().await;

        let response = app
            .send("POST", "/lootboxes/open", Some(&player), Some(json!({ "id": 99 })))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json!({ "name": "Hollow", "open_price": "1" });
        let response = app.send("POST", "/lootboxes", Some(&admin), Some(body)).await;
        let id = json_body(response).await["id"].as_u64().unwrap();

        let response = app
            .send("POST", "/lootboxes/open", Some(&player), Some(json!({ "id": id })))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "empty_lootbox");

        let response = app.send("GET", "/users/me", Some(&player), None).await;
        assert_eq!(json_body(response).await["balance"], "1000");
    }

    #[tokio::test]
    async fn admin_can_promote_player() {
        let app = TestApp::new();
        let admin = app.admin_token();
        let player = app.sign_in_player().await;

        let uri = format!("/admin/roles/{}", PLAYER.to_lowercase());
        let response = app
            .send("PUT", &uri, Some(&admin), Some(json!({ "role": "admin" })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["address"], PLAYER);

        let response = app.send("POST", "/admin/seed", Some(&player), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 2);
    }
}
