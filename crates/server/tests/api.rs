use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use ledger::{NewUser, RoleKind};

async fn test_router() -> (Router, server::ServerState) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let state = server::ServerState {
        ledger: Arc::new(ledger::Ledger::builder().database(db).build()),
        keys: server::AuthKeys::new(Some("secreto-de-prueba".to_string()), None),
        assistant: None,
        mailer: server::Mailer::default(),
    };
    (server::router(state.clone()), state)
}

async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(ToString::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, set_cookie, body)
}

/// Signs up a fresh user and returns their session cookie.
async fn signup(router: &Router, email: &str) -> String {
    let (status, cookie, _) = request(
        router,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "email": email,
            "password": "Secreta123",
            "nickname": "prueba",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    cookie.unwrap()
}

/// Creates category → account → pocket; returns (account_id, pocket_id).
async fn seed_account(router: &Router, cookie: &str, opening_balance: i64) -> (i64, i64) {
    let (status, _, category) = request(
        router,
        "POST",
        "/api/category",
        Some(cookie),
        Some(json!({"tipo": "ahorro"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, account) = request(
        router,
        "POST",
        "/api/account",
        Some(cookie),
        Some(json!({
            "name": "Principal",
            "money": opening_balance,
            "category_id": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, pocket) = request(
        router,
        "POST",
        "/api/pocket",
        Some(cookie),
        Some(json!({
            "name": "mercado",
            "account_id": account["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        account["id"].as_i64().unwrap(),
        pocket["id"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn signup_with_taken_email_returns_400_with_canonical_message() {
    let (router, _) = test_router().await;
    signup(&router, "alice@example.com").await;

    let (status, _, body) = request(
        &router,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "email": "alice@example.com",
            "password": "OtraClave123",
            "nickname": "doble",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["message"], "El correo electrónico ya está registrado");
}

#[tokio::test]
async fn login_accepts_both_field_spellings() {
    let (router, _) = test_router().await;
    signup(&router, "alice@example.com").await;

    let (status, cookie, _) = request(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "Secreta123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.unwrap().starts_with("authToken="));

    let (status, cookie, body) = request(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({
            "correoElectronico": "alice@example.com",
            "contraseña": "Secreta123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.unwrap().starts_with("authToken="));
    assert_eq!(body["user"]["email"], "alice@example.com");
}

#[tokio::test]
async fn protected_routes_reject_missing_or_garbage_cookies() {
    let (router, _) = test_router().await;

    let (status, _, body) = request(&router, "GET", "/api/account", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");

    let (status, _, _) = request(
        &router,
        "GET",
        "/api/account",
        Some("authToken=no-es-un-jwt"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_balance_follows_the_transaction_lifecycle() {
    let (router, _) = test_router().await;
    let cookie = signup(&router, "alice@example.com").await;
    let (account_id, pocket_id) = seed_account(&router, &cookie, 0).await;

    let (status, _, tx) = request(
        &router,
        "POST",
        "/api/transaction",
        Some(&cookie),
        Some(json!({
            "amount": 100,
            "is_income": true,
            "date": "2026-07-01T10:00:00Z",
            "pocket_id": pocket_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, accounts) = request(&router, "GET", "/api/account", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accounts[0]["id"].as_i64().unwrap(), account_id);
    assert_eq!(accounts[0]["money"], 100);

    let uri = format!("/api/transaction/{}", tx["id"]);
    let (status, _, _) = request(&router, "DELETE", &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, accounts) = request(&router, "GET", "/api/account", Some(&cookie), None).await;
    assert_eq!(accounts[0]["money"], 0);
}

#[tokio::test]
async fn overdraw_returns_409_and_leaves_the_balance_alone() {
    let (router, _) = test_router().await;
    let cookie = signup(&router, "alice@example.com").await;
    let (_, pocket_id) = seed_account(&router, &cookie, 50).await;

    let (status, _, body) = request(
        &router,
        "POST",
        "/api/transaction",
        Some(&cookie),
        Some(json!({
            "amount": 100,
            "is_income": false,
            "date": "2026-07-01T10:00:00Z",
            "pocket_id": pocket_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    let (_, _, accounts) = request(&router, "GET", "/api/account", Some(&cookie), None).await;
    assert_eq!(accounts[0]["money"], 50);

    let uri = format!("/api/transaction/pocket/{pocket_id}");
    let (_, _, txs) = request(&router, "GET", &uri, Some(&cookie), None).await;
    assert_eq!(txs.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn account_listing_is_idempotent_between_writes() {
    let (router, _) = test_router().await;
    let cookie = signup(&router, "alice@example.com").await;
    seed_account(&router, &cookie, 250).await;

    let (_, _, first) = request(&router, "GET", "/api/account", Some(&cookie), None).await;
    let (_, _, second) = request(&router, "GET", "/api/account", Some(&cookie), None).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn recovery_is_indistinguishable_for_unknown_emails() {
    let (router, _) = test_router().await;
    signup(&router, "alice@example.com").await;

    let (known_status, _, known_body) = request(
        &router,
        "POST",
        "/api/auth/recover",
        None,
        Some(json!({"email": "alice@example.com"})),
    )
    .await;
    let (unknown_status, _, unknown_body) = request(
        &router,
        "POST",
        "/api/auth/recover",
        None,
        Some(json!({"email": "nadie@example.com"})),
    )
    .await;

    assert_eq!(known_status, StatusCode::ACCEPTED);
    assert_eq!(unknown_status, StatusCode::ACCEPTED);
    assert_eq!(known_body, unknown_body);
}

#[tokio::test]
async fn password_reset_consumes_the_signed_token() {
    let (router, state) = test_router().await;
    signup(&router, "alice@example.com").await;

    let (user, jti, expires_at) = state
        .ledger
        .create_reset("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    let token = server::sign_reset_token(&state.keys, user.id, &jti, expires_at).unwrap();

    let uri = format!("/api/auth/reset/{token}");
    let (status, _, _) = request(
        &router,
        "POST",
        &uri,
        None,
        Some(json!({"password": "NuevaClave123"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = request(
        &router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "NuevaClave123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Weak replacement passwords are rejected up front.
    let (status, _, body) = request(
        &router,
        "POST",
        &uri,
        None,
        Some(json!({"password": "corta"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn goal_roundtrip_keeps_its_target() {
    let (router, _) = test_router().await;
    let cookie = signup(&router, "alice@example.com").await;
    let (_, pocket_id) = seed_account(&router, &cookie, 0).await;

    let (status, _, goal) = request(
        &router,
        "POST",
        "/api/goal",
        Some(&cookie),
        Some(json!({
            "description": "ahorrar para el verano",
            "start_date": "2026-07-01T00:00:00Z",
            "end_date": "2026-09-01T00:00:00Z",
            "max_money": 10000,
            "targets": [{"target_type": "pocket", "target_id": pocket_id}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/api/goal/{}", goal["id"]);
    let (status, _, fetched) = request(&router, "GET", &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let targets = fetched["targets"].as_array().unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0]["target_type"], "pocket");
    assert_eq!(targets[0]["target_id"].as_i64().unwrap(), pocket_id);
}

#[tokio::test]
async fn admin_surface_is_gated_by_role_and_cookie() {
    let (router, state) = test_router().await;
    signup(&router, "alice@example.com").await;

    // A regular user cannot pass the admin login.
    let (status, _, _) = request(
        &router,
        "POST",
        "/api/auth/admin/login",
        None,
        Some(json!({"email": "alice@example.com", "password": "Secreta123"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    state
        .ledger
        .create_admin(
            NewUser {
                email: "admin@example.com".to_string(),
                password: "Secreta123".to_string(),
                nickname: "admin".to_string(),
            },
            RoleKind::Admin,
        )
        .await
        .unwrap();

    let (status, admin_cookie, _) = request(
        &router,
        "POST",
        "/api/auth/admin/login",
        None,
        Some(json!({"email": "admin@example.com", "password": "Secreta123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let admin_cookie = admin_cookie.unwrap();
    assert!(admin_cookie.starts_with("adminAuthToken="));

    // The admin surface rejects the bare user cookie and accepts the admin one.
    let (status, _, _) = request(&router, "GET", "/api/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, users) =
        request(&router, "GET", "/api/admin/users", Some(&admin_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);

    // Managing admins takes the super-admin role.
    let (status, _, _) =
        request(&router, "GET", "/api/admin/admins", Some(&admin_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, stats) =
        request(&router, "GET", "/api/admin/stats", Some(&admin_cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["users"], 2);
}

#[tokio::test]
async fn super_admin_can_manage_admins() {
    let (router, state) = test_router().await;

    state
        .ledger
        .create_admin(
            NewUser {
                email: "root@example.com".to_string(),
                password: "Secreta123".to_string(),
                nickname: "root".to_string(),
            },
            RoleKind::SuperAdmin,
        )
        .await
        .unwrap();

    let (_, cookie, _) = request(
        &router,
        "POST",
        "/api/auth/admin/login",
        None,
        Some(json!({"email": "root@example.com", "password": "Secreta123"})),
    )
    .await;
    let cookie = cookie.unwrap();

    let (status, _, created) = request(
        &router,
        "POST",
        "/api/admin/admins",
        Some(&cookie),
        Some(json!({
            "email": "admin@example.com",
            "password": "Secreta123",
            "nickname": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "admin");

    let (status, _, admins) =
        request(&router, "GET", "/api/admin/admins", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(admins.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn chat_without_a_configured_assistant_is_a_server_error() {
    let (router, _) = test_router().await;
    let cookie = signup(&router, "alice@example.com").await;
    let (account_id, _) = seed_account(&router, &cookie, 0).await;

    let uri = format!("/api/chat/{account_id}");
    let (status, _, body) = request(
        &router,
        "POST",
        &uri,
        Some(&cookie),
        Some(json!({"question": "¿cuánto llevo gastado?"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "internal");

    // History still works without the external service.
    let (status, _, history) = request(&router, "GET", &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 0);
}
