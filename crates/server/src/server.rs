//! Router composition and server lifecycle.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use assistant::CompletionClient;
use ledger::Ledger;

use crate::{
    account, admin, auth,
    auth::AuthKeys,
    category, chat, goal,
    mailer::Mailer,
    pocket, transaction, user,
};

#[derive(Clone)]
pub struct ServerState {
    pub ledger: Arc<Ledger>,
    pub keys: AuthKeys,
    pub assistant: Option<Arc<CompletionClient>>,
    pub mailer: Mailer,
}

pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/auth/signup", post(user::signup))
        .route("/auth/login", post(user::login))
        .route("/auth/admin/login", post(user::admin_login))
        .route("/auth/recover", post(user::recover))
        .route("/auth/reset/{token}", post(user::reset));

    let protected = Router::new()
        .route("/auth/logout", post(user::logout))
        .route(
            "/auth/profile",
            get(user::profile)
                .put(user::update_profile)
                .delete(user::delete_profile),
        )
        .route("/account", post(account::create).get(account::list))
        .route(
            "/account/{id}",
            put(account::update).delete(account::delete),
        )
        .route("/category", post(category::create).get(category::list))
        .route(
            "/category/{id}",
            get(category::get)
                .put(category::update)
                .delete(category::delete),
        )
        .route("/pocket", post(pocket::create))
        .route("/pocket/account/{account_id}", get(pocket::list_by_account))
        .route(
            "/pocket/{id}",
            put(pocket::update).delete(pocket::delete),
        )
        .route("/transaction", post(transaction::create))
        .route(
            "/transaction/pocket/{pocket_id}",
            get(transaction::list_by_pocket),
        )
        .route("/transaction/byDate", get(transaction::list_by_date))
        .route(
            "/transaction/byTypeDate",
            get(transaction::list_by_type_date),
        )
        .route(
            "/transaction/{id}",
            put(transaction::update).delete(transaction::delete),
        )
        .route("/goal", post(goal::create).get(goal::list))
        .route(
            "/goal/{id}",
            get(goal::get).put(goal::update).delete(goal::delete),
        )
        .route("/goal/{id}/progress", get(goal::progress))
        .route(
            "/chat/{account_id}",
            post(chat::ask).get(chat::history),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::user_auth,
        ));

    let admin_routes = Router::new()
        .route("/logs/login", get(admin::login_logs))
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::soft_delete_user))
        .route("/stats", get(admin::stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_auth,
        ));

    let super_admin_routes = Router::new()
        .route("/admins", get(admin::list_admins).post(admin::create_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::super_admin_auth,
        ));

    Router::new()
        .nest(
            "/api",
            public
                .merge(protected)
                .nest("/admin", admin_routes.merge(super_admin_routes)),
        )
        .with_state(state)
}

pub async fn run(state: ServerState) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
}
