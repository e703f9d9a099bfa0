use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{Mailer, balances, expense, user};

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub mailer: Arc<Mailer>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/users", post(user::create))
        .route("/users/{user_id}", get(user::get))
        .route("/expenses", post(expense::create))
        .route("/balances", get(balances::get_all))
        .route("/balances/{user_id}", get(balances::get_by_user))
        .route("/balances/lender/{lender_id}", get(balances::get_by_lender))
        .with_state(state)
}

pub async fn run_with_listener(
    db: DatabaseConnection,
    mailer: Arc<Mailer>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState { db, mailer };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    db: DatabaseConnection,
    mailer: Arc<Mailer>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(db, mailer, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
