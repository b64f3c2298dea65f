use crate::session::{lock, SessionManager};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

pub fn make_router(manager: Arc<SessionManager>) -> Router {
    Router::new()
        .route("/games", get(get_games).post(create_game))
        .with_state(manager)
}

pub async fn listen(address: IpAddr, port: u16) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(SocketAddr::new(address, port)).await?;
    log::info!("API listening on {}", listener.local_addr()?);
    Ok(listener)
}

async fn get_games(State(manager): State<Arc<SessionManager>>) -> Result<Json<impl Serialize>, StatusCode> {
    Ok(Json(json!({
        "num_games": manager.num_games(),
        "games": manager.summaries()
    })))
}

async fn create_game(State(manager): State<Arc<SessionManager>>) -> Result<Json<impl Serialize>, StatusCode> {
    let session = manager.create_game();
    let id = lock(&session).id().to_string();
    Ok(Json(json!({ "game": id })))
}
