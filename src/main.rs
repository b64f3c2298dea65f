use crate::config::Config;
use crate::session::SessionManager;
use crate::ws::accept_connection;
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

mod api;
mod client;
mod config;
mod error;
mod game;
mod session;
mod ws;

// FIXME: Implement TLS support

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::try_init().ok();

    let config = Config::from_env().context("invalid configuration")?;
    let manager = Arc::new(SessionManager::new());

    tokio::spawn({
        let manager = manager.clone();
        let timeout = config.idle_timeout;
        async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                manager.purge_games(timeout);
            }
        }
    });

    if let Some(api_port) = config.api_port {
        let listener = api::listen(config.address, api_port)
            .await
            .context("could not bind the API port")?;
        let router = api::make_router(manager.clone());
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                log::error!("API server stopped: {}", err);
            }
        });
    }

    let addr = SocketAddr::new(config.address, config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind to address: {}", addr))?;
    log::info!("Listening on: {}", addr);

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, manager.clone()));
    }
    Ok(())
}
