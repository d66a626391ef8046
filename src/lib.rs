//! Backend for the café site: quizzes with ordered questions and recipes,
//! served as JSON over HTTP.
//!
//! # Layout
//! - [`store`] persists both resources, in PostgreSQL or in process.
//! - [`handlers`] and [`routes`] expose them over axum.
//! - [`auth`] issues and checks the expiring admin tokens that gate writes.
//!
//! # Running
//! ```sh
//! DATABASE_URL=postgres://localhost/cafe ADMIN_PASSWORD=secret cargo run
//! ```
//! Without `DATABASE_URL` the server keeps everything in memory.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal::{self, ctrl_c};
use tracing::info;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

use config::Config;
use state::AppState;

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    info!("Initializing state...");
    let state = AppState::from_config(&config).await?;

    let app = routes::create_routes(state, &config.api_prefix);

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Binding to {address}");

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    info!("Server running on {address}");
    axum_server::bind(address)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
