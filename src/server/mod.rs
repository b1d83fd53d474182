//! The dashboard web service.
//!
//! A thin axum layer over [`Carburantes`]: every route geocodes/queries
//! through the client facade and wraps the results in the response schemas
//! from [`routes`].

pub mod routes;

use crate::carburantes::Carburantes;
use log::info;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {0}")]
    Bind(String, #[source] std::io::Error),

    #[error("Server failed")]
    Serve(#[source] std::io::Error),
}

/// Serves the API on `host:port` until the process stops.
pub async fn serve(client: Arc<Carburantes>, host: &str, port: u16) -> Result<(), ServerError> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::Bind(addr.clone(), e))?;
    info!("Dashboard API listening on {addr}");
    axum::serve(listener, routes::router(client))
        .await
        .map_err(ServerError::Serve)
}
