//! HTTP server for snipshelf.
//!
//! JSON endpoints for the snippet and config dashboard, the code preview,
//! the shared theme, and OAuth sign-in. Everything except the landing page,
//! health check and sign-in flow sits behind the session gate.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;

use tokio::net::TcpListener;
use tracing::info;

/// Bind `address` and serve until the process is stopped.
pub async fn serve(state: AppState, address: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!(address = %listener.local_addr()?, "Server listening");
    axum::serve(listener, create_router(state)).await
}
