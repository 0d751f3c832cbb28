//! Server configuration and startup.

use crate::auth::{AuthConfig, AuthState};
use crate::routes::create_router;
use crate::state::AppState;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,
    /// Authentication settings.
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            auth: AuthConfig::default(),
        }
    }
}

/// HTTP server in front of one provider.
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Creates a new server.
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Builds the router without binding.
    pub fn router(&self) -> Router {
        create_router(self.state.clone(), AuthState::new(self.config.auth.clone()))
    }

    /// Binds and serves until the process stops.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            addr = %self.config.bind_addr,
            api_key_required = self.config.auth.require_api_key,
            "API server listening"
        );

        axum::serve(listener, self.router()).await
    }
}
