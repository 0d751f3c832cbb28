//! REST API over the liquidity provider.
//!
//! This crate exposes the provider's query and command surface over HTTP:
//! - Fee percentage read and owner-only update
//! - Liquidity deposits
//! - Position records, accrued fees and event history
//! - Caller identity and optional API key checks

/// Authentication and caller identity.
pub mod auth;
/// Error types.
pub mod error;
/// Request handlers.
pub mod handlers;
/// API request/response models.
pub mod models;
/// Route definitions.
pub mod routes;
/// Server configuration and startup.
pub mod server;
/// Application state.
pub mod state;

pub use auth::{AuthConfig, AuthError, AuthState, CallerIdentity};
pub use error::ApiError;
pub use server::{ApiServer, ServerConfig};
pub use state::AppState;
