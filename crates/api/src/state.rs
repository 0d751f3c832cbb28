//! Application state shared across handlers.

use clmm_provider_execution::provider::LiquidityProvider;
use std::sync::Arc;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// The provider service.
    pub provider: Arc<LiquidityProvider>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(provider: Arc<LiquidityProvider>) -> Self {
        Self { provider }
    }
}
