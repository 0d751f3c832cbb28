//! Deadline-bounded position opening.

use clmm_provider_domain::{MintParams, ProviderError, ProviderResult};
use clmm_provider_protocols::{MintReceipt, PositionManager};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Opens positions with the external position manager.
pub struct PositionRegistrar {
    /// Position manager.
    manager: Arc<dyn PositionManager>,
    /// Upper bound on a single mint call.
    timeout: Duration,
}

impl PositionRegistrar {
    /// Creates a registrar that gives up on a mint after `timeout`.
    pub fn new(manager: Arc<dyn PositionManager>, timeout: Duration) -> Self {
        Self { manager, timeout }
    }

    /// Opens a position and returns the manager's receipt.
    ///
    /// # Errors
    /// `PositionCreationFailed` if the manager errors or hands back a zero
    /// token id, `PositionCreationTimedOut` if it does not answer in time.
    pub async fn open_position(&self, params: &MintParams) -> ProviderResult<MintReceipt> {
        debug!(
            token_a = %params.token_a,
            token_b = %params.token_b,
            amount_a = %params.amount_a_desired,
            amount_b = %params.amount_b_desired,
            tick_lower = params.tick_lower,
            tick_upper = params.tick_upper,
            "Opening position"
        );

        match tokio::time::timeout(self.timeout, self.manager.mint(params)).await {
            Ok(Ok(receipt)) if receipt.token_id.is_zero() => Err(
                ProviderError::PositionCreationFailed("position manager returned token id 0".into()),
            ),
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(e)) => {
                error!(error = %e, "Position manager failed");
                Err(ProviderError::PositionCreationFailed(e.to_string()))
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                error!(timeout_ms, "Position manager timed out");
                Err(ProviderError::PositionCreationTimedOut { timeout_ms })
            }
        }
    }
}
