//! Provider configuration.

use crate::lifecycle::DEFAULT_MAX_EVENTS;
use clmm_provider_domain::{Address, FeePercent};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Construction-time configuration of the provider.
///
/// Everything except `fee_percent` is fixed for the provider's lifetime;
/// `fee_percent` is only the initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Account that holds custody and owns minted positions.
    pub provider_address: Address,
    /// Position manager service.
    pub position_manager: Address,
    /// Swap router service. Held, never called.
    pub swap_router: Address,
    /// Reference settlement asset, e.g. a stable coin.
    pub settlement_asset: Address,
    /// Initial fee percentage.
    pub fee_percent: FeePercent,
    /// Maximum time to wait for the position manager, in milliseconds.
    pub position_timeout_ms: u64,
    /// Lifecycle events kept in memory.
    pub max_events: usize,
}

impl ProviderConfig {
    /// Mint deadline as a duration.
    #[must_use]
    pub fn position_timeout(&self) -> Duration {
        Duration::from_millis(self.position_timeout_ms)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_address: Address::from_low_u64(0x1000),
            position_manager: Address::from_low_u64(0x2000),
            swap_router: Address::from_low_u64(0x3000),
            settlement_asset: Address::from_low_u64(0x4000),
            fee_percent: FeePercent::new(5),
            position_timeout_ms: 30_000, // 30 seconds
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}
