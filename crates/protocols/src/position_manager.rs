//! Concentrated liquidity position minting.

use async_trait::async_trait;
use clmm_provider_domain::{MintParams, TokenAmount, TokenId};
use serde::{Deserialize, Serialize};

/// Errors raised by a position manager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionManagerError {
    /// The mint was refused (bad range, unknown pool, slippage...).
    #[error("mint rejected: {0}")]
    Rejected(String),
    /// The service could not be reached.
    #[error("position manager unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a successful mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// Handle of the minted position. Never zero.
    pub token_id: TokenId,
    /// Liquidity credited to the position.
    pub liquidity: u128,
    /// Token A actually used.
    pub amount_a: TokenAmount,
    /// Token B actually used.
    pub amount_b: TokenAmount,
}

/// External service that mints concentrated liquidity positions.
#[async_trait]
pub trait PositionManager: Send + Sync {
    /// Mints a position for `params.recipient` and returns its handle.
    async fn mint(&self, params: &MintParams) -> Result<MintReceipt, PositionManagerError>;
}
