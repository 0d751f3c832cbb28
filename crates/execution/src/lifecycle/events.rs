//! Lifecycle events emitted by the provider.

use clmm_provider_domain::{Address, FeePercent, FeeTier, TickRange, TokenAmount, TokenId};
use serde::{Deserialize, Serialize};

/// Type of lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEventType {
    /// A deposit was committed as a position.
    LiquidityAdded,
    /// A deposit failed after tokens moved and was reverted.
    DepositRolledBack,
    /// The owner changed the fee percentage.
    FeePercentUpdated,
}

/// A lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Event ID.
    pub id: String,
    /// Event type.
    pub event_type: LifecycleEventType,
    /// Identity that triggered the event.
    pub actor: Address,
    /// Timestamp.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Event-specific data.
    pub data: EventData,
}

impl LifecycleEvent {
    /// Creates a new lifecycle event.
    pub fn new(event_type: LifecycleEventType, actor: Address, data: EventData) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            actor,
            timestamp: chrono::Utc::now(),
            data,
        }
    }
}

/// Event-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventData {
    /// Liquidity added data.
    LiquidityAdded(LiquidityAddedData),
    /// Rollback data.
    DepositRolledBack(DepositRolledBackData),
    /// Fee update data.
    FeePercentUpdated(FeePercentUpdatedData),
}

/// Data for a liquidity added event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityAddedData {
    /// Minted position handle.
    pub token_id: TokenId,
    /// Handle of the record this one replaced, if any.
    pub replaced: Option<TokenId>,
    pub token_a: Address,
    pub token_b: Address,
    /// Gross token A pulled from the depositor.
    pub amount_a: TokenAmount,
    /// Gross token B pulled from the depositor.
    pub amount_b: TokenAmount,
    /// Token A kept as fee.
    pub fee_a: TokenAmount,
    /// Token B kept as fee.
    pub fee_b: TokenAmount,
    /// Percentage applied.
    pub fee_percent: FeePercent,
    pub fee_tier: FeeTier,
    pub tick_range: TickRange,
    /// Liquidity reported by the position manager.
    pub liquidity: u128,
}

/// Data for a rollback event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRolledBackData {
    pub token_a: Address,
    pub token_b: Address,
    /// Error that aborted the deposit.
    pub reason: String,
    /// Whether every compensating transfer succeeded.
    pub clean: bool,
}

/// Data for a fee update event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeePercentUpdatedData {
    pub old: FeePercent,
    pub new: FeePercent,
}
