//! API request/response models.
//!
//! Amounts and token ids travel as decimal strings so they survive JSON
//! clients that cannot hold 256-bit integers.

use crate::error::ApiError;
use clmm_provider_domain::{
    AddLiquidityParams, Address, FeeSplit, FeeTier, PositionRecord, TickRange, TokenAmount,
};
use clmm_provider_execution::provider::AddLiquidityReceipt;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Parses a decimal amount string.
///
/// # Errors
/// Returns `BadRequest` if `raw` is not a decimal integer that fits 256 bits.
pub fn parse_amount(field: &str, raw: &str) -> Result<TokenAmount, ApiError> {
    U256::from_dec_str(raw.trim())
        .map(TokenAmount)
        .map_err(|_| ApiError::BadRequest(format!("{field} is not a decimal amount: {raw}")))
}

/// Parses an address path or body field.
///
/// # Errors
/// Returns `BadRequest` if `raw` is not a 20-byte hex address.
pub fn parse_address(field: &str, raw: &str) -> Result<Address, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("{field} is not an address: {raw}")))
}

/// Current fee percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeePercentResponse {
    /// Whole percent retained from each deposit.
    pub fee_percent: u32,
}

/// Request to change the fee percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFeePercentRequest {
    /// New whole percent.
    pub fee_percent: u32,
}

/// Result of a fee percentage change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFeePercentResponse {
    /// Percentage before the change.
    pub old_fee_percent: u32,
    /// Percentage now in force.
    pub fee_percent: u32,
}

/// Request to deposit a token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLiquidityRequest {
    /// First token address.
    pub token_a: String,
    /// Second token address.
    pub token_b: String,
    /// Gross amount of token A, decimal.
    pub amount_a: String,
    /// Gross amount of token B, decimal.
    pub amount_b: String,
    /// Pool fee tier, e.g. 3000.
    pub fee_tier: u32,
    /// Lower tick.
    pub tick_lower: i32,
    /// Upper tick.
    pub tick_upper: i32,
}

impl AddLiquidityRequest {
    /// Converts the request into deposit parameters.
    ///
    /// # Errors
    /// Returns `BadRequest` for malformed addresses or amounts.
    pub fn into_params(self) -> Result<AddLiquidityParams, ApiError> {
        Ok(AddLiquidityParams {
            token_a: parse_address("token_a", &self.token_a)?,
            token_b: parse_address("token_b", &self.token_b)?,
            amount_a: parse_amount("amount_a", &self.amount_a)?,
            amount_b: parse_amount("amount_b", &self.amount_b)?,
            fee_tier: FeeTier(self.fee_tier),
            tick_range: TickRange::new(self.tick_lower, self.tick_upper),
        })
    }
}

/// Fee split of one token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitResponse {
    /// Amount pulled from the caller.
    pub gross: String,
    /// Amount kept by the provider.
    pub fee: String,
    /// Amount committed to the position.
    pub net: String,
}

impl From<FeeSplit> for SplitResponse {
    fn from(split: FeeSplit) -> Self {
        Self {
            gross: split.gross.to_string(),
            fee: split.fee.to_string(),
            net: split.net.to_string(),
        }
    }
}

/// A stored position record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionResponse {
    /// Identity the record belongs to.
    pub owner: String,
    /// Position handle, decimal.
    pub token_id: String,
    /// First token address.
    pub token_a: String,
    /// Second token address.
    pub token_b: String,
}

impl PositionResponse {
    /// Builds a response for `owner`'s record.
    pub fn new(owner: Address, record: &PositionRecord) -> Self {
        Self {
            owner: owner.to_string(),
            token_id: record.token_id.to_string(),
            token_a: record.token_a.to_string(),
            token_b: record.token_b.to_string(),
        }
    }
}

/// Every stored position record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionsResponse {
    /// Records, one per identity.
    pub positions: Vec<PositionResponse>,
    /// Number of records.
    pub total: usize,
}

impl PositionsResponse {
    /// Builds a listing from `(owner, record)` pairs.
    pub fn new(records: &[(Address, PositionRecord)]) -> Self {
        let positions: Vec<_> = records
            .iter()
            .map(|(owner, record)| PositionResponse::new(*owner, record))
            .collect();
        Self {
            total: positions.len(),
            positions,
        }
    }
}

/// Result of a committed deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLiquidityResponse {
    /// Record now stored for the caller.
    pub position: PositionResponse,
    /// Token id of the record it replaced.
    pub replaced_token_id: Option<String>,
    /// Split of token A.
    pub token_a: SplitResponse,
    /// Split of token B.
    pub token_b: SplitResponse,
    /// Percentage the split was computed with.
    pub fee_percent: u32,
    /// Liquidity reported by the position manager, decimal.
    pub liquidity: String,
}

impl AddLiquidityResponse {
    /// Builds a response from the provider's receipt.
    pub fn new(caller: Address, receipt: &AddLiquidityReceipt) -> Self {
        Self {
            position: PositionResponse::new(caller, &receipt.record),
            replaced_token_id: receipt.replaced.map(|r| r.token_id.to_string()),
            token_a: receipt.split_a.into(),
            token_b: receipt.split_b.into(),
            fee_percent: receipt.fee_percent.value(),
            liquidity: receipt.liquidity.to_string(),
        }
    }
}

/// Fees held for one token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccruedFeesResponse {
    /// Token address.
    pub token: String,
    /// Fees retained from deposits so far, decimal.
    pub accrued: String,
    /// Provider's current balance of the token, decimal.
    pub custody_balance: String,
}

/// Event query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsQuery {
    /// Only events triggered by this address.
    pub actor: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Privileged identity.
    pub owner: String,
    /// Current fee percentage.
    pub fee_percent: u32,
}
