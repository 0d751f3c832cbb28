use crate::error::{ProviderError, ProviderResult};
use crate::fees::FeeTier;
use crate::token::{Address, TokenAmount};
use crate::value_objects::TickRange;
use serde::{Deserialize, Serialize};

/// A deposit request: two tokens, their amounts and the position shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidityParams {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: TokenAmount,
    pub amount_b: TokenAmount,
    pub fee_tier: FeeTier,
    pub tick_range: TickRange,
}

impl AddLiquidityParams {
    /// Checks the request shape before any token moves.
    ///
    /// Fee tier and ticks are not inspected.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.token_a == self.token_b {
            return Err(ProviderError::InvalidArgument(format!(
                "token_a and token_b must differ, both are {}",
                self.token_a
            )));
        }
        if self.amount_a.is_zero() || self.amount_b.is_zero() {
            return Err(ProviderError::InvalidArgument(
                "deposit amounts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// What the provider hands to the position manager after taking its fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintParams {
    pub token_a: Address,
    pub token_b: Address,
    pub fee_tier: FeeTier,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amount_a_desired: TokenAmount,
    pub amount_b_desired: TokenAmount,
    /// Account the minted position is credited to.
    pub recipient: Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(token_b: u64, amount_a: u64) -> AddLiquidityParams {
        AddLiquidityParams {
            token_a: Address::from_low_u64(1),
            token_b: Address::from_low_u64(token_b),
            amount_a: TokenAmount::from(amount_a),
            amount_b: TokenAmount::from(2000u64),
            fee_tier: FeeTier(3000),
            tick_range: TickRange::new(-60000, 60000),
        }
    }

    #[test]
    fn test_validate_accepts_distinct_tokens() {
        assert!(params(2, 1000).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_same_token() {
        assert!(matches!(
            params(1, 1000).validate(),
            Err(ProviderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        assert!(matches!(
            params(2, 0).validate(),
            Err(ProviderError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_ignores_inverted_ticks() {
        let mut p = params(2, 1000);
        p.tick_range = TickRange::new(100, -100);
        assert!(p.validate().is_ok());
    }
}
