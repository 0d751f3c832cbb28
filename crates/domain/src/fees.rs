use crate::error::{ProviderError, ProviderResult};
use crate::token::TokenAmount;
use crate::value_objects::FeePercent;
use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pool fee tier selector, e.g. 3000 for the 0.3% tier.
///
/// Opaque to the provider: it is forwarded to the position manager as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeTier(pub u32);

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split of one deposited amount into the retained fee and the forwarded net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Amount pulled from the depositor.
    pub gross: TokenAmount,
    /// Amount kept in custody, `floor(gross * percent / 100)`.
    pub fee: TokenAmount,
    /// Amount forwarded to the position manager.
    pub net: TokenAmount,
}

impl FeeSplit {
    /// Computes the fee split of `gross` at `percent`.
    ///
    /// # Errors
    /// Returns `FeeExceedsDeposit` when the percentage is above 100 and the
    /// fee would be larger than the deposit itself.
    pub fn compute(gross: TokenAmount, percent: FeePercent) -> ProviderResult<Self> {
        let scaled: U512 = gross.as_u256().full_mul(U256::from(percent.value()));
        let fee = U256::try_from(scaled / U512::from(100u64))
            .map_err(|_| ProviderError::FeeExceedsDeposit { percent: percent.value() })?;
        let fee = TokenAmount::new(fee);
        let net = gross
            .checked_sub(fee)
            .ok_or(ProviderError::FeeExceedsDeposit { percent: percent.value() })?;

        Ok(Self { gross, fee, net })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_split_floors() {
        let split = FeeSplit::compute(TokenAmount::from(1000u64), FeePercent::new(5)).unwrap();
        assert_eq!(split.fee, TokenAmount::from(50u64));
        assert_eq!(split.net, TokenAmount::from(950u64));

        // 999 * 5 / 100 = 49.95
        let split = FeeSplit::compute(TokenAmount::from(999u64), FeePercent::new(5)).unwrap();
        assert_eq!(split.fee, TokenAmount::from(49u64));
        assert_eq!(split.net, TokenAmount::from(950u64));
    }

    #[test]
    fn test_fee_split_bounds() {
        let zero = FeeSplit::compute(TokenAmount::from(2000u64), FeePercent::new(0)).unwrap();
        assert_eq!(zero.fee, TokenAmount::zero());
        assert_eq!(zero.net, TokenAmount::from(2000u64));

        let full = FeeSplit::compute(TokenAmount::from(2000u64), FeePercent::new(100)).unwrap();
        assert_eq!(full.fee, TokenAmount::from(2000u64));
        assert!(full.net.is_zero());

        let over = FeeSplit::compute(TokenAmount::from(2000u64), FeePercent::new(101));
        assert!(matches!(
            over,
            Err(ProviderError::FeeExceedsDeposit { percent: 101 })
        ));
    }

    #[test]
    fn test_fee_split_large_amounts() {
        let split = FeeSplit::compute(TokenAmount::new(U256::MAX), FeePercent::new(100)).unwrap();
        assert_eq!(split.fee, TokenAmount::new(U256::MAX));

        let split = FeeSplit::compute(TokenAmount::new(U256::MAX), FeePercent::new(1)).unwrap();
        assert_eq!(split.fee.as_u256(), U256::MAX / 100);
        assert_eq!(split.fee.checked_add(split.net), Some(TokenAmount::new(U256::MAX)));
    }
}
