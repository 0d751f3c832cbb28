//! ERC-20 style token movement.

use async_trait::async_trait;
use clmm_provider_domain::{Address, ProviderError, TokenAmount};

/// Errors raised by a token ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The source account holds less than the transfer amount.
    #[error("ERC20: transfer amount exceeds balance")]
    InsufficientBalance,
    /// The spender was not approved for the transfer amount.
    #[error("ERC20: insufficient allowance")]
    InsufficientAllowance,
    /// The recipient balance would overflow.
    #[error("ERC20: balance overflow")]
    Overflow,
    /// The ledger could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl From<LedgerError> for ProviderError {
    fn from(err: LedgerError) -> Self {
        match err {
            // A missing approval is reported the same way as a missing balance:
            // the depositor did not make the funds available.
            LedgerError::InsufficientBalance | LedgerError::InsufficientAllowance => {
                ProviderError::InsufficientBalance(err.to_string())
            }
            LedgerError::Overflow => ProviderError::InvalidArgument(err.to_string()),
            LedgerError::Unavailable(msg) => ProviderError::Storage(msg),
        }
    }
}

/// Transfer-with-authorization primitive over many tokens.
///
/// Every mutating call is all-or-nothing: on error no balance or allowance
/// changed.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Balance of `account` in `token`.
    async fn balance_of(&self, token: Address, account: Address) -> TokenAmount;

    /// Amount `spender` may still move out of `owner`'s balance.
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> TokenAmount;

    /// Sets `spender`'s allowance over `owner`'s balance to `amount`.
    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;

    /// Moves `amount` of `from`'s own tokens to `to`.
    async fn transfer(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;

    /// Moves `amount` from `owner` to `recipient` on behalf of `spender`,
    /// consuming allowance.
    async fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        owner: Address,
        recipient: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError>;
}
