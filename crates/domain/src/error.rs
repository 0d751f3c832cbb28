use crate::token::Address;

/// Result alias used across the provider.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Every way a provider operation can fail.
///
/// Failures are terminal for the call that produced them; nothing retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The depositor's balance or allowance could not cover the transfer.
    /// Carries the transfer primitive's own message.
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),
    /// The caller is not allowed to perform a privileged operation.
    #[error("caller {caller} is not authorized")]
    NotAuthorized { caller: Address },
    /// The position manager rejected or failed the mint.
    #[error("position creation failed: {0}")]
    PositionCreationFailed(String),
    /// The position manager did not answer in time.
    #[error("position creation timed out after {timeout_ms} ms")]
    PositionCreationTimedOut { timeout_ms: u64 },
    /// The request was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The configured fee percentage would take more than the deposit.
    #[error("fee of {percent}% exceeds the deposited amount")]
    FeeExceedsDeposit { percent: u32 },
    /// The position record could not be persisted.
    #[error("storage error: {0}")]
    Storage(String),
}

impl ProviderError {
    /// Returns true for failures of the position-opening step.
    #[must_use]
    pub fn is_position_failure(&self) -> bool {
        matches!(
            self,
            Self::PositionCreationFailed(_) | Self::PositionCreationTimedOut { .. }
        )
    }
}
