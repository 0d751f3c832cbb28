//! Domain types for the fee-taking liquidity provider.
//!
//! Everything in this crate is plain data plus the pure fee arithmetic:
//! - Account and asset addresses, token amounts
//! - Fee percentage and the fee/net split of a deposit
//! - Fee tier and tick range pass-through parameters
//! - The per-owner position record
//! - The provider error taxonomy

/// Position records and liquidity request parameters.
pub mod entities;
/// Provider error taxonomy.
pub mod error;
/// Fee tier and fee split arithmetic.
pub mod fees;
/// Addresses and token amounts.
pub mod token;
/// Small value objects.
pub mod value_objects;

pub use entities::{AddLiquidityParams, MintParams, PositionRecord, TokenId};
pub use error::{ProviderError, ProviderResult};
pub use fees::{FeeSplit, FeeTier};
pub use token::{Address, AddressParseError, TokenAmount};
pub use value_objects::{FeePercent, TickRange};
