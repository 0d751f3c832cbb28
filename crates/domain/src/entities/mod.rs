pub mod liquidity;
pub mod position;

pub use liquidity::{AddLiquidityParams, MintParams};
pub use position::{PositionRecord, TokenId};
