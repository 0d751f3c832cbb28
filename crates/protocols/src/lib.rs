//! External collaborators of the liquidity provider.
//!
//! The provider never moves tokens or mints positions itself. It talks to:
//! - a [`TokenLedger`] offering ERC-20 style balances, allowances and transfers
//! - a [`PositionManager`] that mints concentrated liquidity positions
//!
//! In-memory implementations of both live in [`memory`] and back the tests,
//! the CLI demo and the default API server.

/// Token ledger seam.
pub mod ledger;
/// In-memory ledger and position manager.
pub mod memory;
/// Position manager seam.
pub mod position_manager;
/// Prelude module for convenient imports.
pub mod prelude;

pub use ledger::{LedgerError, TokenLedger};
pub use position_manager::{MintReceipt, PositionManager, PositionManagerError};
