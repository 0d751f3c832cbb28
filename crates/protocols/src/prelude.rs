//! Prelude module for convenient imports.
//!
//! ```rust
//! use clmm_provider_protocols::prelude::*;
//! ```

pub use crate::ledger::{LedgerError, TokenLedger};
pub use crate::memory::{InMemoryLedger, MockPositionManager};
pub use crate::position_manager::{MintReceipt, PositionManager, PositionManagerError};
