//! In-memory collaborators.
//!
//! - [`InMemoryLedger`] keeps balances and allowances per token in a map
//! - [`MockPositionManager`] hands out increasing token ids and can be told
//!   to fail or stall

mod ledger;
mod position_manager;

pub use ledger::*;
pub use position_manager::*;
