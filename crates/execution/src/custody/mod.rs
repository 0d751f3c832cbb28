//! Custody of deposited tokens.
//!
//! Pulls deposits from the caller, grants the position manager an allowance
//! for the net amounts, and undoes both if the deposit does not commit.

mod engine;

pub use engine::*;
