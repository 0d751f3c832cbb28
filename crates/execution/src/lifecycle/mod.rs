//! Provider lifecycle tracking.
//!
//! Records what the provider did and for whom:
//! - Liquidity added (with the fee taken and the record replaced)
//! - Deposits rolled back
//! - Fee percentage changes

mod events;
mod tracker;

pub use events::*;
pub use tracker::*;
