//! The liquidity provider service.
//!
//! Ties custody, the position registrar, the owner check and the position
//! repository into the deposit workflow:
//! pull tokens, split the fee, open a position with the net amounts, record
//! it for the caller.

mod access;
mod config;
mod service;

pub use access::*;
pub use config::*;
pub use service::*;
