//! Position registrar.
//!
//! Wraps the external position manager with a deadline and maps its failures
//! into provider errors.

mod position_registrar;

pub use position_registrar::*;
