//! Liquidity provisioning engine.
//!
//! This crate provides the provider service and its parts:
//! - Custody of deposits with an undo log for rollback
//! - Fee extraction at the configured percentage
//! - Position opening through the external position manager, with a deadline
//! - Owner-only fee configuration
//! - Lifecycle event history

/// Prelude module for convenient imports.
pub mod prelude;

/// Custody of deposited tokens.
pub mod custody;
/// Provider lifecycle tracking.
pub mod lifecycle;
/// The provider service and its configuration.
pub mod provider;
/// Position registrar.
pub mod registrar;
