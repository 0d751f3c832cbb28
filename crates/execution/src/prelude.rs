//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use clmm_provider_execution::prelude::*;
//! ```

// Custody
pub use crate::custody::{CustodyEngine, Deposit};

// Lifecycle
pub use crate::lifecycle::{
    AggregateStats, DepositRolledBackData, EventData, FeePercentUpdatedData, LifecycleEvent,
    LifecycleEventType, LifecycleTracker, LiquidityAddedData,
};

// Provider
pub use crate::provider::{AddLiquidityReceipt, LiquidityProvider, Ownership, ProviderConfig};

// Registrar
pub use crate::registrar::PositionRegistrar;
