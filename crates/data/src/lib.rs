//! Persistence of per-owner position records.
//!
//! The provider stores exactly one [`PositionRecord`] per owner through the
//! [`PositionRepository`] trait. Two implementations ship here:
//! - [`InMemoryPositionRepository`] for tests and single-process runs
//! - [`PgPositionRepository`] backed by PostgreSQL via sqlx
//!
//! [`PositionRecord`]: clmm_provider_domain::PositionRecord

/// Repository implementations.
pub mod repositories;

pub use repositories::{
    Database, InMemoryPositionRepository, PgPositionRepository, PositionRepository,
    PositionRow, RepositoryError,
};
