//! Repository implementations for position persistence.

mod memory_repository;
mod position_repository;

pub use memory_repository::InMemoryPositionRepository;
pub use position_repository::{PgPositionRepository, PositionRow};

use async_trait::async_trait;
use clmm_provider_domain::{Address, PositionRecord, ProviderError};
use sqlx::PgPool;
use std::sync::Arc;

/// Errors raised by a position repository.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The database rejected the query.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored row could not be decoded.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<RepositoryError> for ProviderError {
    fn from(err: RepositoryError) -> Self {
        ProviderError::Storage(err.to_string())
    }
}

/// Keyed store of one position record per owner. Writes replace.
#[async_trait]
pub trait PositionRepository: Send + Sync {
    /// Record for `owner`, if any.
    async fn find_by_owner(&self, owner: Address) -> Result<Option<PositionRecord>, RepositoryError>;

    /// Stores `record` for `owner`, replacing any previous one.
    async fn upsert(&self, owner: Address, record: PositionRecord) -> Result<(), RepositoryError>;

    /// Every stored record with its owner.
    async fn find_all(&self) -> Result<Vec<(Address, PositionRecord)>, RepositoryError>;
}

/// Database connection wrapper for repositories.
#[derive(Clone)]
pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    /// Creates a new Database wrapper from a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Creates a new database connection from a connection string.
    ///
    /// # Errors
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Creates a PgPositionRepository instance.
    #[must_use]
    pub fn positions(&self) -> PgPositionRepository {
        PgPositionRepository::new(self.pool.clone())
    }

    /// Runs database migrations.
    ///
    /// # Errors
    /// Returns an error if migrations fail.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(include_str!("../../migrations/001_positions.sql"))
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
