//! PostgreSQL position repository.

use super::{PositionRepository, RepositoryError};
use async_trait::async_trait;
use clmm_provider_domain::{Address, PositionRecord, TokenId};
use primitive_types::U256;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::debug;

/// Database row for a position record.
///
/// Addresses are stored as `0x` hex text and the token id as decimal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRow {
    /// Owner address.
    pub owner: String,
    /// Position handle, decimal.
    pub token_id: String,
    /// Token A address.
    pub token_a: String,
    /// Token B address.
    pub token_b: String,
}

impl PositionRow {
    /// Creates a PositionRow from a database row.
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            owner: row.try_get("owner")?,
            token_id: row.try_get("token_id")?,
            token_a: row.try_get("token_a")?,
            token_b: row.try_get("token_b")?,
        })
    }

    /// Builds the row stored for `owner`.
    #[must_use]
    pub fn from_record(owner: Address, record: &PositionRecord) -> Self {
        Self {
            owner: owner.to_string(),
            token_id: record.token_id.to_string(),
            token_a: record.token_a.to_string(),
            token_b: record.token_b.to_string(),
        }
    }

    /// Decodes the row back into its owner and record.
    ///
    /// # Errors
    /// Returns `Corrupt` if any column does not parse.
    pub fn into_record(self) -> Result<(Address, PositionRecord), RepositoryError> {
        let parse_addr = |s: &str| {
            s.parse::<Address>()
                .map_err(|e| RepositoryError::Corrupt(e.to_string()))
        };
        let token_id = U256::from_dec_str(&self.token_id)
            .map_err(|_| RepositoryError::Corrupt(format!("invalid token id: {}", self.token_id)))?;

        Ok((
            parse_addr(&self.owner)?,
            PositionRecord::new(
                TokenId(token_id),
                parse_addr(&self.token_a)?,
                parse_addr(&self.token_b)?,
            ),
        ))
    }
}

/// Repository for position records in PostgreSQL.
#[derive(Clone)]
pub struct PgPositionRepository {
    pool: Arc<PgPool>,
}

impl PgPositionRepository {
    /// Creates a new PgPositionRepository.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PositionRepository for PgPositionRepository {
    async fn find_by_owner(&self, owner: Address) -> Result<Option<PositionRecord>, RepositoryError> {
        let row = sqlx::query("SELECT owner, token_id, token_a, token_b FROM positions WHERE owner = $1")
            .bind(owner.to_string())
            .fetch_optional(self.pool.as_ref())
            .await?;

        match row {
            Some(row) => {
                let (_, record) = PositionRow::from_row(&row)?.into_record()?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn upsert(&self, owner: Address, record: PositionRecord) -> Result<(), RepositoryError> {
        let row = PositionRow::from_record(owner, &record);
        sqlx::query(
            r#"
            INSERT INTO positions (owner, token_id, token_a, token_b)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (owner) DO UPDATE SET
                token_id = EXCLUDED.token_id,
                token_a = EXCLUDED.token_a,
                token_b = EXCLUDED.token_b,
                updated_at = NOW()
            "#,
        )
        .bind(&row.owner)
        .bind(&row.token_id)
        .bind(&row.token_a)
        .bind(&row.token_b)
        .execute(self.pool.as_ref())
        .await?;

        debug!(owner = %owner, token_id = %record.token_id, "Position record upserted");
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<(Address, PositionRecord)>, RepositoryError> {
        let rows = sqlx::query("SELECT owner, token_id, token_a, token_b FROM positions ORDER BY owner")
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.iter()
            .map(|row| PositionRow::from_row(row)?.into_record())
            .collect()
    }
}
