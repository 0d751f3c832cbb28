//! Map-backed position repository.

use super::{PositionRepository, RepositoryError};
use async_trait::async_trait;
use clmm_provider_domain::{Address, PositionRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Position repository held in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPositionRepository {
    records: Arc<RwLock<HashMap<Address, PositionRecord>>>,
}

impl InMemoryPositionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PositionRepository for InMemoryPositionRepository {
    async fn find_by_owner(&self, owner: Address) -> Result<Option<PositionRecord>, RepositoryError> {
        Ok(self.records.read().await.get(&owner).copied())
    }

    async fn upsert(&self, owner: Address, record: PositionRecord) -> Result<(), RepositoryError> {
        self.records.write().await.insert(owner, record);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<(Address, PositionRecord)>, RepositoryError> {
        let mut all: Vec<_> = self
            .records
            .read()
            .await
            .iter()
            .map(|(owner, record)| (*owner, *record))
            .collect();
        all.sort_by_key(|(owner, _)| *owner);
        Ok(all)
    }
}
