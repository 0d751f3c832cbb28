//! Scriptable position manager.

use crate::position_manager::{MintReceipt, PositionManager, PositionManagerError};
use async_trait::async_trait;
use clmm_provider_domain::{MintParams, TokenId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Position manager that mints positions in memory.
///
/// It does not pull the net amounts from the caller; it only records the
/// request, the way a stub contract would in a test deployment.
#[derive(Debug)]
pub struct MockPositionManager {
    /// Next token id to hand out.
    next_id: AtomicU64,
    /// Every accepted mint request, in order.
    mints: Arc<RwLock<Vec<MintParams>>>,
    /// Error returned by every mint while set.
    failure: Arc<RwLock<Option<PositionManagerError>>>,
    /// Artificial latency before answering.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockPositionManager {
    /// Creates a position manager whose first token id is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            mints: Arc::new(RwLock::new(Vec::new())),
            failure: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Makes every following mint fail with `err` until cleared.
    pub async fn fail_with(&self, err: PositionManagerError) {
        *self.failure.write().await = Some(err);
    }

    /// Stops failing mints.
    pub async fn clear_failure(&self) {
        *self.failure.write().await = None;
    }

    /// Delays every following mint by `delay`.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Accepted mint requests so far.
    pub async fn minted(&self) -> Vec<MintParams> {
        self.mints.read().await.clone()
    }
}

impl Default for MockPositionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PositionManager for MockPositionManager {
    async fn mint(&self, params: &MintParams) -> Result<MintReceipt, PositionManagerError> {
        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            debug!(delay_ms = delay.as_millis() as u64, "Delaying mint");
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.failure.read().await.clone() {
            return Err(err);
        }

        if params.tick_lower >= params.tick_upper {
            return Err(PositionManagerError::Rejected(format!(
                "tick_lower {} must be below tick_upper {}",
                params.tick_lower, params.tick_upper
            )));
        }

        let token_id = TokenId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let liquidity = params
            .amount_a_desired
            .as_u256()
            .min(params.amount_b_desired.as_u256())
            .low_u128();

        self.mints.write().await.push(*params);

        info!(
            token_id = %token_id,
            recipient = %params.recipient,
            fee_tier = %params.fee_tier,
            "Position minted"
        );

        Ok(MintReceipt {
            token_id,
            liquidity,
            amount_a: params.amount_a_desired,
            amount_b: params.amount_b_desired,
        })
    }
}
