//! Lifecycle tracker for provider history.

use super::{
    DepositRolledBackData, EventData, FeePercentUpdatedData, LifecycleEvent, LifecycleEventType,
    LiquidityAddedData,
};
use clmm_provider_domain::Address;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Events kept when no limit is configured.
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

/// Retained events plus counters that survive trimming.
#[derive(Debug, Default)]
struct TrackerState {
    /// Most recent events, oldest first.
    events: VecDeque<LifecycleEvent>,
    /// Totals over every event ever recorded.
    stats: AggregateStats,
    /// Identities seen.
    actors: HashSet<Address>,
}

/// Tracks lifecycle events for every identity that touched the provider.
///
/// Only the newest `max_events` events are kept; aggregate stats count
/// everything recorded since start.
pub struct LifecycleTracker {
    state: Arc<RwLock<TrackerState>>,
    max_events: usize,
}

impl LifecycleTracker {
    /// Creates a tracker keeping [`DEFAULT_MAX_EVENTS`] events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_EVENTS)
    }

    /// Creates a tracker keeping at most `max_events` events.
    #[must_use]
    pub fn with_capacity(max_events: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(TrackerState::default())),
            max_events: max_events.max(1),
        }
    }

    /// Records a liquidity added event.
    pub async fn record_liquidity_added(&self, actor: Address, data: LiquidityAddedData) {
        info!(
            caller = %actor,
            token_id = %data.token_id,
            replaced = ?data.replaced.map(|id| id.to_string()),
            fee_a = %data.fee_a,
            fee_b = %data.fee_b,
            "Liquidity added"
        );

        let event = LifecycleEvent::new(
            LifecycleEventType::LiquidityAdded,
            actor,
            EventData::LiquidityAdded(data),
        );
        self.add_event(event).await;
    }

    /// Records a rolled back deposit.
    pub async fn record_rollback(&self, actor: Address, data: DepositRolledBackData) {
        warn!(
            caller = %actor,
            reason = %data.reason,
            clean = data.clean,
            "Deposit rolled back"
        );

        let event = LifecycleEvent::new(
            LifecycleEventType::DepositRolledBack,
            actor,
            EventData::DepositRolledBack(data),
        );
        self.add_event(event).await;
    }

    /// Records a fee percentage change.
    pub async fn record_fee_update(&self, actor: Address, data: FeePercentUpdatedData) {
        info!(
            owner = %actor,
            old = data.old.value(),
            new = data.new.value(),
            "Fee percent updated"
        );

        let event = LifecycleEvent::new(
            LifecycleEventType::FeePercentUpdated,
            actor,
            EventData::FeePercentUpdated(data),
        );
        self.add_event(event).await;
    }

    /// Adds an event, dropping the oldest once full.
    async fn add_event(&self, event: LifecycleEvent) {
        let mut state = self.state.write().await;

        match event.event_type {
            LifecycleEventType::LiquidityAdded => state.stats.deposits += 1,
            LifecycleEventType::DepositRolledBack => state.stats.rollbacks += 1,
            LifecycleEventType::FeePercentUpdated => state.stats.fee_updates += 1,
        }
        if state.actors.insert(event.actor) {
            state.stats.distinct_actors += 1;
        }

        if state.events.len() == self.max_events {
            if let Some(dropped) = state.events.pop_front() {
                debug!(event_id = %dropped.id, "Oldest lifecycle event dropped");
            }
        }
        state.events.push_back(event);
    }

    /// Gets the retained events triggered by `actor`.
    pub async fn get_events(&self, actor: &Address) -> Vec<LifecycleEvent> {
        self.state
            .read()
            .await
            .events
            .iter()
            .filter(|e| e.actor == *actor)
            .cloned()
            .collect()
    }

    /// Gets every retained event, oldest first.
    pub async fn all_events(&self) -> Vec<LifecycleEvent> {
        self.state.read().await.events.iter().cloned().collect()
    }

    /// Gets aggregate statistics.
    pub async fn get_aggregate_stats(&self) -> AggregateStats {
        self.state.read().await.stats.clone()
    }
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate statistics across all events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    /// Committed deposits.
    pub deposits: u32,
    /// Deposits reverted after tokens moved.
    pub rollbacks: u32,
    /// Fee percentage changes.
    pub fee_updates: u32,
    /// Identities seen.
    pub distinct_actors: u32,
}
