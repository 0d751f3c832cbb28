//! Deposit workflow and fee configuration.

use super::{Ownership, ProviderConfig};
use crate::custody::{CustodyEngine, Deposit};
use crate::lifecycle::{
    DepositRolledBackData, FeePercentUpdatedData, LifecycleTracker, LiquidityAddedData,
};
use crate::registrar::PositionRegistrar;
use clmm_provider_data::PositionRepository;
use clmm_provider_domain::{
    AddLiquidityParams, Address, FeePercent, FeeSplit, MintParams, PositionRecord, ProviderError,
    ProviderResult, TokenAmount,
};
use clmm_provider_protocols::{PositionManager, TokenLedger};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Outcome of a committed deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddLiquidityReceipt {
    /// Record now stored for the caller.
    pub record: PositionRecord,
    /// Record it replaced, if the caller had one.
    pub replaced: Option<PositionRecord>,
    /// Fee split of token A.
    pub split_a: FeeSplit,
    /// Fee split of token B.
    pub split_b: FeeSplit,
    /// Percentage the split was computed with.
    pub fee_percent: FeePercent,
    /// Liquidity reported by the position manager.
    pub liquidity: u128,
}

/// Mutable provider state, guarded as one unit.
#[derive(Debug)]
struct ProviderState {
    fee_percent: FeePercent,
    /// Fees retained in custody so far, by token.
    accrued_fees: HashMap<Address, TokenAmount>,
}

impl ProviderState {
    /// Adds `fee` to the running total of `token`, saturating on overflow.
    fn accrue(&mut self, token: Address, fee: TokenAmount) {
        let entry = self.accrued_fees.entry(token).or_default();
        *entry = match entry.checked_add(fee) {
            Some(total) => total,
            None => {
                error!(
                    token = %token,
                    total = %entry,
                    fee = %fee,
                    "Accrued fee total overflowed, saturating"
                );
                entry.saturating_add(fee)
            }
        };
    }
}

/// Takes deposits, keeps a fee and commits the rest as a liquidity position.
///
/// Every mutating operation runs under one write lock, held across the call
/// to the position manager, so deposits and fee changes never interleave.
pub struct LiquidityProvider {
    /// Construction-time configuration.
    config: ProviderConfig,
    /// Owner check for privileged calls.
    ownership: Ownership,
    /// Custody of deposited tokens.
    custody: CustodyEngine,
    /// Position opening.
    registrar: PositionRegistrar,
    /// One position record per owner.
    repository: Arc<dyn PositionRepository>,
    /// Event history.
    lifecycle: Arc<LifecycleTracker>,
    /// Fee configuration and accrued fees.
    state: Arc<RwLock<ProviderState>>,
}

impl LiquidityProvider {
    /// Creates a provider owned by `owner`.
    pub fn new(
        owner: Address,
        config: ProviderConfig,
        ledger: Arc<dyn TokenLedger>,
        manager: Arc<dyn PositionManager>,
        repository: Arc<dyn PositionRepository>,
    ) -> Self {
        info!(
            owner = %owner,
            provider = %config.provider_address,
            position_manager = %config.position_manager,
            swap_router = %config.swap_router,
            settlement_asset = %config.settlement_asset,
            fee_percent = config.fee_percent.value(),
            "Liquidity provider configured"
        );

        Self {
            ownership: Ownership::new(owner),
            custody: CustodyEngine::new(ledger, config.provider_address),
            registrar: PositionRegistrar::new(manager, config.position_timeout()),
            repository,
            lifecycle: Arc::new(LifecycleTracker::with_capacity(config.max_events)),
            state: Arc::new(RwLock::new(ProviderState {
                fee_percent: config.fee_percent,
                accrued_fees: HashMap::new(),
            })),
            config,
        }
    }

    /// The privileged identity.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    /// Construction-time configuration. `fee_percent` here is the initial value.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Event history.
    #[must_use]
    pub fn lifecycle(&self) -> Arc<LifecycleTracker> {
        self.lifecycle.clone()
    }

    /// Current fee percentage.
    pub async fn fee_percent(&self) -> FeePercent {
        self.state.read().await.fee_percent
    }

    /// Position record of `owner`, if it ever deposited.
    pub async fn position(&self, owner: Address) -> ProviderResult<Option<PositionRecord>> {
        let _state = self.state.read().await;
        Ok(self.repository.find_by_owner(owner).await?)
    }

    /// Every stored position record with its owner.
    pub async fn positions(&self) -> ProviderResult<Vec<(Address, PositionRecord)>> {
        let _state = self.state.read().await;
        Ok(self.repository.find_all().await?)
    }

    /// Fees retained in custody for `token`.
    pub async fn accrued_fees(&self, token: Address) -> TokenAmount {
        self.state
            .read()
            .await
            .accrued_fees
            .get(&token)
            .copied()
            .unwrap_or_default()
    }

    /// Custody balance of `token`.
    pub async fn custody_balance(&self, token: Address) -> TokenAmount {
        let _state = self.state.read().await;
        self.custody.balance(token).await
    }

    /// Replaces the fee percentage. Owner only.
    ///
    /// Returns the previous percentage.
    ///
    /// # Errors
    /// `NotAuthorized` if `caller` is not the owner.
    pub async fn set_fee_percent(
        &self,
        caller: Address,
        new_percent: FeePercent,
    ) -> ProviderResult<FeePercent> {
        self.ownership.ensure_owner(caller)?;

        let old = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut state.fee_percent, new_percent)
        };

        self.lifecycle
            .record_fee_update(
                caller,
                FeePercentUpdatedData {
                    old,
                    new: new_percent,
                },
            )
            .await;
        Ok(old)
    }

    /// Pulls both deposits from `caller`, keeps the fee and opens a position
    /// with the net amounts, then records it as the caller's position.
    ///
    /// All or nothing: on any error every token movement is reverted and the
    /// caller's record is untouched.
    ///
    /// # Errors
    /// - `InvalidArgument` for identical tokens or a zero amount
    /// - `FeeExceedsDeposit` if the fee percentage is above 100
    /// - `InsufficientBalance` if balance or allowance does not cover a deposit
    /// - `PositionCreationFailed` / `PositionCreationTimedOut` from the registrar
    /// - `Storage` if the record cannot be written
    pub async fn add_liquidity(
        &self,
        caller: Address,
        params: AddLiquidityParams,
    ) -> ProviderResult<AddLiquidityReceipt> {
        params.validate()?;

        let mut state = self.state.write().await;
        let fee_percent = state.fee_percent;

        let mut deposit = Deposit::new(caller);
        match self
            .commit_deposit(&mut deposit, &params, fee_percent)
            .await
        {
            Ok(receipt) => {
                state.accrue(params.token_a, receipt.split_a.fee);
                state.accrue(params.token_b, receipt.split_b.fee);
                drop(state);

                self.lifecycle
                    .record_liquidity_added(
                        caller,
                        LiquidityAddedData {
                            token_id: receipt.record.token_id,
                            replaced: receipt.replaced.map(|r| r.token_id),
                            token_a: params.token_a,
                            token_b: params.token_b,
                            amount_a: params.amount_a,
                            amount_b: params.amount_b,
                            fee_a: receipt.split_a.fee,
                            fee_b: receipt.split_b.fee,
                            fee_percent,
                            fee_tier: params.fee_tier,
                            tick_range: params.tick_range,
                            liquidity: receipt.liquidity,
                        },
                    )
                    .await;
                Ok(receipt)
            }
            Err(err) => {
                let moved = deposit.has_moved_tokens();
                let clean = self.custody.rollback(deposit).await;
                drop(state);

                if moved {
                    self.lifecycle
                        .record_rollback(
                            caller,
                            DepositRolledBackData {
                                token_a: params.token_a,
                                token_b: params.token_b,
                                reason: err.to_string(),
                                clean,
                            },
                        )
                        .await;
                } else {
                    debug!(caller = %caller, error = %err, "Deposit refused");
                }
                Err(err)
            }
        }
    }

    /// Runs the deposit steps, logging every token movement in `deposit`.
    async fn commit_deposit(
        &self,
        deposit: &mut Deposit,
        params: &AddLiquidityParams,
        fee_percent: FeePercent,
    ) -> ProviderResult<AddLiquidityReceipt> {
        let caller = deposit.depositor();

        let split_a = FeeSplit::compute(params.amount_a, fee_percent)?;
        let split_b = FeeSplit::compute(params.amount_b, fee_percent)?;

        self.custody
            .ensure_available(caller, params.token_a, params.amount_a)
            .await?;
        self.custody
            .ensure_available(caller, params.token_b, params.amount_b)
            .await?;

        let replaced = self.repository.find_by_owner(caller).await?;

        self.custody
            .pull(deposit, params.token_a, params.amount_a)
            .await?;
        self.custody
            .pull(deposit, params.token_b, params.amount_b)
            .await?;

        debug!(
            caller = %caller,
            fee_percent = fee_percent.value(),
            fee_a = %split_a.fee,
            fee_b = %split_b.fee,
            net_a = %split_a.net,
            net_b = %split_b.net,
            "Fee split computed"
        );

        let manager = self.config.position_manager;
        self.custody
            .approve_forward(deposit, params.token_a, manager, split_a.net)
            .await?;
        self.custody
            .approve_forward(deposit, params.token_b, manager, split_b.net)
            .await?;

        let mint = MintParams {
            token_a: params.token_a,
            token_b: params.token_b,
            fee_tier: params.fee_tier,
            tick_lower: params.tick_range.lower,
            tick_upper: params.tick_range.upper,
            amount_a_desired: split_a.net,
            amount_b_desired: split_b.net,
            recipient: self.custody.address(),
        };
        let minted = self.registrar.open_position(&mint).await?;

        let record = PositionRecord::new(minted.token_id, params.token_a, params.token_b);
        if let Err(e) = self.repository.upsert(caller, record).await {
            error!(
                caller = %caller,
                token_id = %minted.token_id,
                error = %e,
                "Position minted but record not stored; position is orphaned"
            );
            return Err(ProviderError::from(e));
        }

        Ok(AddLiquidityReceipt {
            record,
            replaced,
            split_a,
            split_b,
            fee_percent,
            liquidity: minted.liquidity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::EventData;
    use async_trait::async_trait;
    use clmm_provider_data::{InMemoryPositionRepository, RepositoryError};
    use clmm_provider_domain::{FeeTier, TickRange, TokenId};
    use clmm_provider_protocols::memory::{InMemoryLedger, MockPositionManager};
    use clmm_provider_protocols::{LedgerError, PositionManagerError};
    use primitive_types::U256;
    use std::time::Duration;

    fn addr(v: u64) -> Address {
        Address::from_low_u64(v)
    }

    const OWNER: u64 = 1;
    const USER: u64 = 2;
    const OTHER: u64 = 3;
    const TOKEN_A: u64 = 0xa;
    const TOKEN_B: u64 = 0xb;
    const TOKEN_C: u64 = 0xc;

    struct Fixture {
        ledger: Arc<InMemoryLedger>,
        pm: Arc<MockPositionManager>,
        provider: Arc<LiquidityProvider>,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_repository(Arc::new(InMemoryPositionRepository::new()))
        }

        fn with_repository(repository: Arc<dyn PositionRepository>) -> Self {
            let ledger = Arc::new(InMemoryLedger::new());
            let pm = Arc::new(MockPositionManager::new());
            let config = ProviderConfig {
                position_timeout_ms: 100,
                ..Default::default()
            };
            let provider = Arc::new(LiquidityProvider::new(
                addr(OWNER),
                config,
                ledger.clone(),
                pm.clone(),
                repository,
            ));
            Self {
                ledger,
                pm,
                provider,
            }
        }

        fn custody(&self) -> Address {
            self.provider.config().provider_address
        }

        async fn fund(&self, who: u64, token: u64, amount: u64) {
            self.ledger
                .mint(addr(token), addr(who), amount.into())
                .await
                .unwrap();
        }

        async fn approve(&self, who: u64, token: u64, amount: u64) {
            self.ledger
                .approve(addr(token), addr(who), self.custody(), amount.into())
                .await
                .unwrap();
        }

        async fn fund_and_approve(&self, who: u64, amount_a: u64, amount_b: u64) {
            self.fund(who, TOKEN_A, amount_a).await;
            self.fund(who, TOKEN_B, amount_b).await;
            self.approve(who, TOKEN_A, amount_a).await;
            self.approve(who, TOKEN_B, amount_b).await;
        }

        async fn balance(&self, who: Address, token: u64) -> TokenAmount {
            self.ledger.balance_of(addr(token), who).await
        }

        async fn owners_with_records(&self) -> usize {
            let mut owners = 0;
            for who in [OWNER, USER, OTHER] {
                if self.provider.position(addr(who)).await.unwrap().is_some() {
                    owners += 1;
                }
            }
            owners
        }
    }

    fn params(amount_a: u64, amount_b: u64) -> AddLiquidityParams {
        AddLiquidityParams {
            token_a: addr(TOKEN_A),
            token_b: addr(TOKEN_B),
            amount_a: amount_a.into(),
            amount_b: amount_b.into(),
            fee_tier: FeeTier(3000),
            tick_range: TickRange::new(-60000, 60000),
        }
    }

    #[tokio::test]
    async fn test_add_liquidity_takes_fee_and_records_position() {
        let f = Fixture::new();
        f.fund_and_approve(USER, 1000, 2000).await;

        let receipt = f
            .provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap();

        // Custody holds the full deposit: fee retained, net only approved.
        assert_eq!(f.balance(f.custody(), TOKEN_A).await, 1000u64.into());
        assert_eq!(f.balance(f.custody(), TOKEN_B).await, 2000u64.into());
        assert!(f.balance(addr(USER), TOKEN_A).await.is_zero());

        assert_eq!(receipt.split_a.fee, 50u64.into());
        assert_eq!(receipt.split_b.fee, 100u64.into());
        assert_eq!(receipt.fee_percent, FeePercent::new(5));
        assert!(receipt.replaced.is_none());

        let minted = f.pm.minted().await;
        assert_eq!(minted.len(), 1);
        assert_eq!(minted[0].amount_a_desired, 950u64.into());
        assert_eq!(minted[0].amount_b_desired, 1900u64.into());
        assert_eq!(minted[0].fee_tier, FeeTier(3000));
        assert_eq!((minted[0].tick_lower, minted[0].tick_upper), (-60000, 60000));
        assert_eq!(minted[0].recipient, f.custody());

        let pm_address = f.provider.config().position_manager;
        assert_eq!(
            f.ledger.allowance(addr(TOKEN_A), f.custody(), pm_address).await,
            950u64.into()
        );

        let record = f.provider.position(addr(USER)).await.unwrap().unwrap();
        assert!(record.is_open());
        assert_eq!(record.token_a, addr(TOKEN_A));
        assert_eq!(record.token_b, addr(TOKEN_B));

        assert_eq!(f.provider.accrued_fees(addr(TOKEN_A)).await, 50u64.into());
        assert_eq!(f.provider.accrued_fees(addr(TOKEN_B)).await, 100u64.into());
        assert_eq!(f.provider.lifecycle().get_aggregate_stats().await.deposits, 1);
    }

    #[tokio::test]
    async fn test_add_liquidity_without_balance_fails() {
        let f = Fixture::new();
        f.approve(USER, TOKEN_A, 1000).await;
        f.approve(USER, TOKEN_B, 2000).await;

        let err = f
            .provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ProviderError::InsufficientBalance("ERC20: transfer amount exceeds balance".into())
        );
        assert!(f.provider.position(addr(USER)).await.unwrap().is_none());
        assert!(f.balance(f.custody(), TOKEN_A).await.is_zero());
        assert!(f.pm.minted().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_liquidity_without_approval_fails() {
        let f = Fixture::new();
        f.fund(USER, TOKEN_A, 1000).await;
        f.fund(USER, TOKEN_B, 2000).await;
        f.approve(USER, TOKEN_A, 1000).await;

        let err = f
            .provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::InsufficientBalance(_)));
        // The token A leg was never pulled.
        assert_eq!(f.balance(addr(USER), TOKEN_A).await, 1000u64.into());
        assert_eq!(
            f.ledger
                .allowance(addr(TOKEN_A), addr(USER), f.custody())
                .await,
            1000u64.into()
        );
        assert!(f.balance(f.custody(), TOKEN_A).await.is_zero());
    }

    #[tokio::test]
    async fn test_position_failure_rolls_everything_back() {
        let f = Fixture::new();
        f.fund_and_approve(USER, 1000, 2000).await;
        f.pm.fail_with(PositionManagerError::Rejected("pool not initialized".into()))
            .await;

        let err = f
            .provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::PositionCreationFailed(_)));
        assert_eq!(f.balance(addr(USER), TOKEN_A).await, 1000u64.into());
        assert_eq!(f.balance(addr(USER), TOKEN_B).await, 2000u64.into());
        assert!(f.balance(f.custody(), TOKEN_A).await.is_zero());
        assert!(f.balance(f.custody(), TOKEN_B).await.is_zero());

        let pm_address = f.provider.config().position_manager;
        assert!(
            f.ledger
                .allowance(addr(TOKEN_A), f.custody(), pm_address)
                .await
                .is_zero()
        );
        assert!(f.provider.position(addr(USER)).await.unwrap().is_none());
        assert!(f.provider.accrued_fees(addr(TOKEN_A)).await.is_zero());
        assert_eq!(f.provider.fee_percent().await, FeePercent::new(5));

        let stats = f.provider.lifecycle().get_aggregate_stats().await;
        assert_eq!(stats.rollbacks, 1);
        assert_eq!(stats.deposits, 0);
    }

    #[tokio::test]
    async fn test_failed_deposit_keeps_previous_record() {
        let f = Fixture::new();
        f.fund_and_approve(USER, 2000, 4000).await;

        f.provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap();
        let before = f.provider.position(addr(USER)).await.unwrap();
        let custody_before = f.balance(f.custody(), TOKEN_A).await;

        f.pm.fail_with(PositionManagerError::Unavailable("rpc down".into()))
            .await;
        assert!(
            f.provider
                .add_liquidity(addr(USER), params(1000, 2000))
                .await
                .is_err()
        );

        assert_eq!(f.provider.position(addr(USER)).await.unwrap(), before);
        assert_eq!(f.balance(f.custody(), TOKEN_A).await, custody_before);
        assert_eq!(f.provider.accrued_fees(addr(TOKEN_A)).await, 50u64.into());
    }

    #[tokio::test]
    async fn test_position_timeout_rolls_back() {
        let f = Fixture::new();
        f.fund_and_approve(USER, 1000, 2000).await;
        f.pm.set_delay(Some(Duration::from_secs(2))).await;

        let err = f
            .provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::PositionCreationTimedOut { timeout_ms: 100 });
        assert_eq!(f.balance(addr(USER), TOKEN_A).await, 1000u64.into());
        assert!(f.provider.position(addr(USER)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_deposit_overwrites_record() {
        let f = Fixture::new();
        f.fund_and_approve(USER, 1000, 2100).await;
        f.fund(USER, TOKEN_C, 500).await;
        f.approve(USER, TOKEN_C, 500).await;

        f.provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap();

        let second = AddLiquidityParams {
            token_a: addr(TOKEN_C),
            ..params(500, 100)
        };
        let receipt = f.provider.add_liquidity(addr(USER), second).await.unwrap();

        let record = f.provider.position(addr(USER)).await.unwrap().unwrap();
        assert_eq!(record.token_id, TokenId::new(2u64));
        assert_eq!(record.token_a, addr(TOKEN_C));
        assert_eq!(record.token_b, addr(TOKEN_B));
        assert_eq!(receipt.replaced.map(|r| r.token_id), Some(TokenId::new(1u64)));
        assert_eq!(f.owners_with_records().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_request_moves_nothing() {
        let f = Fixture::new();
        f.fund_and_approve(USER, 1000, 2000).await;

        let same_token = AddLiquidityParams {
            token_b: addr(TOKEN_A),
            ..params(1000, 1000)
        };
        assert!(matches!(
            f.provider.add_liquidity(addr(USER), same_token).await,
            Err(ProviderError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.provider.add_liquidity(addr(USER), params(0, 2000)).await,
            Err(ProviderError::InvalidArgument(_))
        ));

        assert_eq!(f.balance(addr(USER), TOKEN_A).await, 1000u64.into());
        assert_eq!(f.provider.lifecycle().all_events().await.len(), 0);
    }

    #[tokio::test]
    async fn test_records_are_kept_per_identity() {
        let f = Fixture::new();
        f.fund_and_approve(USER, 1000, 2000).await;
        f.fund_and_approve(OTHER, 1000, 2000).await;

        f.provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap();
        f.provider
            .add_liquidity(addr(OTHER), params(1000, 2000))
            .await
            .unwrap();

        let user = f.provider.position(addr(USER)).await.unwrap().unwrap();
        let other = f.provider.position(addr(OTHER)).await.unwrap().unwrap();
        assert_ne!(user.token_id, other.token_id);
        assert_eq!(f.owners_with_records().await, 2);
        assert_eq!(f.provider.accrued_fees(addr(TOKEN_A)).await, 100u64.into());
    }

    #[tokio::test]
    async fn test_owner_sets_fee_percent() {
        let f = Fixture::new();
        assert_eq!(f.provider.fee_percent().await, FeePercent::new(5));

        let old = f
            .provider
            .set_fee_percent(addr(OWNER), FeePercent::new(10))
            .await
            .unwrap();

        assert_eq!(old, FeePercent::new(5));
        assert_eq!(f.provider.fee_percent().await, FeePercent::new(10));

        f.fund_and_approve(USER, 1000, 2000).await;
        let receipt = f
            .provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap();
        assert_eq!(receipt.split_a.net, 900u64.into());
        assert_eq!(receipt.split_b.net, 1800u64.into());
    }

    #[tokio::test]
    async fn test_non_owner_cannot_set_fee_percent() {
        let f = Fixture::new();

        let err = f
            .provider
            .set_fee_percent(addr(USER), FeePercent::new(10))
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::NotAuthorized { caller: addr(USER) });
        assert_eq!(f.provider.fee_percent().await, FeePercent::new(5));
        assert_eq!(
            f.provider.lifecycle().get_aggregate_stats().await.fee_updates,
            0
        );
    }

    #[tokio::test]
    async fn test_fee_above_hundred_percent_refuses_deposits() {
        let f = Fixture::new();
        f.fund_and_approve(USER, 1000, 2000).await;
        f.provider
            .set_fee_percent(addr(OWNER), FeePercent::new(150))
            .await
            .unwrap();

        let err = f
            .provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::FeeExceedsDeposit { percent: 150 });
        assert_eq!(f.balance(addr(USER), TOKEN_A).await, 1000u64.into());
        assert!(f.pm.minted().await.is_empty());
    }

    #[tokio::test]
    async fn test_fee_change_waits_for_in_flight_deposit() {
        let f = Fixture::new();
        f.fund_and_approve(USER, 1000, 2000).await;
        f.pm.set_delay(Some(Duration::from_millis(60))).await;

        let provider = f.provider.clone();
        let deposit = tokio::spawn(async move {
            provider
                .add_liquidity(addr(USER), params(1000, 2000))
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        f.provider
            .set_fee_percent(addr(OWNER), FeePercent::new(10))
            .await
            .unwrap();

        let receipt = deposit.await.unwrap().unwrap();
        assert_eq!(receipt.fee_percent, FeePercent::new(5));
        assert_eq!(receipt.split_a.fee, 50u64.into());
        assert_eq!(f.provider.fee_percent().await, FeePercent::new(10));
    }

    struct FailingRepository;

    #[async_trait]
    impl PositionRepository for FailingRepository {
        async fn find_by_owner(
            &self,
            _owner: Address,
        ) -> Result<Option<PositionRecord>, RepositoryError> {
            Ok(None)
        }

        async fn upsert(
            &self,
            _owner: Address,
            _record: PositionRecord,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::Corrupt("disk full".into()))
        }

        async fn find_all(&self) -> Result<Vec<(Address, PositionRecord)>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back_tokens() {
        let f = Fixture::with_repository(Arc::new(FailingRepository));
        f.fund_and_approve(USER, 1000, 2000).await;

        let err = f
            .provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Storage(_)));
        assert_eq!(f.balance(addr(USER), TOKEN_A).await, 1000u64.into());
        assert!(f.balance(f.custody(), TOKEN_B).await.is_zero());
        assert!(f.provider.accrued_fees(addr(TOKEN_A)).await.is_zero());
    }

    #[tokio::test]
    async fn test_external_handles_are_held() {
        let f = Fixture::new();
        let config = f.provider.config();

        assert_eq!(f.provider.owner(), addr(OWNER));
        assert_eq!(config.swap_router, ProviderConfig::default().swap_router);
        assert_eq!(
            config.settlement_asset,
            ProviderConfig::default().settlement_asset
        );
        assert_eq!(config.position_timeout(), Duration::from_millis(100));
    }

    /// Delegates to an in-memory ledger but refuses to pull one token.
    struct StallingLedger {
        inner: InMemoryLedger,
        stalled: Address,
    }

    #[async_trait]
    impl TokenLedger for StallingLedger {
        async fn balance_of(&self, token: Address, account: Address) -> TokenAmount {
            self.inner.balance_of(token, account).await
        }

        async fn allowance(
            &self,
            token: Address,
            owner: Address,
            spender: Address,
        ) -> TokenAmount {
            self.inner.allowance(token, owner, spender).await
        }

        async fn approve(
            &self,
            token: Address,
            owner: Address,
            spender: Address,
            amount: TokenAmount,
        ) -> Result<(), LedgerError> {
            self.inner.approve(token, owner, spender, amount).await
        }

        async fn transfer(
            &self,
            token: Address,
            from: Address,
            to: Address,
            amount: TokenAmount,
        ) -> Result<(), LedgerError> {
            self.inner.transfer(token, from, to, amount).await
        }

        async fn transfer_from(
            &self,
            token: Address,
            spender: Address,
            owner: Address,
            recipient: Address,
            amount: TokenAmount,
        ) -> Result<(), LedgerError> {
            if token == self.stalled {
                return Err(LedgerError::Unavailable("token B contract reverted".into()));
            }
            self.inner
                .transfer_from(token, spender, owner, recipient, amount)
                .await
        }
    }

    #[tokio::test]
    async fn test_second_pull_failure_returns_first_token() {
        let inner = InMemoryLedger::new();
        let custody = ProviderConfig::default().provider_address;
        for (token, amount) in [(TOKEN_A, 1000u64), (TOKEN_B, 2000u64)] {
            inner
                .mint(addr(token), addr(USER), amount.into())
                .await
                .unwrap();
            inner
                .approve(addr(token), addr(USER), custody, amount.into())
                .await
                .unwrap();
        }
        let ledger = Arc::new(StallingLedger {
            inner,
            stalled: addr(TOKEN_B),
        });
        let pm = Arc::new(MockPositionManager::new());
        let provider = LiquidityProvider::new(
            addr(OWNER),
            ProviderConfig::default(),
            ledger.clone(),
            pm.clone(),
            Arc::new(InMemoryPositionRepository::new()),
        );

        let err = provider
            .add_liquidity(addr(USER), params(1000, 2000))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Storage(msg) if msg.contains("reverted")));
        assert_eq!(
            ledger.balance_of(addr(TOKEN_A), addr(USER)).await,
            1000u64.into()
        );
        assert_eq!(
            ledger.balance_of(addr(TOKEN_B), addr(USER)).await,
            2000u64.into()
        );
        assert!(ledger.balance_of(addr(TOKEN_A), custody).await.is_zero());
        assert!(provider.position(addr(USER)).await.unwrap().is_none());
        assert!(provider.accrued_fees(addr(TOKEN_A)).await.is_zero());
        assert!(pm.minted().await.is_empty());

        let events = provider.lifecycle().get_events(&addr(USER)).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0].data,
            EventData::DepositRolledBack(data) if data.clean
        ));
    }

    #[test]
    fn test_accrued_total_saturates() {
        let mut state = ProviderState {
            fee_percent: FeePercent::new(5),
            accrued_fees: HashMap::new(),
        };
        let token = addr(TOKEN_A);

        state.accrue(token, TokenAmount::new(U256::MAX - 10));
        state.accrue(token, 7u64.into());
        assert_eq!(state.accrued_fees[&token], TokenAmount::new(U256::MAX - 3));

        state.accrue(token, 50u64.into());
        assert_eq!(state.accrued_fees[&token], TokenAmount::new(U256::MAX));
    }
}
