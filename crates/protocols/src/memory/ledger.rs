//! Map-backed token ledger.

use crate::ledger::{LedgerError, TokenLedger};
use async_trait::async_trait;
use clmm_provider_domain::{Address, TokenAmount};
use primitive_types::U256;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct LedgerState {
    /// (token, account) -> balance.
    balances: HashMap<(Address, Address), TokenAmount>,
    /// (token, owner, spender) -> allowance.
    allowances: HashMap<(Address, Address, Address), TokenAmount>,
}

impl LedgerState {
    fn balance(&self, token: Address, account: Address) -> TokenAmount {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or_default()
    }

    fn move_balance(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let from_balance = self
            .balance(token, from)
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance)?;
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance(token, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.balances.insert((token, from), from_balance);
        self.balances.insert((token, to), to_balance);
        Ok(())
    }
}

/// Token ledger held entirely in memory.
///
/// An allowance of `U256::MAX` is treated as unlimited and never decreases.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` of `token` to `to` out of thin air.
    pub async fn mint(
        &self,
        token: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        let balance = state
            .balance(token, to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        state.balances.insert((token, to), balance);
        debug!(token = %token, to = %to, amount = %amount, "Minted test tokens");
        Ok(())
    }
}

#[async_trait]
impl TokenLedger for InMemoryLedger {
    async fn balance_of(&self, token: Address, account: Address) -> TokenAmount {
        self.state.read().await.balance(token, account)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> TokenAmount {
        self.state
            .read()
            .await
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        if amount.is_zero() {
            state.allowances.remove(&(token, owner, spender));
        } else {
            state.allowances.insert((token, owner, spender), amount);
        }
        Ok(())
    }

    async fn transfer(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        self.state
            .write()
            .await
            .move_balance(token, from, to, amount)
    }

    async fn transfer_from(
        &self,
        token: Address,
        spender: Address,
        owner: Address,
        recipient: Address,
        amount: TokenAmount,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;

        let key = (token, owner, spender);
        let allowance = state.allowances.get(&key).copied().unwrap_or_default();
        let remaining = if allowance.as_u256() == U256::MAX {
            allowance
        } else {
            allowance
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientAllowance)?
        };

        state.move_balance(token, owner, recipient, amount)?;
        state.allowances.insert(key, remaining);
        Ok(())
    }
}
