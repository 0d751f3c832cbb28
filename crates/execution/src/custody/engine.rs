//! Custody engine and per-deposit undo log.

use clmm_provider_domain::{Address, ProviderResult, TokenAmount};
use clmm_provider_protocols::{LedgerError, TokenLedger};
use std::sync::Arc;
use tracing::{debug, error};

/// One token movement made while handling a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CustodyStep {
    /// `amount` of `token` moved from the depositor into custody.
    Pulled { token: Address, amount: TokenAmount },
    /// `spender` was approved over custody's `token`; `previous` was the
    /// allowance before.
    Approved {
        token: Address,
        spender: Address,
        previous: TokenAmount,
    },
}

/// Undo log of the token movements made for one deposit.
#[derive(Debug)]
pub struct Deposit {
    depositor: Address,
    steps: Vec<CustodyStep>,
}

impl Deposit {
    /// Starts an empty undo log for `depositor`.
    #[must_use]
    pub fn new(depositor: Address) -> Self {
        Self {
            depositor,
            steps: Vec::new(),
        }
    }

    /// Identity the tokens came from.
    #[must_use]
    pub fn depositor(&self) -> Address {
        self.depositor
    }

    /// Returns true once any token movement was made.
    #[must_use]
    pub fn has_moved_tokens(&self) -> bool {
        !self.steps.is_empty()
    }
}

/// Moves tokens in and out of the provider's custody account.
pub struct CustodyEngine {
    /// Token ledger.
    ledger: Arc<dyn TokenLedger>,
    /// Account holding custody.
    custody: Address,
}

impl CustodyEngine {
    /// Creates a custody engine holding funds at `custody`.
    pub fn new(ledger: Arc<dyn TokenLedger>, custody: Address) -> Self {
        Self { ledger, custody }
    }

    /// Custody account address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.custody
    }

    /// Custody balance of `token`.
    pub async fn balance(&self, token: Address) -> TokenAmount {
        self.ledger.balance_of(token, self.custody).await
    }

    /// Checks that `depositor` approved and holds `amount` of `token`.
    ///
    /// Lets a deposit fail before its first leg moves, so a refused deposit
    /// leaves allowances untouched.
    ///
    /// # Errors
    /// `InsufficientBalance` carrying the ledger's allowance or balance
    /// message.
    pub async fn ensure_available(
        &self,
        depositor: Address,
        token: Address,
        amount: TokenAmount,
    ) -> ProviderResult<()> {
        if self.ledger.allowance(token, depositor, self.custody).await < amount {
            return Err(LedgerError::InsufficientAllowance.into());
        }
        if self.ledger.balance_of(token, depositor).await < amount {
            return Err(LedgerError::InsufficientBalance.into());
        }
        Ok(())
    }

    /// Pulls `amount` of `token` from the depositor into custody.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if the depositor's balance or allowance
    /// does not cover `amount`. Nothing is logged in `deposit` then.
    pub async fn pull(
        &self,
        deposit: &mut Deposit,
        token: Address,
        amount: TokenAmount,
    ) -> ProviderResult<()> {
        self.ledger
            .transfer_from(token, self.custody, deposit.depositor, self.custody, amount)
            .await?;
        deposit.steps.push(CustodyStep::Pulled { token, amount });

        debug!(
            depositor = %deposit.depositor,
            token = %token,
            amount = %amount,
            "Deposit pulled into custody"
        );
        Ok(())
    }

    /// Lets `spender` move `amount` of custody's `token`.
    pub async fn approve_forward(
        &self,
        deposit: &mut Deposit,
        token: Address,
        spender: Address,
        amount: TokenAmount,
    ) -> ProviderResult<()> {
        let previous = self.ledger.allowance(token, self.custody, spender).await;
        self.ledger
            .approve(token, self.custody, spender, amount)
            .await?;
        deposit.steps.push(CustodyStep::Approved {
            token,
            spender,
            previous,
        });

        debug!(token = %token, spender = %spender, amount = %amount, "Net amount approved");
        Ok(())
    }

    /// Undoes every step of `deposit`, newest first.
    ///
    /// Returns false if any compensating call failed; the remaining steps
    /// are still attempted.
    pub async fn rollback(&self, deposit: Deposit) -> bool {
        let mut clean = true;

        for step in deposit.steps.into_iter().rev() {
            let result = match step {
                CustodyStep::Pulled { token, amount } => {
                    self.ledger
                        .transfer(token, self.custody, deposit.depositor, amount)
                        .await
                }
                CustodyStep::Approved {
                    token,
                    spender,
                    previous,
                } => {
                    self.ledger
                        .approve(token, self.custody, spender, previous)
                        .await
                }
            };

            if let Err(e) = result {
                error!(
                    depositor = %deposit.depositor,
                    step = ?step,
                    error = %e,
                    "Compensating custody step failed"
                );
                clean = false;
            }
        }

        clean
    }
}
