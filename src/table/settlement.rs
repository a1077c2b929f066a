//! Wallet settlement
//!
//! Chips are placed without touching the wallet; once a round resolves its
//! `net` is applied to the player's balance in one call. A failed settlement
//! is reported to the caller and never rewinds the round.
//!
//! Every call carries the round's settlement id. Retries reuse it, so a
//! wallet that applied a change but lost the reply must treat the repeat as
//! already done.

use crate::config::SettlementConfig;
use crate::errors::{SettlementError, WalletError};
use crate::table::types::RoundResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// External balance holder
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Current balance
    async fn balance(&self) -> Result<u64, WalletError>;

    /// Add winnings; returns the new balance.
    ///
    /// A repeated `settlement_id` must not be applied again.
    async fn credit(&self, settlement_id: &str, amount: u64) -> Result<u64, WalletError>;

    /// Remove losses; returns the new balance.
    ///
    /// A repeated `settlement_id` must not be applied again.
    async fn debit(&self, settlement_id: &str, amount: u64) -> Result<u64, WalletError>;
}

/// Direction of a balance adjustment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "amount", rename_all = "lowercase")]
pub enum BalanceAdjustment {
    Credit(u64),
    Debit(u64),
}

impl BalanceAdjustment {
    pub fn from_net(net: i64) -> Self {
        if net >= 0 {
            BalanceAdjustment::Credit(net.unsigned_abs())
        } else {
            BalanceAdjustment::Debit(net.unsigned_abs())
        }
    }
}

/// Completed balance adjustment for one round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementRecord {
    pub settlement_id: String,
    pub round: u64,
    pub adjustment: BalanceAdjustment,
    pub attempts: u32,
    pub balance_after: u64,
    pub completed_at: DateTime<Utc>,
}

/// Applies round results to a wallet with bounded retries
pub struct SettlementManager {
    wallet: Arc<dyn WalletService>,
    config: SettlementConfig,
}

impl SettlementManager {
    pub fn new(wallet: Arc<dyn WalletService>, config: SettlementConfig) -> Self {
        Self { wallet, config }
    }

    pub fn wallet(&self) -> &Arc<dyn WalletService> {
        &self.wallet
    }

    /// Apply a round's net to the wallet.
    ///
    /// Transient wallet failures are retried up to `max_attempts`; anything
    /// else fails immediately.
    pub async fn settle(&self, result: &RoundResult) -> Result<SettlementRecord, SettlementError> {
        let adjustment = BalanceAdjustment::from_net(result.net);
        let settlement_id = Uuid::new_v4().to_string();
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let outcome = match adjustment {
                BalanceAdjustment::Credit(amount) => self.wallet.credit(&settlement_id, amount).await,
                BalanceAdjustment::Debit(amount) => self.wallet.debit(&settlement_id, amount).await,
            };

            match outcome {
                Ok(balance_after) => {
                    info!(
                        "Round {} settled ({:?}) after {} attempt(s), balance {}",
                        result.round, adjustment, attempts, balance_after
                    );
                    return Ok(SettlementRecord {
                        settlement_id,
                        round: result.round,
                        adjustment,
                        attempts,
                        balance_after,
                        completed_at: Utc::now(),
                    });
                }
                Err(e) if e.is_transient() && attempts < max_attempts => {
                    warn!(
                        "Settlement of round {} failed (attempt {}/{}): {}",
                        result.round, attempts, max_attempts, e
                    );
                    tokio::time::sleep(self.config.retry_delay()).await;
                }
                Err(e) => {
                    warn!("Settlement of round {} abandoned: {}", result.round, e);
                    return Err(SettlementError::SettlementFailed {
                        round: result.round,
                        attempts,
                        source: e,
                    });
                }
            }
        }
    }
}

/// Process-local wallet for headless play and tests
pub struct InMemoryWallet {
    state: Mutex<WalletState>,
    failures_remaining: AtomicU32,
    lost_replies_remaining: AtomicU32,
}

#[derive(Default)]
struct WalletState {
    balance: u64,
    /// Balance after each applied settlement, by settlement id
    applied: HashMap<String, u64>,
}

impl InMemoryWallet {
    pub fn new(balance: u64) -> Self {
        Self {
            state: Mutex::new(WalletState {
                balance,
                ..WalletState::default()
            }),
            failures_remaining: AtomicU32::new(0),
            lost_replies_remaining: AtomicU32::new(0),
        }
    }

    /// Make the next `count` calls fail as unavailable before applying anything
    pub fn fail_next(&self, count: u32) {
        self.failures_remaining.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` adjustments apply but still report unavailable
    pub fn lose_next_replies(&self, count: u32) {
        self.lost_replies_remaining.store(count, Ordering::SeqCst);
    }

    fn take_one(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn check_available(&self) -> Result<(), WalletError> {
        if Self::take_one(&self.failures_remaining) {
            return Err(WalletError::Unavailable("wallet backend unreachable".to_string()));
        }
        Ok(())
    }

    async fn apply<F>(&self, settlement_id: &str, adjust: F) -> Result<u64, WalletError>
    where
        F: FnOnce(u64) -> Result<u64, WalletError>,
    {
        self.check_available()?;
        let mut state = self.state.lock().await;
        if let Some(balance_after) = state.applied.get(settlement_id) {
            return Ok(*balance_after);
        }

        let balance_after = adjust(state.balance)?;
        state.balance = balance_after;
        state.applied.insert(settlement_id.to_string(), balance_after);

        if Self::take_one(&self.lost_replies_remaining) {
            return Err(WalletError::Unavailable("reply lost after apply".to_string()));
        }
        Ok(balance_after)
    }
}

#[async_trait]
impl WalletService for InMemoryWallet {
    async fn balance(&self) -> Result<u64, WalletError> {
        self.check_available()?;
        Ok(self.state.lock().await.balance)
    }

    async fn credit(&self, settlement_id: &str, amount: u64) -> Result<u64, WalletError> {
        self.apply(settlement_id, |balance| {
            balance
                .checked_add(amount)
                .ok_or_else(|| WalletError::Rejected("balance overflow".to_string()))
        })
        .await
    }

    async fn debit(&self, settlement_id: &str, amount: u64) -> Result<u64, WalletError> {
        self.apply(settlement_id, |balance| {
            balance.checked_sub(amount).ok_or(WalletError::InsufficientFunds {
                balance,
                requested: amount,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(round: u64, net: i64) -> RoundResult {
        RoundResult {
            round,
            winning_number: 17,
            total_stake: 30,
            stake_won: 10,
            stake_lost: 20,
            profit: 350,
            net,
            is_red: false,
            is_green: false,
            outcomes: Vec::new(),
        }
    }

    fn config(max_attempts: u32) -> SettlementConfig {
        SettlementConfig {
            max_attempts,
            retry_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_credit_on_win() {
        let wallet = Arc::new(InMemoryWallet::new(1_000));
        let manager = SettlementManager::new(wallet.clone(), config(3));

        let record = manager.settle(&result(1, 330)).await.unwrap();

        assert_eq!(record.adjustment, BalanceAdjustment::Credit(330));
        assert_eq!(record.balance_after, 1_330);
        assert_eq!(record.attempts, 1);
        assert_eq!(wallet.balance().await.unwrap(), 1_330);
    }

    #[tokio::test]
    async fn test_debit_on_loss() {
        let wallet = Arc::new(InMemoryWallet::new(1_000));
        let manager = SettlementManager::new(wallet.clone(), config(3));

        let record = manager.settle(&result(2, -100)).await.unwrap();

        assert_eq!(record.adjustment, BalanceAdjustment::Debit(100));
        assert_eq!(record.balance_after, 900);
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let wallet = Arc::new(InMemoryWallet::new(0));
        wallet.fail_next(2);
        let manager = SettlementManager::new(wallet.clone(), config(3));

        let record = manager.settle(&result(3, 50)).await.unwrap();

        assert_eq!(record.attempts, 3);
        assert_eq!(record.balance_after, 50);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let wallet = Arc::new(InMemoryWallet::new(0));
        wallet.fail_next(5);
        let manager = SettlementManager::new(wallet.clone(), config(2));

        let err = manager.settle(&result(4, 50)).await.unwrap_err();

        match err {
            SettlementError::SettlementFailed { round, attempts, source } => {
                assert_eq!(round, 4);
                assert_eq!(attempts, 2);
                assert!(source.is_transient());
            }
        }
    }

    #[tokio::test]
    async fn test_insufficient_funds_not_retried() {
        let wallet = Arc::new(InMemoryWallet::new(10));
        let manager = SettlementManager::new(wallet.clone(), config(3));

        let err = manager.settle(&result(5, -100)).await.unwrap_err();

        assert_eq!(
            err,
            SettlementError::SettlementFailed {
                round: 5,
                attempts: 1,
                source: WalletError::InsufficientFunds {
                    balance: 10,
                    requested: 100
                },
            }
        );
        assert_eq!(wallet.balance().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_lost_reply_is_not_paid_twice() {
        let wallet = Arc::new(InMemoryWallet::new(1_000));
        wallet.lose_next_replies(1);
        let manager = SettlementManager::new(wallet.clone(), config(3));

        let record = manager.settle(&result(6, 330)).await.unwrap();

        assert_eq!(record.attempts, 2);
        assert_eq!(record.balance_after, 1_330);
        assert_eq!(wallet.balance().await.unwrap(), 1_330);
    }

    #[tokio::test]
    async fn test_repeated_settlement_id_applies_once() {
        let wallet = InMemoryWallet::new(100);

        assert_eq!(wallet.debit("round-1", 40).await.unwrap(), 60);
        assert_eq!(wallet.debit("round-1", 40).await.unwrap(), 60);
        assert_eq!(wallet.credit("round-2", 15).await.unwrap(), 75);
        assert_eq!(wallet.balance().await.unwrap(), 75);
    }

    #[tokio::test]
    async fn test_each_round_gets_its_own_id() {
        let wallet = Arc::new(InMemoryWallet::new(0));
        let manager = SettlementManager::new(wallet.clone(), config(1));

        let first = manager.settle(&result(7, 20)).await.unwrap();
        let second = manager.settle(&result(8, 20)).await.unwrap();

        assert_ne!(first.settlement_id, second.settlement_id);
        assert_eq!(wallet.balance().await.unwrap(), 40);
    }

    #[test]
    fn test_adjustment_from_net() {
        assert_eq!(BalanceAdjustment::from_net(0), BalanceAdjustment::Credit(0));
        assert_eq!(BalanceAdjustment::from_net(-7), BalanceAdjustment::Debit(7));
    }
}
