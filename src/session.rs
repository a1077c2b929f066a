//! Timed round driver
//!
//! Plays the part of the presentation layer for headless runs: it waits out
//! the spin and cooldown on the tokio clock and settles each result with the
//! wallet between the two.

use crate::config::{RoundConfig, TableConfig};
use crate::errors::SettlementError;
use crate::table::round::RouletteTable;
use crate::table::settlement::{SettlementManager, SettlementRecord, WalletService};
use crate::table::source::WinningNumberSource;
use crate::table::types::RoundResult;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error};

/// One completed round and what happened to its settlement
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub result: RoundResult,
    pub settlement: Result<SettlementRecord, SettlementError>,
}

impl RoundOutcome {
    pub fn is_settled(&self) -> bool {
        self.settlement.is_ok()
    }
}

pub struct TableSession<S> {
    table: RouletteTable<S>,
    settlement: SettlementManager,
    timing: RoundConfig,
}

impl<S: WinningNumberSource> TableSession<S> {
    pub fn new(config: &TableConfig, source: S, wallet: Arc<dyn WalletService>) -> Self {
        Self {
            table: RouletteTable::new(config, source),
            settlement: SettlementManager::new(wallet, config.settlement),
            timing: config.round,
        }
    }

    pub fn table(&self) -> &RouletteTable<S> {
        &self.table
    }

    /// Table access for bet editing between rounds
    pub fn table_mut(&mut self) -> &mut RouletteTable<S> {
        &mut self.table
    }

    pub fn wallet(&self) -> &Arc<dyn WalletService> {
        self.settlement.wallet()
    }

    /// Run one full round: lock, spin, resolve, settle, cool down, unlock.
    ///
    /// Returns `None` when the table cannot start a round (locked or no bets).
    /// A settlement failure is reported in the outcome; the round itself
    /// has already resolved and the table still unlocks.
    pub async fn play_round(&mut self) -> Option<RoundOutcome> {
        let winning_number = self.table.on_play_requested()?;
        debug!("Spinning towards {}", winning_number);
        sleep(self.timing.spin_duration()).await;

        let result = self.table.on_spin_settled()?;
        let settlement = self.settlement.settle(&result).await;
        if let Err(e) = &settlement {
            error!("Round {} could not be settled: {}", result.round, e);
            self.table.report_settlement_failure(result.round, e.to_string());
        }

        sleep(self.timing.cooldown()).await;
        self.table.on_resume_allowed();

        Some(RoundOutcome { result, settlement })
    }
}
