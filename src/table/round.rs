//! Round state machine.
//!
//! ```text
//! Idle --play (has bets)--> Locked(Spinning) --spin settled--> Locked(Cooldown) --resume--> Idle
//! ```
//!
//! Spin and cooldown timing belong to the caller: the table only reacts to
//! [`RouletteTable::on_spin_settled`] and [`RouletteTable::on_resume_allowed`].

use crate::config::TableConfig;
use crate::errors::BetError;
use crate::table::chips::ChipSelector;
use crate::table::events::{EventBus, TableEvent};
use crate::table::ledger::BetLedger;
use crate::table::payout;
use crate::table::source::WinningNumberSource;
use crate::table::types::{BetSpot, LockPhase, Placement, PlacementId, RoundResult, RoundState};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

/// What a click on the layout did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    Placed(PlacementId),
    Removed(Placement),
    Nothing,
}

/// One roulette table: ledger, chip selector, lock and winning-number source
pub struct RouletteTable<S> {
    ledger: BetLedger,
    chips: ChipSelector,
    source: S,
    state: RoundState,
    rounds_played: u64,
    last_result: Option<RoundResult>,
    events: EventBus,
}

impl<S: WinningNumberSource> RouletteTable<S> {
    pub fn new(config: &TableConfig, source: S) -> Self {
        Self {
            ledger: BetLedger::new(config.limits),
            chips: ChipSelector::new(config.chips.denominations.clone()),
            source,
            state: RoundState::Idle,
            rounds_played: 0,
            last_result: None,
            events: EventBus::default(),
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Read-only view; mutations go through the table so the lock applies
    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    pub fn chips(&self) -> &ChipSelector {
        &self.chips
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn subscribe_ledger(&self) -> watch::Receiver<u64> {
        self.ledger.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TableEvent> {
        self.events.subscribe()
    }

    /// Whether a play request would start a spin
    pub fn can_play(&self) -> bool {
        !self.is_locked() && self.ledger.has_bets()
    }

    /// Whether undo/clear toolbar actions are meaningful
    pub fn can_edit(&self) -> bool {
        self.can_play()
    }

    fn ensure_unlocked(&self) -> Result<(), BetError> {
        if self.is_locked() {
            return Err(BetError::RoundLocked);
        }
        Ok(())
    }

    pub fn place_bet(&mut self, spot: BetSpot, amount: u64) -> Result<PlacementId, BetError> {
        self.ensure_unlocked()?;
        self.ledger.place(spot, amount)
    }

    pub fn undo(&mut self) -> Result<bool, BetError> {
        self.ensure_unlocked()?;
        Ok(self.ledger.undo())
    }

    pub fn remove_spot(&mut self, spot: &BetSpot) -> Result<u64, BetError> {
        self.ensure_unlocked()?;
        Ok(self.ledger.remove_spot(spot))
    }

    pub fn remove_top_stake(&mut self, spot: &BetSpot) -> Result<Option<Placement>, BetError> {
        self.ensure_unlocked()?;
        Ok(self.ledger.remove_top_stake(spot))
    }

    pub fn remove_placement(&mut self, placement: PlacementId) -> Result<Option<Placement>, BetError> {
        self.ensure_unlocked()?;
        Ok(self.ledger.remove_placement(placement))
    }

    /// Clear every bet and drop the chip selection
    pub fn clear(&mut self) -> Result<(), BetError> {
        self.ensure_unlocked()?;
        self.ledger.clear();
        self.chips.clear_selection();
        Ok(())
    }

    pub fn select_chip(&mut self, value: u64) -> Result<Option<u64>, BetError> {
        self.chips.select(value)
    }

    /// Click on a spot: stack the selected chip, or take the top chip off
    pub fn click_spot(&mut self, spot: BetSpot) -> Result<ClickAction, BetError> {
        self.ensure_unlocked()?;
        match self.chips.current() {
            Some(chip) => self.ledger.place(spot, chip).map(ClickAction::Placed),
            None => Ok(self
                .ledger
                .remove_top_stake(&spot)
                .map_or(ClickAction::Nothing, ClickAction::Removed)),
        }
    }

    /// Click on a placed chip: stack another chip on its spot, or remove it
    pub fn click_placement(&mut self, placement: PlacementId) -> Result<ClickAction, BetError> {
        self.ensure_unlocked()?;
        let Some(spot) = self.ledger.placement(placement).map(|p| p.spot) else {
            return Ok(ClickAction::Nothing);
        };
        match self.chips.current() {
            Some(chip) => self.ledger.place(spot, chip).map(ClickAction::Placed),
            None => Ok(self
                .ledger
                .remove_placement(placement)
                .map_or(ClickAction::Nothing, ClickAction::Removed)),
        }
    }

    /// Start a spin if the table is idle and has bets.
    ///
    /// Returns the winning number the presentation should land on. Requests
    /// that cannot start a round are ignored without any notification.
    pub fn on_play_requested(&mut self) -> Option<u8> {
        if !self.can_play() {
            debug!("Play request ignored (state {:?}, bets {})", self.state, self.ledger.has_bets());
            return None;
        }

        let winning_number = self.source.next_winning_number();
        self.state = RoundState::Locked(LockPhase::Spinning { winning_number });
        self.chips.set_locked(true);
        info!(
            "Round {} locked: {} staked on {} spot(s)",
            self.rounds_played + 1,
            self.ledger.total_stake(),
            self.ledger.spot_count()
        );
        self.events.publish(TableEvent::LockStateChanged { locked: true });
        Some(winning_number)
    }

    /// Resolve the frozen ledger once the spin has landed.
    ///
    /// Runs at most once per round; the ledger is cleared afterwards and the
    /// table stays locked until [`Self::on_resume_allowed`].
    pub fn on_spin_settled(&mut self) -> Option<RoundResult> {
        let RoundState::Locked(LockPhase::Spinning { winning_number }) = self.state else {
            return None;
        };

        self.rounds_played += 1;
        let mut result = payout::resolve(&self.ledger.snapshot(), winning_number);
        result.round = self.rounds_played;

        info!(
            "Round {} resolved: number {} | staked {} | profit {} | net {}",
            result.round, result.winning_number, result.total_stake, result.profit, result.net
        );

        self.ledger.clear();
        self.state = RoundState::Locked(LockPhase::Cooldown);
        self.last_result = Some(result.clone());
        self.events.publish(TableEvent::RoundResolved {
            result: result.clone(),
        });
        Some(result)
    }

    /// Tell subscribers that a resolved round could not be settled
    pub fn report_settlement_failure(&self, round: u64, reason: String) {
        self.events.publish(TableEvent::SettlementFailed { round, reason });
    }

    /// Unlock input after the cooldown. Ignored unless the round has resolved.
    pub fn on_resume_allowed(&mut self) -> bool {
        if self.state != RoundState::Locked(LockPhase::Cooldown) {
            debug!("Resume ignored in state {:?}", self.state);
            return false;
        }

        self.state = RoundState::Idle;
        self.chips.set_locked(false);
        info!("Table unlocked");
        self.events.publish(TableEvent::LockStateChanged { locked: false });
        true
    }
}
