//! Bet ledger: staked amounts per spot plus the ordered placement history.
//!
//! The ledger is the only owner of placement records. Presentation layers keep
//! chip visuals keyed by [`PlacementId`] and learn about changes through the
//! revision channel returned by [`BetLedger::subscribe`]. The channel is
//! level-triggered: it carries a counter, not a diff.

use crate::config::LimitConfig;
use crate::errors::BetError;
use crate::table::types::{BetSpot, Placement, PlacementId, SpotId};
use serde::Serialize;
use std::collections::BTreeMap;
use tokio::sync::watch;
use tracing::debug;

/// Spot totals and placement history for one round
pub struct BetLedger {
    totals: BTreeMap<SpotId, (BetSpot, u64)>,
    /// Insertion order is undo order
    placements: Vec<Placement>,
    total_stake: u64,
    next_placement: u64,
    limits: LimitConfig,
    revision: u64,
    changes: watch::Sender<u64>,
}

impl BetLedger {
    pub fn new(limits: LimitConfig) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            totals: BTreeMap::new(),
            placements: Vec::new(),
            total_stake: 0,
            next_placement: 0,
            limits,
            revision: 0,
            changes,
        }
    }

    /// Receive a revision bump after every mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Number of mutations applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Add one unit of stake to a spot
    pub fn place(&mut self, spot: BetSpot, amount: u64) -> Result<PlacementId, BetError> {
        if amount == 0 {
            return Err(BetError::InvalidAmount(amount));
        }

        let on_spot = self.amount_on(&spot);
        let spot_total = on_spot
            .checked_add(amount)
            .filter(|total| *total <= self.limits.max_spot_stake)
            .ok_or_else(|| BetError::StakeLimitExceeded {
                scope: spot.to_string(),
                requested: on_spot.saturating_add(amount),
                limit: self.limits.max_spot_stake,
            })?;
        let table_total = self
            .total_stake
            .checked_add(amount)
            .filter(|total| *total <= self.limits.max_table_stake)
            .ok_or_else(|| BetError::StakeLimitExceeded {
                scope: "table".to_string(),
                requested: self.total_stake.saturating_add(amount),
                limit: self.limits.max_table_stake,
            })?;

        let id = PlacementId::new(self.next_placement);
        self.next_placement += 1;
        self.placements.push(Placement { id, spot, amount });
        self.totals.insert(spot.id(), (spot, spot_total));
        self.total_stake = table_total;

        debug!("Placed {} on {} (spot {}, table {})", amount, spot, spot_total, table_total);
        self.notify();
        Ok(id)
    }

    /// Remove the most recent placement. Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        match self.placements.pop() {
            Some(placement) => {
                self.recompute_spot(&placement.spot);
                debug!("Undid {} on {}", placement.amount, placement.spot);
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Remove every placement on a spot. Returns the amount released.
    pub fn remove_spot(&mut self, spot: &BetSpot) -> u64 {
        let released = self.amount_on(spot);
        if released == 0 {
            return 0;
        }

        let id = spot.id();
        self.placements.retain(|p| p.spot.id() != id);
        self.recompute_spot(spot);
        debug!("Removed spot {} ({} released)", spot, released);
        self.notify();
        released
    }

    /// Remove the most recently added unit on a spot
    pub fn remove_top_stake(&mut self, spot: &BetSpot) -> Option<Placement> {
        let id = spot.id();
        let index = self.placements.iter().rposition(|p| p.spot.id() == id)?;
        Some(self.remove_at(index))
    }

    /// Remove one specific placement
    pub fn remove_placement(&mut self, placement: PlacementId) -> Option<Placement> {
        let index = self.placements.iter().position(|p| p.id == placement)?;
        Some(self.remove_at(index))
    }

    /// Empty the ledger and its history in one step
    pub fn clear(&mut self) {
        self.totals.clear();
        self.placements.clear();
        self.total_stake = 0;
        debug!("Cleared all bets");
        self.notify();
    }

    pub fn total_stake(&self) -> u64 {
        self.total_stake
    }

    pub fn amount_on(&self, spot: &BetSpot) -> u64 {
        self.totals.get(&spot.id()).map(|(_, amount)| *amount).unwrap_or(0)
    }

    pub fn has_bets(&self) -> bool {
        !self.totals.is_empty()
    }

    /// Number of spots carrying a stake
    pub fn spot_count(&self) -> usize {
        self.totals.len()
    }

    /// Live placements, oldest first
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement(&self, placement: PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == placement)
    }

    /// Owned copy of the spot totals
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            entries: self.totals.values().copied().collect(),
        }
    }

    fn remove_at(&mut self, index: usize) -> Placement {
        let placement = self.placements.remove(index);
        self.recompute_spot(&placement.spot);
        debug!("Removed {} from {}", placement.amount, placement.spot);
        self.notify();
        placement
    }

    /// Rebuild one spot's total from its remaining placements
    fn recompute_spot(&mut self, spot: &BetSpot) {
        let id = spot.id();
        let previous = self.totals.remove(&id).map(|(_, amount)| amount).unwrap_or(0);
        let remaining: u64 = self
            .placements
            .iter()
            .filter(|p| p.spot.id() == id)
            .map(|p| p.amount)
            .sum();

        if remaining > 0 {
            self.totals.insert(id, (*spot, remaining));
        }
        self.total_stake = self.total_stake - previous + remaining;
    }

    fn notify(&mut self) {
        self.revision += 1;
        self.changes.send_replace(self.revision);
    }
}

impl Default for BetLedger {
    fn default() -> Self {
        Self::new(LimitConfig::default())
    }
}

/// Immutable copy of the ledger used for resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    entries: Vec<(BetSpot, u64)>,
}

impl LedgerSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = &(BetSpot, u64)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_stake(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, (_, amount)| total.saturating_add(*amount))
    }
}

impl FromIterator<(BetSpot, u64)> for LedgerSnapshot {
    /// Merges repeated spots and drops zero stakes
    fn from_iter<I: IntoIterator<Item = (BetSpot, u64)>>(iter: I) -> Self {
        let mut totals: BTreeMap<SpotId, (BetSpot, u64)> = BTreeMap::new();
        for (spot, amount) in iter {
            let entry = totals.entry(spot.id()).or_insert((spot, 0));
            entry.1 = entry.1.saturating_add(amount);
        }
        Self {
            entries: totals.into_values().filter(|(_, amount)| *amount > 0).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::types::BetCategory;

    fn spot(s: &str) -> BetSpot {
        s.parse().unwrap()
    }

    fn assert_consistent(ledger: &BetLedger) {
        let from_placements: u64 = ledger.placements().iter().map(|p| p.amount).sum();
        let snapshot = ledger.snapshot();
        assert_eq!(ledger.total_stake(), from_placements);
        assert_eq!(snapshot.total_stake(), from_placements);
        assert!(snapshot.iter().all(|(_, amount)| *amount > 0));
    }

    #[test]
    fn test_total_stake_tracks_placements() {
        let mut ledger = BetLedger::default();
        let bets = [("red", 10), ("straight:17", 50), ("red", 20), ("dozen3", 100)];

        for (s, amount) in bets {
            ledger.place(spot(s), amount).unwrap();
            assert_consistent(&ledger);
        }

        assert_eq!(ledger.total_stake(), 180);
        assert_eq!(ledger.amount_on(&spot("red")), 30);
        assert_eq!(ledger.spot_count(), 3);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut ledger = BetLedger::default();
        assert_eq!(ledger.place(spot("odd"), 0), Err(BetError::InvalidAmount(0)));
        assert!(!ledger.has_bets());
        assert_eq!(ledger.revision(), 0);
    }

    #[test]
    fn test_single_undo_restores_empty() {
        let mut ledger = BetLedger::default();
        ledger.place(spot("straight:5"), 50).unwrap();

        assert!(ledger.undo());
        assert_eq!(ledger.total_stake(), 0);
        assert!(!ledger.has_bets());
        assert!(ledger.placements().is_empty());
        assert!(!ledger.undo());
    }

    #[test]
    fn test_undo_is_lifo() {
        let mut ledger = BetLedger::default();
        ledger.place(spot("red"), 10).unwrap();
        ledger.place(spot("black"), 20).unwrap();
        ledger.place(spot("red"), 50).unwrap();

        assert!(ledger.undo());
        assert_eq!(ledger.amount_on(&spot("red")), 10);
        assert!(ledger.undo());
        assert_eq!(ledger.amount_on(&spot("black")), 0);
        assert_eq!(ledger.total_stake(), 10);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_remove_top_stake_and_spot() {
        let mut ledger = BetLedger::default();
        ledger.place(spot("low"), 10).unwrap();
        ledger.place(spot("high"), 20).unwrap();
        ledger.place(spot("low"), 100).unwrap();

        let top = ledger.remove_top_stake(&spot("low")).unwrap();
        assert_eq!(top.amount, 100);
        assert_eq!(ledger.amount_on(&spot("low")), 10);

        assert_eq!(ledger.remove_spot(&spot("low")), 10);
        assert_eq!(ledger.amount_on(&spot("low")), 0);
        assert_eq!(ledger.total_stake(), 20);
        assert_consistent(&ledger);

        // Undo now only sees the remaining placement
        assert!(ledger.undo());
        assert!(!ledger.has_bets());
    }

    #[test]
    fn test_remove_placement_by_id() {
        let mut ledger = BetLedger::default();
        let first = ledger.place(spot("column2"), 20).unwrap();
        let second = ledger.place(spot("column2"), 50).unwrap();

        let removed = ledger.remove_placement(first).unwrap();
        assert_eq!(removed.amount, 20);
        assert!(ledger.placement(first).is_none());
        assert!(ledger.placement(second).is_some());
        assert_eq!(ledger.amount_on(&spot("column2")), 50);
        assert!(ledger.remove_placement(first).is_none());
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut ledger = BetLedger::default();
        ledger.place(spot("even"), 10).unwrap();
        ledger.place(spot("straight:0"), 10).unwrap();

        ledger.clear();

        assert!(!ledger.has_bets());
        assert!(ledger.placements().is_empty());
        assert_eq!(ledger.total_stake(), 0);
        assert!(!ledger.undo());
    }

    #[test]
    fn test_one_notification_per_mutation() {
        let mut ledger = BetLedger::default();
        let mut rx = ledger.subscribe();

        ledger.place(spot("red"), 10).unwrap();
        assert_eq!(ledger.revision(), 1);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);

        // No-ops do not notify
        assert!(ledger.remove_top_stake(&spot("black")).is_none());
        assert_eq!(ledger.remove_spot(&spot("odd")), 0);
        assert_eq!(ledger.revision(), 1);
        assert!(!rx.has_changed().unwrap());

        assert!(ledger.undo());
        assert_eq!(ledger.revision(), 2);
        assert!(!ledger.undo());
        assert_eq!(ledger.revision(), 2);

        ledger.clear();
        assert_eq!(ledger.revision(), 3);
        assert_eq!(*rx.borrow_and_update(), 3);
    }

    #[test]
    fn test_stake_limits() {
        let mut ledger = BetLedger::new(LimitConfig {
            max_spot_stake: 100,
            max_table_stake: 150,
        });

        ledger.place(spot("red"), 100).unwrap();
        let err = ledger.place(spot("red"), 10).unwrap_err();
        assert!(matches!(err, BetError::StakeLimitExceeded { limit: 100, .. }));

        ledger.place(spot("black"), 50).unwrap();
        let err = ledger.place(spot("odd"), 10).unwrap_err();
        assert!(matches!(err, BetError::StakeLimitExceeded { limit: 150, .. }));

        assert_eq!(ledger.total_stake(), 150);
        assert_eq!(ledger.placements().len(), 2);
        assert_eq!(ledger.revision(), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut ledger = BetLedger::default();
        ledger.place(spot("dozen1"), 40).unwrap();
        let snapshot = ledger.snapshot();

        ledger.clear();

        assert_eq!(snapshot.total_stake(), 40);
        assert_eq!(snapshot.iter().next().map(|(s, _)| s.category()), Some(BetCategory::Dozen1));
    }

    #[test]
    fn test_snapshot_from_entries_merges() {
        let snapshot: LedgerSnapshot = vec![(spot("red"), 10), (spot("red"), 5), (spot("odd"), 0)]
            .into_iter()
            .collect();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.total_stake(), 15);
    }

    #[test]
    fn test_snapshot_totals_saturate() {
        let snapshot: LedgerSnapshot = vec![
            (spot("red"), u64::MAX),
            (spot("red"), 10),
            (spot("black"), u64::MAX),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|(_, amount)| *amount == u64::MAX));
        assert_eq!(snapshot.total_stake(), u64::MAX);
    }
}
