//! Coverage resolution: which pockets pay out for a spot.

use crate::table::types::{BetCategory, BetSpot, MAX_NUMBER, POCKET_COUNT, RED_NUMBERS};
use serde::{Deserialize, Serialize};

/// Set of pockets a spot wins on, stored as a 37-bit mask
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct CoverageSet(u64);

impl CoverageSet {
    fn from_predicate(pred: impl Fn(u8) -> bool) -> Self {
        let mut mask = 0u64;
        for n in 0..POCKET_COUNT {
            if pred(n) {
                mask |= 1 << n;
            }
        }
        Self(mask)
    }

    pub fn contains(&self, number: u8) -> bool {
        number <= MAX_NUMBER && self.0 & (1 << number) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Covered pockets in ascending order
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        (0..POCKET_COUNT).filter(move |n| self.contains(*n))
    }

    pub fn intersects(&self, other: &CoverageSet) -> bool {
        self.0 & other.0 != 0
    }
}

fn in_play(n: u8) -> bool {
    (1..=MAX_NUMBER).contains(&n)
}

/// Pockets covered by a spot.
///
/// Zero is only ever covered by a straight bet on zero.
pub fn covered_numbers(spot: &BetSpot) -> CoverageSet {
    match spot.category() {
        BetCategory::SingleNumber => match spot.number() {
            Some(number) => CoverageSet::from_predicate(|n| n == number),
            None => unreachable!("straight spots are built with a number"),
        },
        BetCategory::Even => CoverageSet::from_predicate(|n| in_play(n) && n % 2 == 0),
        BetCategory::Odd => CoverageSet::from_predicate(|n| in_play(n) && n % 2 == 1),
        BetCategory::Red => CoverageSet::from_predicate(|n| RED_NUMBERS.contains(&n)),
        BetCategory::Black => {
            CoverageSet::from_predicate(|n| in_play(n) && !RED_NUMBERS.contains(&n))
        }
        BetCategory::Low => CoverageSet::from_predicate(|n| (1..=18).contains(&n)),
        BetCategory::High => CoverageSet::from_predicate(|n| (19..=36).contains(&n)),
        BetCategory::Dozen1 => CoverageSet::from_predicate(|n| (1..=12).contains(&n)),
        BetCategory::Dozen2 => CoverageSet::from_predicate(|n| (13..=24).contains(&n)),
        BetCategory::Dozen3 => CoverageSet::from_predicate(|n| (25..=36).contains(&n)),
        BetCategory::Column1 => CoverageSet::from_predicate(|n| in_play(n) && n % 3 == 1),
        BetCategory::Column2 => CoverageSet::from_predicate(|n| in_play(n) && n % 3 == 2),
        BetCategory::Column3 => CoverageSet::from_predicate(|n| in_play(n) && n % 3 == 0),
    }
}
