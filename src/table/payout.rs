use crate::table::coverage::covered_numbers;
use crate::table::ledger::LedgerSnapshot;
use crate::table::types::{BetCategory, PocketColor, RoundResult, SpotOutcome};

/// Profit per unit staked on a winning spot (stake itself excluded)
pub fn multiplier(category: BetCategory) -> u64 {
    match category {
        BetCategory::SingleNumber => 35,
        BetCategory::Dozen1
        | BetCategory::Dozen2
        | BetCategory::Dozen3
        | BetCategory::Column1
        | BetCategory::Column2
        | BetCategory::Column3 => 2,
        BetCategory::Even
        | BetCategory::Odd
        | BetCategory::Red
        | BetCategory::Black
        | BetCategory::Low
        | BetCategory::High => 1,
    }
}

/// Resolve a frozen ledger against the winning number.
///
/// `net` is what an external balance should move by: profit on winning spots
/// minus the stakes on losing ones. Winning stakes are neither gained nor lost.
pub fn resolve(snapshot: &LedgerSnapshot, winning_number: u8) -> RoundResult {
    let mut stake_won = 0u64;
    let mut stake_lost = 0u64;
    let mut profit = 0u64;
    let mut outcomes = Vec::with_capacity(snapshot.len());

    for (spot, amount) in snapshot.iter() {
        let won = covered_numbers(spot).contains(winning_number);
        let spot_profit = if won {
            amount.saturating_mul(multiplier(spot.category()))
        } else {
            0
        };

        if won {
            stake_won += amount;
            profit = profit.saturating_add(spot_profit);
        } else {
            stake_lost += amount;
        }

        outcomes.push(SpotOutcome {
            spot: *spot,
            amount: *amount,
            won,
            profit: spot_profit,
        });
    }

    let net = i64::try_from(profit).unwrap_or(i64::MAX)
        - i64::try_from(stake_lost).unwrap_or(i64::MAX);
    let color = PocketColor::of(winning_number);

    RoundResult {
        round: 0,
        winning_number,
        total_stake: stake_won + stake_lost,
        stake_won,
        stake_lost,
        profit,
        net,
        is_red: color == PocketColor::Red,
        is_green: color == PocketColor::Green,
        outcomes,
    }
}
