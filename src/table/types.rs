use crate::errors::BetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest pocket number on a single-zero wheel
pub const MAX_NUMBER: u8 = 36;

/// Number of pockets on the wheel (0..=36)
pub const POCKET_COUNT: u8 = MAX_NUMBER + 1;

/// Red pockets on the European wheel
pub const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

/// Betting categories available on the layout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BetCategory {
    SingleNumber,
    Even,
    Odd,
    Red,
    Black,
    Low,
    High,
    Dozen1,
    Dozen2,
    Dozen3,
    Column1,
    Column2,
    Column3,
}

impl BetCategory {
    /// Every category, in code order
    pub const ALL: [BetCategory; 13] = [
        BetCategory::SingleNumber,
        BetCategory::Even,
        BetCategory::Odd,
        BetCategory::Red,
        BetCategory::Black,
        BetCategory::Low,
        BetCategory::High,
        BetCategory::Dozen1,
        BetCategory::Dozen2,
        BetCategory::Dozen3,
        BetCategory::Column1,
        BetCategory::Column2,
        BetCategory::Column3,
    ];

    /// Stable numeric code used by layouts and wire formats
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Name used in text input and display
    pub fn name(self) -> &'static str {
        match self {
            BetCategory::SingleNumber => "straight",
            BetCategory::Even => "even",
            BetCategory::Odd => "odd",
            BetCategory::Red => "red",
            BetCategory::Black => "black",
            BetCategory::Low => "low",
            BetCategory::High => "high",
            BetCategory::Dozen1 => "dozen1",
            BetCategory::Dozen2 => "dozen2",
            BetCategory::Dozen3 => "dozen3",
            BetCategory::Column1 => "column1",
            BetCategory::Column2 => "column2",
            BetCategory::Column3 => "column3",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        BetCategory::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl TryFrom<u8> for BetCategory {
    type Error = BetError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        BetCategory::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| BetError::InvalidCategory(format!("unknown category code {}", code)))
    }
}

impl fmt::Display for BetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A betting position on the table.
///
/// Only `SingleNumber` spots carry an explicit number. Spots are validated on
/// construction, so every `BetSpot` in circulation has a well-defined coverage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct BetSpot {
    category: BetCategory,
    number: Option<u8>,
}

impl BetSpot {
    /// Straight-up bet on one pocket
    pub fn straight(number: u8) -> Result<Self, BetError> {
        if number > MAX_NUMBER {
            return Err(BetError::InvalidCategory(format!(
                "straight bet on {} is off the wheel",
                number
            )));
        }
        Ok(Self {
            category: BetCategory::SingleNumber,
            number: Some(number),
        })
    }

    /// Outside bet covering a fixed group of numbers
    pub fn outside(category: BetCategory) -> Result<Self, BetError> {
        if category == BetCategory::SingleNumber {
            return Err(BetError::InvalidCategory(
                "straight bets need an explicit number".to_string(),
            ));
        }
        Ok(Self {
            category,
            number: None,
        })
    }

    pub fn category(&self) -> BetCategory {
        self.category
    }

    /// The explicit number of a straight bet
    pub fn number(&self) -> Option<u8> {
        self.number
    }

    /// Stable identity used by the ledger
    pub fn id(&self) -> SpotId {
        match self.number {
            Some(n) => SpotId(u16::from(n)),
            None => SpotId(u16::from(POCKET_COUNT) + u16::from(self.category.code())),
        }
    }
}

impl fmt::Display for BetSpot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "straight:{}", n),
            None => f.write_str(self.category.name()),
        }
    }
}

impl FromStr for BetSpot {
    type Err = BetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        let invalid = || BetError::InvalidCategory(format!("unrecognized bet spot '{}'", s));

        let number = match input.split_once(':') {
            Some(("straight", n)) | Some(("single", n)) => Some(n),
            Some(_) => return Err(invalid()),
            None if input.chars().all(|c| c.is_ascii_digit()) && !input.is_empty() => {
                Some(input.as_str())
            }
            None => None,
        };

        if let Some(n) = number {
            let n: u8 = n.parse().map_err(|_| invalid())?;
            return BetSpot::straight(n);
        }

        match BetCategory::from_name(&input) {
            Some(BetCategory::SingleNumber) | None => Err(invalid()),
            Some(category) => BetSpot::outside(category),
        }
    }
}

impl TryFrom<String> for BetSpot {
    type Error = BetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BetSpot> for String {
    fn from(spot: BetSpot) -> Self {
        spot.to_string()
    }
}

/// Opaque, stable key for a spot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpotId(u16);

/// Opaque handle for one placed chip.
///
/// Presentation layers key their chip visuals by this id; the ledger owns the
/// placement record itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlacementId(u64);

impl PlacementId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chip-{}", self.0)
    }
}

/// One unit of stake added to one spot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub id: PlacementId,
    pub spot: BetSpot,
    pub amount: u64,
}

/// Pocket colour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PocketColor {
    Green,
    Red,
    Black,
}

impl PocketColor {
    pub fn of(number: u8) -> Self {
        if number == 0 {
            PocketColor::Green
        } else if RED_NUMBERS.contains(&number) {
            PocketColor::Red
        } else {
            PocketColor::Black
        }
    }
}

impl fmt::Display for PocketColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PocketColor::Green => write!(f, "green"),
            PocketColor::Red => write!(f, "red"),
            PocketColor::Black => write!(f, "black"),
        }
    }
}

/// Phase of a locked round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum LockPhase {
    /// Spin committed, resolution pending
    Spinning { winning_number: u8 },
    /// Round resolved, waiting for the external cooldown
    Cooldown,
}

/// Interaction state of the table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RoundState {
    Idle,
    Locked(LockPhase),
}

impl RoundState {
    pub fn is_locked(&self) -> bool {
        matches!(self, RoundState::Locked(_))
    }
}

/// How a single spot fared in a round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpotOutcome {
    pub spot: BetSpot,
    pub amount: u64,
    pub won: bool,
    pub profit: u64,
}

/// Summary of one resolved round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundResult {
    pub round: u64,
    pub winning_number: u8,
    pub total_stake: u64,
    pub stake_won: u64,
    pub stake_lost: u64,
    pub profit: u64,
    pub net: i64,
    pub is_red: bool,
    pub is_green: bool,
    pub outcomes: Vec<SpotOutcome>,
}

impl RoundResult {
    pub fn color(&self) -> PocketColor {
        PocketColor::of(self.winning_number)
    }

    /// Winning stakes returned plus profit
    pub fn gross_return(&self) -> u64 {
        self.stake_won.saturating_add(self.profit)
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number {} ({}) | ", self.winning_number, self.color())?;
        if self.net >= 0 {
            write!(f, "won {} (net +{})", self.profit, self.net)?;
        } else {
            write!(f, "lost {}", self.net.unsigned_abs())?;
        }
        write!(f, " | staked {}", self.total_stake)
    }
}
