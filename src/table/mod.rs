pub mod types;
pub mod coverage;
pub mod ledger;
pub mod payout;
pub mod source;
pub mod chips;
pub mod events;
pub mod round;
pub mod settlement;

pub use types::*;
pub use coverage::{covered_numbers, CoverageSet};
pub use ledger::{BetLedger, LedgerSnapshot};
pub use source::{RandomSource, ScriptedSource, WinningNumberSource};
pub use chips::ChipSelector;
pub use events::{EventBus, TableEvent};
pub use round::{ClickAction, RouletteTable};
pub use settlement::{BalanceAdjustment, InMemoryWallet, SettlementManager, SettlementRecord, WalletService};
