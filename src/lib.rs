//! Roulette Table - single-table European roulette engine
//!
//! Bets are collected in a ledger keyed by spot, frozen when a spin starts,
//! resolved against the winning number and settled with an external wallet.
//! Spin animation and timing belong to the caller; the table only reacts to
//! play, spin-settled and resume signals.

pub mod config;
pub mod errors;
pub mod session;
pub mod table;

pub use config::{ConfigBuilder, ConfigLoader, TableConfig};
pub use errors::{BetError, ConfigurationError, RouletteError, RouletteResult, SettlementError, WalletError};
pub use session::{RoundOutcome, TableSession};
pub use table::{
    BetCategory, BetLedger, BetSpot, ClickAction, InMemoryWallet, LedgerSnapshot, RandomSource,
    RoundResult, RoundState, RouletteTable, ScriptedSource, TableEvent, WalletService,
    WinningNumberSource,
};
