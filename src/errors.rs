//! Error types for the roulette table
//!
//! Errors are grouped by concern (bets, wallet, settlement, configuration)
//! and roll up into a single root type for callers that do not care which
//! layer failed.

use thiserror::Error;

/// Root error type for all table operations
#[derive(Debug, Error)]
pub enum RouletteError {
    /// Rejected bet mutation
    #[error("Bet error: {0}")]
    Bet(#[from] BetError),

    /// Wallet collaborator failure
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Round resolved but the balance adjustment failed
    #[error("Settlement error: {0}")]
    Settlement(#[from] SettlementError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Rejected ledger mutations. None of these leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BetError {
    #[error("Invalid bet amount: {0}")]
    InvalidAmount(u64),

    #[error("Round is locked; bets cannot change until it resolves")]
    RoundLocked,

    #[error("Invalid bet category: {0}")]
    InvalidCategory(String),

    #[error("Stake limit exceeded on {scope}: {requested} requested, limit {limit}")]
    StakeLimitExceeded {
        scope: String,
        requested: u64,
        limit: u64,
    },
}

/// Failures reported by a wallet backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: u64, requested: u64 },

    /// Transient failure, safe to retry
    #[error("Wallet unavailable: {0}")]
    Unavailable(String),

    #[error("Wallet rejected the operation: {0}")]
    Rejected(String),
}

impl WalletError {
    pub fn is_transient(&self) -> bool {
        matches!(self, WalletError::Unavailable(_))
    }
}

/// Settlement errors. The round outcome stands regardless.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("Settlement for round {round} failed after {attempts} attempt(s): {source}")]
    SettlementFailed {
        round: u64,
        attempts: u32,
        #[source]
        source: WalletError,
    },
}

/// Configuration and validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

// Convenience type alias for Results
pub type RouletteResult<T> = Result<T, RouletteError>;
