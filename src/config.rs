//! Configuration management for the roulette table
//!
//! Centralized configuration with defaults, TOML files, environment variable
//! overrides and validation.

use crate::errors::{ConfigurationError, RouletteResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Complete table configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    pub chips: ChipConfig,
    pub limits: LimitConfig,
    pub round: RoundConfig,
    pub settlement: SettlementConfig,
}

/// Chip denominations offered by the selector
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChipConfig {
    pub denominations: Vec<u64>,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            denominations: vec![10, 20, 50, 100, 500],
        }
    }
}

/// Stake limits enforced by the ledger
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LimitConfig {
    pub max_spot_stake: u64,
    pub max_table_stake: u64,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_spot_stake: 100_000,
            max_table_stake: 1_000_000,
        }
    }
}

/// Round pacing used by the session driver
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoundConfig {
    /// Presentation time of the spin (accelerate, cruise, decelerate)
    pub spin_duration_ms: u64,
    /// Time after resolution before input unlocks
    pub cooldown_ms: u64,
}

impl RoundConfig {
    pub fn spin_duration(&self) -> Duration {
        Duration::from_millis(self.spin_duration_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            spin_duration_ms: 4_700,
            cooldown_ms: 5_000,
        }
    }
}

/// Wallet settlement behaviour
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SettlementConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl SettlementConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 250,
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> RouletteResult<TableConfig> {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => TableConfig::default(),
        };

        self.apply_overrides(&mut config, |key| env::var(key).ok())?;
        self.validate(&config)?;

        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(&self, path: &str) -> RouletteResult<TableConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    /// Apply `ROULETTE_*` overrides from a key lookup
    fn apply_overrides<F>(&self, config: &mut TableConfig, lookup: F) -> RouletteResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ROULETTE_SPIN_MS") {
            config.round.spin_duration_ms = parse_field("ROULETTE_SPIN_MS", value)?;
        }
        if let Some(value) = lookup("ROULETTE_COOLDOWN_MS") {
            config.round.cooldown_ms = parse_field("ROULETTE_COOLDOWN_MS", value)?;
        }
        if let Some(value) = lookup("ROULETTE_MAX_SPOT_STAKE") {
            config.limits.max_spot_stake = parse_field("ROULETTE_MAX_SPOT_STAKE", value)?;
        }
        if let Some(value) = lookup("ROULETTE_MAX_TABLE_STAKE") {
            config.limits.max_table_stake = parse_field("ROULETTE_MAX_TABLE_STAKE", value)?;
        }
        if let Some(value) = lookup("ROULETTE_SETTLEMENT_ATTEMPTS") {
            config.settlement.max_attempts = parse_field("ROULETTE_SETTLEMENT_ATTEMPTS", value)?;
        }
        if let Some(value) = lookup("ROULETTE_CHIPS") {
            config.chips.denominations = value
                .split(',')
                .map(|chip| parse_field("ROULETTE_CHIPS", chip.trim().to_string()))
                .collect::<Result<_, _>>()?;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self, config: &TableConfig) -> RouletteResult<()> {
        if config.chips.denominations.is_empty() {
            return Err(ConfigurationError::MissingRequired("chips.denominations".to_string()).into());
        }

        if config.chips.denominations.contains(&0) {
            return Err(invalid("chips.denominations", "0", "Chip values must be positive"));
        }

        if config.limits.max_spot_stake == 0 {
            return Err(invalid("limits.max_spot_stake", "0", "Spot limit cannot be zero"));
        }

        if config.limits.max_table_stake < config.limits.max_spot_stake {
            return Err(invalid(
                "limits.max_table_stake",
                &config.limits.max_table_stake.to_string(),
                "Table limit must be at least the spot limit",
            ));
        }

        let smallest_chip = config.chips.denominations.iter().min().copied().unwrap_or(0);
        if smallest_chip > config.limits.max_spot_stake {
            return Err(invalid(
                "chips.denominations",
                &smallest_chip.to_string(),
                "Smallest chip exceeds the spot limit",
            ));
        }

        if config.settlement.max_attempts == 0 {
            return Err(invalid("settlement.max_attempts", "0", "At least one attempt is required"));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &TableConfig, path: &str) -> RouletteResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, value: String) -> Result<T, ConfigurationError> {
    value.parse().map_err(|_| ConfigurationError::InvalidValue {
        field: field.to_string(),
        value,
        reason: "Expected a non-negative integer".to_string(),
    })
}

fn invalid(field: &str, value: &str, reason: &str) -> crate::errors::RouletteError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Builder pattern for creating configurations
pub struct ConfigBuilder {
    config: TableConfig,
}

impl ConfigBuilder {
    /// Create a new config builder with defaults
    pub fn new() -> Self {
        Self {
            config: TableConfig::default(),
        }
    }

    pub fn chips(mut self, denominations: Vec<u64>) -> Self {
        self.config.chips.denominations = denominations;
        self
    }

    pub fn limits(mut self, limits: LimitConfig) -> Self {
        self.config.limits = limits;
        self
    }

    pub fn round(mut self, round: RoundConfig) -> Self {
        self.config.round = round;
        self
    }

    pub fn settlement(mut self, settlement: SettlementConfig) -> Self {
        self.config.settlement = settlement;
        self
    }

    /// Zero spin and cooldown delays, for headless runs and tests
    pub fn instant(mut self) -> Self {
        self.config.round = RoundConfig {
            spin_duration_ms: 0,
            cooldown_ms: 0,
        };
        self.config.settlement.retry_delay_ms = 0;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> TableConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> RouletteResult<()> {
    ConfigLoader::new().save(&TableConfig::default(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = TableConfig::default();
        assert_eq!(config.chips.denominations, vec![10, 20, 50, 100, 500]);
        assert_eq!(config.round.cooldown_ms, 5_000);
        assert_eq!(config.round.spin_duration(), Duration::from_millis(4_700));
        assert_eq!(config.settlement.max_attempts, 3);
    }

    #[test]
    fn test_config_validation() {
        let loader = ConfigLoader::new();
        let mut config = TableConfig::default();

        assert!(loader.validate(&config).is_ok());

        config.chips.denominations.clear();
        assert!(loader.validate(&config).is_err());

        let mut config = TableConfig::default();
        config.limits.max_table_stake = 10;
        assert!(loader.validate(&config).is_err());

        let mut config = TableConfig::default();
        config.settlement.max_attempts = 0;
        assert!(loader.validate(&config).is_err());
    }

    #[test]
    fn test_overrides() {
        let loader = ConfigLoader::new();
        let mut config = TableConfig::default();
        let vars: HashMap<&str, &str> = [
            ("ROULETTE_COOLDOWN_MS", "1200"),
            ("ROULETTE_CHIPS", "5, 25"),
        ]
        .into_iter()
        .collect();

        loader
            .apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.round.cooldown_ms, 1200);
        assert_eq!(config.chips.denominations, vec![5, 25]);
    }

    #[test]
    fn test_bad_override_rejected() {
        let loader = ConfigLoader::new();
        let mut config = TableConfig::default();

        let result = loader.apply_overrides(&mut config, |key| {
            (key == "ROULETTE_MAX_SPOT_STAKE").then(|| "lots".to_string())
        });

        assert!(result.is_err());
        assert_eq!(config.limits, LimitConfig::default());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new().chips(vec![1, 5]).instant().build();

        assert_eq!(config.chips.denominations, vec![1, 5]);
        assert_eq!(config.round.cooldown(), Duration::ZERO);
        assert_eq!(config.settlement.retry_delay_ms, 0);
    }

    #[test]
    fn test_partial_file_uses_defaults() -> RouletteResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[round]\ncooldown_ms = 250\n").unwrap();

        let config = ConfigLoader::new()
            .with_path(temp_file.path())
            .load()?;

        assert_eq!(config.round.cooldown_ms, 250);
        assert_eq!(config.round.spin_duration_ms, 4_700);
        assert_eq!(config.chips, ChipConfig::default());
        Ok(())
    }

    #[test]
    fn test_save_and_load_config() -> RouletteResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let original = ConfigBuilder::new().chips(vec![25, 100]).build();
        ConfigLoader::new().save(&original, path)?;

        let loaded = ConfigLoader::new().with_path(path).load_from_file(path)?;
        assert_eq!(loaded, original);

        Ok(())
    }
}
