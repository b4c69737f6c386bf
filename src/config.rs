// Configuration module for reading Overkill.toml
// This module provides OOP-style configuration management for the Halite bot

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub bot: BotConfig,
    pub decision: DecisionConfig,
    pub timing: TimingConfig,
    pub parallel: ParallelConfig,
    pub debug: DebugConfig,
    pub profiling: ProfilingConfig,
}

/// Decision strategy used for every owned cell
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Border capture / accumulate / advance policy
    Overkill,
    /// Uniformly random directive per cell
    Random,
}

/// Bot identity and strategy selection
#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    pub name: String,
    pub strategy: Strategy,
    /// Fixed seed for the random strategy; entropy-seeded when absent
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Decision policy constants
#[derive(Debug, Deserialize, Clone)]
pub struct DecisionConfig {
    /// Interior cells stay until strength reaches this multiple of their production
    pub accumulation_multiplier: u32,
}

/// Timing budgets imposed by the game environment
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub init_budget_ms: u64,
    pub turn_budget_ms: u64,
}

/// Parallel execution thresholds
#[derive(Debug, Deserialize, Clone)]
pub struct ParallelConfig {
    /// Owned-cell count at which per-cell decisions move onto the rayon pool
    pub min_cells_for_parallel: usize,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

/// Turn timing profiling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ProfilingConfig {
    pub enabled: bool,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Overkill.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Overkill.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Overkill.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Overkill.toml
    pub fn default_hardcoded() -> Self {
        Config {
            bot: BotConfig {
                name: "OverkillRustBot".to_string(),
                strategy: Strategy::Overkill,
                random_seed: None,
            },
            decision: DecisionConfig {
                accumulation_multiplier: 5,
            },
            timing: TimingConfig {
                init_budget_ms: 15000,
                turn_budget_ms: 1000,
            },
            parallel: ParallelConfig {
                min_cells_for_parallel: 256,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "overkill_debug.jsonl".to_string(),
            },
            profiling: ProfilingConfig { enabled: false },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!(
                "Could not load Overkill.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}
