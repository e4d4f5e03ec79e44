//! Umbra Configuration
//!
//! Shared configuration for the prover and the CLI.
//!
//! Handles loading configuration from:
//! 1. UMBRA_CONFIG env var (explicit path)
//! 2. ./umbra.toml (current directory)
//! 3. ~/.umbra/umbra.toml (user home)
//!
//! Environment variables take precedence over TOML config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::{env, fs};

/// Global config instance for convenience access
pub static GLOBAL_CONFIG: OnceLock<UmbraConfig> = OnceLock::new();

const CONFIG_FILE_NAME: &str = "umbra.toml";
const CONFIG_DIR_NAME: &str = ".umbra";

// ============================================================================
// Default Constants
// ============================================================================

const DEFAULT_CIRCUITS_DIR: &str = "circuits";
const DEFAULT_DEPOSIT_PACKAGE: &str = "deposit";
const DEFAULT_WITHDRAW_PACKAGE: &str = "withdraw";
const DEFAULT_TRANSFER_PACKAGE: &str = "transfer";
const DEFAULT_NARGO_BIN: &str = "nargo";
const DEFAULT_BB_BIN: &str = "bb";

/// Every balance the circuits can produce is below 10¹³
const DEFAULT_DLOG_BOUND: u64 = 10_000_000_000_000;

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UmbraConfig {
    #[serde(default)]
    pub circuits: CircuitsConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

/// Where the compiled Noir packages live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitsConfig {
    #[serde(default = "default_circuits_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_deposit_package")]
    pub deposit_package: String,
    #[serde(default = "default_withdraw_package")]
    pub withdraw_package: String,
    #[serde(default = "default_transfer_package")]
    pub transfer_package: String,
}

impl Default for CircuitsConfig {
    fn default() -> Self {
        Self {
            dir: default_circuits_dir(),
            deposit_package: DEFAULT_DEPOSIT_PACKAGE.into(),
            withdraw_package: DEFAULT_WITHDRAW_PACKAGE.into(),
            transfer_package: DEFAULT_TRANSFER_PACKAGE.into(),
        }
    }
}

fn default_circuits_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CIRCUITS_DIR)
}
fn default_deposit_package() -> String {
    DEFAULT_DEPOSIT_PACKAGE.into()
}
fn default_withdraw_package() -> String {
    DEFAULT_WITHDRAW_PACKAGE.into()
}
fn default_transfer_package() -> String {
    DEFAULT_TRANSFER_PACKAGE.into()
}

/// Proving toolchain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_nargo_bin")]
    pub nargo_bin: PathBuf,
    #[serde(default = "default_bb_bin")]
    pub bb_bin: PathBuf,
    #[serde(default)]
    pub hashing: HashingToml,
}

/// Transcript hash for TOML config
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HashingToml {
    #[default]
    Keccak,
    Poseidon2,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            nargo_bin: default_nargo_bin(),
            bb_bin: default_bb_bin(),
            hashing: HashingToml::Keccak,
        }
    }
}

fn default_nargo_bin() -> PathBuf {
    PathBuf::from(DEFAULT_NARGO_BIN)
}
fn default_bb_bin() -> PathBuf {
    PathBuf::from(DEFAULT_BB_BIN)
}

/// Balance recovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Exclusive upper bound of the discrete-log search
    #[serde(default = "default_dlog_bound")]
    pub dlog_bound: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            dlog_bound: DEFAULT_DLOG_BOUND,
        }
    }
}

fn default_dlog_bound() -> u64 {
    DEFAULT_DLOG_BOUND
}

// ============================================================================
// Override Helpers
// ============================================================================

/// Set field from var if present
fn var_string(var: &impl Fn(&str) -> Option<String>, key: &str, field: &mut String) {
    if let Some(v) = var(key) {
        *field = v;
    }
}

fn var_path(var: &impl Fn(&str) -> Option<String>, key: &str, field: &mut PathBuf) {
    if let Some(v) = var(key) {
        *field = PathBuf::from(v);
    }
}

/// Set field from var if present and parseable
fn var_parse<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, field: &mut T) {
    match var(key).map(|v| v.parse()) {
        Some(Ok(parsed)) => *field = parsed,
        Some(Err(_)) => log::warn!("Ignoring unparseable {key}"),
        None => {}
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl UmbraConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::read(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check UMBRA_CONFIG env var
        if let Ok(path) = env::var("UMBRA_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            log::warn!("UMBRA_CONFIG points at missing file: {}", path.display());
        }

        // 2. Check ./umbra.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.umbra/umbra.toml
        Self::default_config_path().filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Circuits
        var_path(&var, "UMBRA_CIRCUITS_DIR", &mut self.circuits.dir);
        var_string(&var, "UMBRA_DEPOSIT_PACKAGE", &mut self.circuits.deposit_package);
        var_string(&var, "UMBRA_WITHDRAW_PACKAGE", &mut self.circuits.withdraw_package);
        var_string(&var, "UMBRA_TRANSFER_PACKAGE", &mut self.circuits.transfer_package);

        // Backend
        var_path(&var, "UMBRA_NARGO_BIN", &mut self.backend.nargo_bin);
        var_path(&var, "UMBRA_BB_BIN", &mut self.backend.bb_bin);
        if let Some(v) = var("UMBRA_HASHING") {
            self.backend.hashing = match v.to_ascii_lowercase().as_str() {
                "poseidon2" => HashingToml::Poseidon2,
                "keccak" => HashingToml::Keccak,
                other => {
                    log::warn!("Unknown UMBRA_HASHING {other:?}, keeping {:?}", self.backend.hashing);
                    self.backend.hashing
                }
            };
        }

        // Recovery
        var_parse(&var, "UMBRA_DLOG_BOUND", &mut self.recovery.dlog_bound);
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Generate a sample config file
    pub fn generate_sample() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Get the global config instance, initializing it if necessary.
    ///
    /// Falls back to defaults if loading fails.
    pub fn global() -> &'static UmbraConfig {
        GLOBAL_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                log::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Initialize the global config with a specific instance.
    ///
    /// Returns `Err(config)` if already initialized.
    pub fn set_global(config: UmbraConfig) -> Result<(), UmbraConfig> {
        GLOBAL_CONFIG.set(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
