//! Application settings loaded from config.toml
//!
//! The file carries the compliance settings (which service counts as the
//! primary duty, how often a contended write is retried) and the roster used
//! to seed the database: locations, staff and their contracts.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Service type treated as the primary duty when nothing is configured
pub const DEFAULT_PRIMARY_SERVICE: &str = "Hodei";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Concurrent-duty rule settings
    #[serde(default)]
    pub compliance: ComplianceSettings,
    /// Locations to seed
    #[serde(default)]
    pub locations: Vec<LocationConfig>,
    /// Staff members to seed, with their contracts
    #[serde(default)]
    pub staff: Vec<StaffConfig>,
}

/// Settings of the concurrent-duty rule and the guarded write path
#[derive(Debug, Deserialize, Clone)]
pub struct ComplianceSettings {
    /// Service type that full-time staff must record before any other service on a day
    #[serde(default = "default_primary_service")]
    pub primary_service_type: String,
    /// How many times a write is attempted when it loses a lock or serialization conflict
    #[serde(default = "default_max_write_attempts")]
    pub max_write_attempts: u32,
}

impl Default for ComplianceSettings {
    fn default() -> Self {
        Self {
            primary_service_type: default_primary_service(),
            max_write_attempts: default_max_write_attempts(),
        }
    }
}

fn default_primary_service() -> String {
    DEFAULT_PRIMARY_SERVICE.to_string()
}

const fn default_max_write_attempts() -> u32 {
    3
}

/// Configuration for a single service location
#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    /// Office code
    pub code: String,
    /// Display name
    pub name: String,
}

/// Configuration for a single staff member
#[derive(Debug, Deserialize, Clone)]
pub struct StaffConfig {
    /// Staff code
    pub code: String,
    /// Full name
    pub full_name: String,
    /// Code of the location the staff member belongs to
    pub location: String,
    /// Specialist qualification flag
    #[serde(default)]
    pub is_specialist: bool,
    /// Contracts of this staff member
    #[serde(default)]
    pub contracts: Vec<ContractConfig>,
}

/// Configuration for a single contract
#[derive(Debug, Deserialize, Clone)]
pub struct ContractConfig {
    /// First effective day
    pub start_date: NaiveDate,
    /// Contracted hours per week
    pub weekly_hours: Decimal,
    /// Full-time flag
    #[serde(default)]
    pub is_full_time: bool,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.compliance.primary_service_type.trim().is_empty() {
        return Err(Error::Config {
            message: "primary_service_type cannot be empty".to_string(),
        });
    }
    if config.compliance.max_write_attempts == 0 {
        return Err(Error::Config {
            message: "max_write_attempts must be at least 1".to_string(),
        });
    }

    Ok(config)
}

/// Loads configuration from the default location (./config.toml), falling
/// back to defaults with an empty roster when the file does not exist.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}
