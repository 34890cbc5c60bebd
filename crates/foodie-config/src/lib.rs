//! Configuration module for the foodie order system.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files with
//! environment variable resolution, and validates that all required values
//! are properly set before the service starts.

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the foodie order service.
///
/// Contains all configuration sections required for the service to operate:
/// service identity, storage backends, sweep cadence, pricing policy, and
/// the optional HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for the lifecycle sweep job.
	#[serde(default)]
	pub sweep: SweepConfig,
	/// Pricing policy applied at order placement.
	#[serde(default)]
	pub pricing: PricingConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to this service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this service instance.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the lifecycle sweep job.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepConfig {
	/// Interval in seconds between sweep passes.
	#[serde(default = "default_sweep_interval_seconds")]
	pub interval_seconds: u64,
}

impl Default for SweepConfig {
	fn default() -> Self {
		Self {
			interval_seconds: default_sweep_interval_seconds(),
		}
	}
}

/// Returns the default sweep interval in seconds.
///
/// Sweeps run once per minute when no explicit interval is configured,
/// matching the cadence orders are re-evaluated at.
fn default_sweep_interval_seconds() -> u64 {
	60
}

/// Pricing policy applied at order placement.
///
/// Both values accept TOML strings ("5.00") so cent amounts stay exact.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
	/// Flat delivery fee added to every order.
	#[serde(default = "default_delivery_fee")]
	pub delivery_fee: Decimal,
	/// Tax rate applied to the subtotal, as a fraction (0.10 = 10%).
	#[serde(default = "default_tax_rate")]
	pub tax_rate: Decimal,
}

impl Default for PricingConfig {
	fn default() -> Self {
		Self {
			delivery_fee: default_delivery_fee(),
			tax_rate: default_tax_rate(),
		}
	}
}

/// Returns the default flat delivery fee of 5.00.
fn default_delivery_fee() -> Decimal {
	Decimal::new(500, 2)
}

/// Returns the default tax rate of 10%.
fn default_tax_rate() -> Decimal {
	Decimal::new(10, 2)
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

/// Returns the default API host.
///
/// This provides a default host address of 127.0.0.1 (localhost) for the API
/// server when no explicit host is configured.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
///
/// This provides a default port of 3000 for the API server
/// when no explicit port is configured.
fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment variables are resolved and the configuration is validated
	/// after parsing.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// This method performs validation across all configuration sections:
	/// - Ensures the service ID is not empty
	/// - Validates the primary storage backend is configured
	/// - Bounds the sweep interval to something operationally sane
	/// - Checks pricing values are within range
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate service config
		if self.service.id.is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		// Validate sweep config
		if self.sweep.interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"Sweep interval_seconds must be greater than 0".into(),
			));
		}
		if self.sweep.interval_seconds > 3600 {
			return Err(ConfigError::Validation(
				"Sweep interval_seconds cannot exceed 3600 (1 hour)".into(),
			));
		}

		// Validate pricing config
		if self.pricing.delivery_fee < Decimal::ZERO {
			return Err(ConfigError::Validation(
				"Pricing delivery_fee cannot be negative".into(),
			));
		}
		if self.pricing.tax_rate < Decimal::ZERO || self.pricing.tax_rate > Decimal::ONE {
			return Err(ConfigError::Validation(
				"Pricing tax_rate must be between 0 and 1".into(),
			));
		}

		// Validate API config if enabled
		if let Some(ref api) = self.api {
			if api.enabled && api.host.is_empty() {
				return Err(ConfigError::Validation("API host cannot be empty".into()));
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// This allows configuration to be parsed from TOML strings using the
/// standard string parsing interface. Environment variables are resolved and
/// the configuration is automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL_CONFIG: &str = r#"
[service]
id = "foodie-test"

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("FOODIE_TEST_HOST", "localhost");
		std::env::set_var("FOODIE_TEST_PORT", "5432");

		let input = "host = \"${FOODIE_TEST_HOST}:${FOODIE_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("FOODIE_TEST_HOST");
		std::env::remove_var("FOODIE_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${FOODIE_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${FOODIE_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("FOODIE_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_gets_defaults() {
		let config: Config = MINIMAL_CONFIG.parse().unwrap();

		assert_eq!(config.service.id, "foodie-test");
		assert_eq!(config.sweep.interval_seconds, 60);
		assert_eq!(config.pricing.delivery_fee, Decimal::new(500, 2));
		assert_eq!(config.pricing.tax_rate, Decimal::new(10, 2));
		assert!(config.api.is_none());
	}

	#[test]
	fn test_pricing_parses_exact_amounts() {
		let config_str = r#"
[service]
id = "foodie-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[pricing]
delivery_fee = "3.50"
tax_rate = "0.08"
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.pricing.delivery_fee, Decimal::new(350, 2));
		assert_eq!(config.pricing.tax_rate, Decimal::new(8, 2));
	}

	#[test]
	fn test_empty_service_id_rejected() {
		let config_str = r#"
[service]
id = ""

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

		let result: Result<Config, _> = config_str.parse();
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Service ID cannot be empty"));
	}

	#[test]
	fn test_unknown_primary_storage_rejected() {
		let config_str = r#"
[service]
id = "foodie-test"

[storage]
primary = "redis"
[storage.implementations.memory]
"#;

		let result: Result<Config, _> = config_str.parse();
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("Primary storage 'redis' not found"));
	}

	#[test]
	fn test_sweep_interval_bounds() {
		let config_str = format!(
			"{}\n[sweep]\ninterval_seconds = 0\n",
			MINIMAL_CONFIG.trim_end()
		);
		let result: Result<Config, _> = config_str.parse();
		assert!(result.is_err());

		let config_str = format!(
			"{}\n[sweep]\ninterval_seconds = 7200\n",
			MINIMAL_CONFIG.trim_end()
		);
		let result: Result<Config, _> = config_str.parse();
		assert!(result.is_err());
	}

	#[test]
	fn test_tax_rate_out_of_range_rejected() {
		let config_str = format!(
			"{}\n[pricing]\ntax_rate = \"1.5\"\n",
			MINIMAL_CONFIG.trim_end()
		);
		let result: Result<Config, _> = config_str.parse();
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("tax_rate must be between 0 and 1"));
	}

	#[test]
	fn test_api_section_with_defaults() {
		let config_str = format!("{}\n[api]\nenabled = true\n", MINIMAL_CONFIG.trim_end());
		let config: Config = config_str.parse().unwrap();

		let api = config.api.unwrap();
		assert!(api.enabled);
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 3000);
	}

	#[test]
	fn test_from_file_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, MINIMAL_CONFIG).unwrap();

		let config = Config::from_file(path.to_str().unwrap()).unwrap();
		assert_eq!(config.service.id, "foodie-test");
		assert_eq!(config.storage.primary, "memory");
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("FOODIE_TEST_SERVICE_ID", "foodie-from-env");

		let config_str = r#"
[service]
id = "${FOODIE_TEST_SERVICE_ID}"

[storage]
primary = "file"
[storage.implementations.file]
storage_path = "${FOODIE_TEST_STORAGE_PATH:-./data/storage}"
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.service.id, "foodie-from-env");

		let file_impl = config.storage.implementations.get("file").unwrap();
		assert_eq!(
			file_impl.get("storage_path").and_then(|v| v.as_str()),
			Some("./data/storage")
		);

		std::env::remove_var("FOODIE_TEST_SERVICE_ID");
	}
}
