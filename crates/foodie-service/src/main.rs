//! Main entry point for the foodie order service.
//!
//! This binary runs the order lifecycle engine: a periodic sweep that
//! advances in-flight orders against their projected timestamps, plus an
//! optional HTTP API for placing, reading and updating orders. A one-shot
//! `sweep` subcommand performs a single pass for external schedulers.

use clap::{Parser, Subcommand};
use foodie_config::Config;
use foodie_core::{EngineFactories, OrderEngine, OrderEngineBuilder};
use foodie_storage::{get_all_implementations, StorageFactory};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the order service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the engine with its periodic sweep and the HTTP API if enabled
	Serve,
	/// Run a single sweep pass, print what changed and exit
	Sweep,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Config::from_file(args.config.to_str().unwrap())?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let engine = Arc::new(build_engine(config)?);

	match args.command.unwrap_or(Command::Serve) {
		Command::Serve => serve(engine).await,
		Command::Sweep => sweep_once(engine).await,
	}
}

/// Runs the engine until interrupted, with the API server alongside when
/// one is configured and enabled.
async fn serve(engine: Arc<OrderEngine>) -> Result<(), Box<dyn std::error::Error>> {
	tracing::info!("Started order service");

	let api_config = engine
		.config()
		.api
		.as_ref()
		.filter(|api| api.enabled)
		.cloned();

	if let Some(api_config) = api_config {
		let api_engine = Arc::clone(&engine);

		let engine_task = engine.run();
		let api_task = server::start_server(api_config, api_engine);

		tokio::select! {
			result = engine_task => {
				tracing::info!("Engine finished");
				result?;
			}
			result = api_task => {
				tracing::info!("API server finished");
				result?;
			}
		}
	} else {
		tracing::info!("Starting engine without API server");
		engine.run().await?;
	}

	tracing::info!("Stopped order service");
	Ok(())
}

/// Performs one sweep pass and reports the outcome on stdout.
///
/// Exits successfully regardless of how many orders changed; only a
/// failure to scan the in-flight set at all is an error.
async fn sweep_once(engine: Arc<OrderEngine>) -> Result<(), Box<dyn std::error::Error>> {
	println!("Starting order status updates...");

	let report = engine.sweep_once().await?;
	for change in &report.changes {
		println!("Order #{}: {} → {}", change.order_id, change.from, change.to);
	}
	for failure in &report.failures {
		eprintln!(
			"Order #{}: update failed ({})",
			failure.order_id, failure.error
		);
	}
	println!("Completed. Updated {} order(s).", report.updated());

	Ok(())
}

/// Builds the order engine with the storage implementations this binary
/// ships.
fn build_engine(config: Config) -> Result<OrderEngine, Box<dyn std::error::Error>> {
	let factories = EngineFactories {
		storage_factories: storage_factories(),
	};

	Ok(OrderEngineBuilder::new(config).build(factories)?)
}

/// Storage backends compiled into this binary, keyed by config name.
fn storage_factories() -> HashMap<String, StorageFactory> {
	get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use foodie_config::{PricingConfig, ServiceConfig, StorageConfig, SweepConfig};
	use tempfile::tempdir;
	use toml::Value;

	/// Creates a minimal test configuration for unit testing
	fn create_test_config() -> Config {
		Config {
			service: ServiceConfig {
				id: "test-service".to_string(),
			},
			storage: StorageConfig {
				primary: "memory".to_string(),
				implementations: {
					let mut map = HashMap::new();
					map.insert("memory".to_string(), Value::Table(toml::map::Map::new()));
					map
				},
			},
			sweep: SweepConfig::default(),
			pricing: PricingConfig::default(),
			api: None,
		}
	}

	#[test]
	fn test_args_default_values() {
		let args = Args::parse_from(["foodie"]);

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
		assert!(args.command.is_none());
	}

	#[test]
	fn test_args_select_sweep_subcommand() {
		let args = Args::parse_from(["foodie", "--config", "custom.toml", "sweep"]);

		assert_eq!(args.config, PathBuf::from("custom.toml"));
		assert!(matches!(args.command, Some(Command::Sweep)));
	}

	#[test]
	fn test_storage_factories_registers_both_backends() {
		let factories = storage_factories();

		assert_eq!(factories.len(), 2);
		assert!(factories.contains_key("memory"));
		assert!(factories.contains_key("file"));
	}

	#[test]
	fn test_build_engine_with_minimal_config() {
		let config = create_test_config();

		let result = build_engine(config);
		assert!(result.is_ok(), "Failed to build engine: {:?}", result.err());

		let engine = result.unwrap();
		assert_eq!(engine.config().service.id, "test-service");
	}

	#[test]
	fn test_config_file_loading() {
		let temp_dir = tempdir().expect("Failed to create temp dir");
		let config_path = temp_dir.path().join("test_config.toml");

		let config_content = r#"
[service]
id = "test-file-service"

[storage]
primary = "memory"

[storage.implementations.memory]

[sweep]
interval_seconds = 30

[pricing]
delivery_fee = "4.00"
tax_rate = "0.08"

[api]
enabled = true
host = "127.0.0.1"
port = 8080
"#;

		std::fs::write(&config_path, config_content).expect("Failed to write config");

		let config =
			Config::from_file(config_path.to_str().unwrap()).expect("Failed to load config");

		assert_eq!(config.service.id, "test-file-service");
		assert_eq!(config.sweep.interval_seconds, 30);
		assert!(config.api.as_ref().is_some_and(|api| api.enabled));
	}
}
