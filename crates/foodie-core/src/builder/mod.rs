//! Builder for constructing a configured order engine.
//!
//! The builder resolves the storage backends named in the configuration
//! against the factory functions registered by the binary, instantiates
//! each one from its own config section and hands the primary to the
//! engine. Backends listed in config without a registered factory are
//! ignored unless one of them is the primary.

use std::collections::HashMap;
use std::sync::Arc;

use foodie_config::Config;
use foodie_storage::{StorageError, StorageInterface, StorageService};
use thiserror::Error;
use tracing::info;

use crate::engine::OrderEngine;
use crate::event_bus::EventBus;

/// Errors that can occur while building the engine.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Factory functions for the storage implementations a binary ships.
pub struct EngineFactories<SF> {
	pub storage_factories: HashMap<String, SF>,
}

/// Builder that assembles an [`OrderEngine`] from configuration.
pub struct OrderEngineBuilder {
	config: Config,
}

impl OrderEngineBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine, instantiating every configured storage backend.
	pub fn build<SF>(self, factories: EngineFactories<SF>) -> Result<OrderEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
	{
		let mut implementations: HashMap<String, Box<dyn StorageInterface>> = HashMap::new();
		for (name, impl_config) in &self.config.storage.implementations {
			if let Some(factory) = factories.storage_factories.get(name) {
				let implementation = factory(impl_config).map_err(|e| {
					BuilderError::Config(format!(
						"Failed to create storage implementation '{}': {}",
						name, e
					))
				})?;
				info!(
					component = "storage",
					implementation = %name,
					enabled = %(name == &self.config.storage.primary),
					"Loaded implementation"
				);
				implementations.insert(name.clone(), implementation);
			}
		}

		let backend = implementations
			.remove(&self.config.storage.primary)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Primary storage implementation '{}' is not available",
					self.config.storage.primary
				))
			})?;
		let storage = Arc::new(StorageService::new(backend));

		Ok(OrderEngine::new(self.config, storage, EventBus::default()))
	}
}
