//! Storage module for the foodie order system.
//!
//! This module provides abstractions for persistent storage of order data,
//! supporting different backend implementations such as in-memory or
//! file-based storage systems.

use async_trait::async_trait;
use foodie_types::ConfigSchema;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the order system. It provides basic key-value operations
/// plus a prefix scan used to load every record in a namespace.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, overwriting any existing value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns raw values for every key starting with the given prefix.
	///
	/// Ordering is unspecified; callers needing a stable order must sort on
	/// a field of the deserialized records.
	async fn scan_bytes(&self, prefix: &str) -> Result<Vec<Vec<u8>>, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations. The service wires these into its builder at startup.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		("file", file::create_storage),
		("memory", memory::create_storage),
	]
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed data with
/// automatic serialization/deserialization.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Stores a serializable value.
	///
	/// The namespace and id are combined to form a unique key.
	/// The data is serialized to JSON before storage.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Retrieves and deserializes a value from storage.
	///
	/// The namespace and id are combined to form the lookup key.
	/// The retrieved bytes are deserialized from JSON.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes = self.backend.get_bytes(&key).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Retrieves and deserializes every value in a namespace.
	///
	/// Used by batch operations that filter records on a field rather than
	/// looking them up by key.
	pub async fn retrieve_all<T: DeserializeOwned>(
		&self,
		namespace: &str,
	) -> Result<Vec<T>, StorageError> {
		let prefix = format!("{}:", namespace);
		let entries = self.backend.scan_bytes(&prefix).await?;
		entries
			.iter()
			.map(|bytes| {
				serde_json::from_slice(bytes)
					.map_err(|e| StorageError::Serialization(e.to_string()))
			})
			.collect()
	}

	/// Removes a value from storage.
	///
	/// The namespace and id are combined to form the key to delete.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.delete(&key).await
	}

	/// Updates an existing value in storage.
	///
	/// This method first checks if the key exists, then updates the value.
	/// Returns an error if the key doesn't exist, making it semantically
	/// different from store() which will create or overwrite.
	pub async fn update<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);

		// Check if the key exists first
		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}

		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Checks if a value exists in storage.
	///
	/// The namespace and id are combined to form the lookup key.
	/// Returns true if the key exists, false otherwise.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.exists(&key).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;
	use serde::{Deserialize, Serialize};

	#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
	struct Record {
		id: String,
		count: u32,
	}

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::new()))
	}

	#[tokio::test]
	async fn test_store_and_retrieve_typed() {
		let storage = service();
		let record = Record {
			id: "a".to_string(),
			count: 7,
		};

		storage.store("records", "a", &record).await.unwrap();
		let loaded: Record = storage.retrieve("records", "a").await.unwrap();
		assert_eq!(loaded, record);
	}

	#[tokio::test]
	async fn test_update_requires_existing_key() {
		let storage = service();
		let record = Record {
			id: "a".to_string(),
			count: 1,
		};

		let result = storage.update("records", "a", &record).await;
		assert!(matches!(result, Err(StorageError::NotFound)));

		storage.store("records", "a", &record).await.unwrap();
		let updated = Record {
			id: "a".to_string(),
			count: 2,
		};
		storage.update("records", "a", &updated).await.unwrap();

		let loaded: Record = storage.retrieve("records", "a").await.unwrap();
		assert_eq!(loaded.count, 2);
	}

	#[tokio::test]
	async fn test_retrieve_all_scopes_to_namespace() {
		let storage = service();

		for i in 0..3u32 {
			let record = Record {
				id: format!("r{}", i),
				count: i,
			};
			storage
				.store("records", &record.id, &record)
				.await
				.unwrap();
		}
		storage
			.store(
				"other",
				"x",
				&Record {
					id: "x".to_string(),
					count: 99,
				},
			)
			.await
			.unwrap();

		let all: Vec<Record> = storage.retrieve_all("records").await.unwrap();
		assert_eq!(all.len(), 3);
		assert!(all.iter().all(|r| r.count < 3));
	}

	#[tokio::test]
	async fn test_remove_then_retrieve_not_found() {
		let storage = service();
		let record = Record {
			id: "a".to_string(),
			count: 1,
		};

		storage.store("records", "a", &record).await.unwrap();
		storage.remove("records", "a").await.unwrap();

		let result: Result<Record, _> = storage.retrieve("records", "a").await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}
}
