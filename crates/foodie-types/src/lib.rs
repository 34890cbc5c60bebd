//! Common types module for the foodie order system.
//!
//! This module defines the core data types and structures used throughout
//! the order lifecycle system. It provides a centralized location for shared
//! types to ensure consistency across all components.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Dish types referenced by order line items.
pub mod dish;
/// Event types for order status notifications.
pub mod events;
/// Order types including line items and lifecycle timestamps.
pub mod order;
/// Utility functions for identifiers.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use api::*;
pub use dish::*;
pub use events::*;
pub use order::*;
pub use utils::order_number;
pub use validation::*;
