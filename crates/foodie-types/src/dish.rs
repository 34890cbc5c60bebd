//! Dish types referenced by order line items.
//!
//! Dishes are owned by an external catalog service; the lifecycle engine only
//! ever sees them as resolved references attached to an incoming order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dish as offered by a restaurant.
///
/// The two duration attributes are estimates in minutes. Both are optional;
/// dishes without them fall back to system-wide defaults when an order
/// schedule is projected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
	/// Unique dish identifier.
	pub id: Uuid,
	/// Restaurant offering this dish.
	pub restaurant_id: Uuid,
	/// Display name.
	pub name: String,
	/// Current unit price.
	pub price: Decimal,
	/// Estimated preparation time in minutes, if known.
	pub preparing_time: Option<u32>,
	/// Estimated delivery time in minutes, if known.
	pub on_the_way_time: Option<u32>,
	/// Whether the dish is currently orderable.
	#[serde(default = "default_available")]
	pub is_available: bool,
}

fn default_available() -> bool {
	true
}
