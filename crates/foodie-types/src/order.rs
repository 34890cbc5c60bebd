//! Order types for the lifecycle engine.
//!
//! This module defines the order aggregate, its line items, and the milestone
//! timestamps that drive automatic status advancement. Line items are
//! snapshots taken at placement time; dish prices and durations captured here
//! never change afterwards, even if the catalog entry does.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Dish;

/// Current position of an order in its delivery pipeline.
///
/// Transitions are strictly forward along `preparing -> on_the_way ->
/// delivered`. `pending` is reachable only through direct external mutation
/// (an order not yet accepted) and `cancelled` is set by operators, never by
/// the transition engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	Pending,
	Preparing,
	OnTheWay,
	Delivered,
	Cancelled,
}

impl OrderStatus {
	/// Returns the wire representation of this status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Preparing => "preparing",
			OrderStatus::OnTheWay => "on_the_way",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Cancelled => "cancelled",
		}
	}

	/// Terminal states are never advanced or swept.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
	}

	/// In-flight states are eligible for automatic advancement.
	pub fn is_in_flight(&self) -> bool {
		matches!(self, OrderStatus::Preparing | OrderStatus::OnTheWay)
	}
}

impl std::fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The three milestone timestamps read by the transition engine.
///
/// Each marks the projected-then-actual instant an order enters the matching
/// status. All stay unset until the schedule is projected at placement.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Milestones {
	pub preparing_at: Option<DateTime<Utc>>,
	pub on_the_way_at: Option<DateTime<Utc>>,
	pub delivered_at: Option<DateTime<Utc>>,
}

/// A line item snapshot within an order.
///
/// Captures the dish data relevant to pricing and scheduling at the moment
/// the order was placed. The duration attributes are read-only inputs to
/// duration resolution and are never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
	/// Referenced dish.
	pub dish_id: Uuid,
	/// Dish name at placement time.
	pub dish_name: String,
	/// Number of units ordered, always at least 1.
	pub quantity: u32,
	/// Price per unit at placement time.
	pub unit_price: Decimal,
	/// Preparation estimate in minutes, copied from the dish.
	pub preparing_time: Option<u32>,
	/// Delivery estimate in minutes, copied from the dish.
	pub on_the_way_time: Option<u32>,
	/// Free-text customer notes for this line.
	pub notes: Option<String>,
}

impl OrderItem {
	/// Builds a line item by snapshotting the given dish.
	pub fn from_dish(dish: &Dish, quantity: u32, notes: Option<String>) -> Self {
		Self {
			dish_id: dish.id,
			dish_name: dish.name.clone(),
			quantity,
			unit_price: dish.price,
			preparing_time: dish.preparing_time,
			on_the_way_time: dish.on_the_way_time,
			notes,
		}
	}

	/// Total price of this line.
	pub fn line_total(&self) -> Decimal {
		self.unit_price * Decimal::from(self.quantity)
	}
}

/// The order aggregate.
///
/// Monetary fields are computed once at creation and immutable afterwards.
/// Milestone timestamps are projected once at placement; after that the order
/// is mutated only by the transition engine or by manual operator actions
/// (cancellation, driver assignment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique order identifier.
	pub id: Uuid,
	/// Human-readable order number shown to customers.
	pub order_number: String,
	/// Placing customer.
	pub user_id: Uuid,
	/// Restaurant fulfilling the order.
	pub restaurant_id: Uuid,
	/// Assigned delivery driver, if dispatched.
	pub driver_id: Option<Uuid>,
	/// Line items, at least one.
	pub items: Vec<OrderItem>,
	/// Sum of line totals.
	pub subtotal: Decimal,
	/// Flat delivery fee.
	pub delivery_fee: Decimal,
	/// Tax on the subtotal.
	pub tax: Decimal,
	/// Subtotal plus fee plus tax.
	pub total: Decimal,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Where the order is delivered.
	pub delivery_address: String,
	/// Free-text customer notes for the whole order.
	pub notes: Option<String>,
	/// When the order was placed; authoritative origin for all projections.
	pub placed_at: Option<DateTime<Utc>>,
	/// When preparation started (equals `placed_at` once projected).
	pub preparing_at: Option<DateTime<Utc>>,
	/// When the order is expected to leave the restaurant.
	pub on_the_way_at: Option<DateTime<Utc>>,
	/// When the order is expected to arrive.
	pub delivered_at: Option<DateTime<Utc>>,
	/// Compatibility alias, always equal to `delivered_at` once projected.
	pub estimated_delivery_at: Option<DateTime<Utc>>,
	/// Record creation time.
	pub created_at: DateTime<Utc>,
	/// Last persisted mutation time.
	pub updated_at: DateTime<Utc>,
}

impl Order {
	/// Returns a copy of the milestone timestamps.
	pub fn milestones(&self) -> Milestones {
		Milestones {
			preparing_at: self.preparing_at,
			on_the_way_at: self.on_the_way_at,
			delivered_at: self.delivered_at,
		}
	}

	/// Returns the milestone timestamp marking entry into `status`, if any.
	///
	/// `pending` and `cancelled` have no milestone and always yield `None`.
	pub fn milestone(&self, status: OrderStatus) -> Option<DateTime<Utc>> {
		match status {
			OrderStatus::Preparing => self.preparing_at,
			OrderStatus::OnTheWay => self.on_the_way_at,
			OrderStatus::Delivered => self.delivered_at,
			OrderStatus::Pending | OrderStatus::Cancelled => None,
		}
	}

	/// Stamps the milestone for `status` with the given instant.
	///
	/// Stamping `delivered` also refreshes the `estimated_delivery_at` alias
	/// so the two never diverge.
	pub fn set_milestone(&mut self, status: OrderStatus, at: DateTime<Utc>) {
		match status {
			OrderStatus::Preparing => self.preparing_at = Some(at),
			OrderStatus::OnTheWay => self.on_the_way_at = Some(at),
			OrderStatus::Delivered => {
				self.delivered_at = Some(at);
				self.estimated_delivery_at = Some(at);
			},
			OrderStatus::Pending | OrderStatus::Cancelled => {},
		}
	}
}

/// An incoming order as supplied by the placement collaborator.
///
/// Dish references arrive already resolved; the intake flow snapshots them
/// into [`OrderItem`]s and projects the delivery schedule exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
	/// Placing customer.
	pub user_id: Uuid,
	/// Restaurant fulfilling the order.
	pub restaurant_id: Uuid,
	/// Where the order is delivered.
	pub delivery_address: String,
	/// Free-text customer notes for the whole order.
	pub notes: Option<String>,
	/// Requested lines.
	pub items: Vec<NewOrderItem>,
}

/// One requested line of an incoming order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
	/// Resolved dish reference.
	pub dish: Dish,
	/// Number of units ordered.
	pub quantity: u32,
	/// Free-text customer notes for this line.
	pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn dish(price: Decimal) -> Dish {
		Dish {
			id: Uuid::new_v4(),
			restaurant_id: Uuid::new_v4(),
			name: "Margherita".to_string(),
			price,
			preparing_time: Some(12),
			on_the_way_time: Some(18),
			is_available: true,
		}
	}

	#[test]
	fn test_status_serializes_snake_case() {
		let json = serde_json::to_string(&OrderStatus::OnTheWay).unwrap();
		assert_eq!(json, "\"on_the_way\"");

		let parsed: OrderStatus = serde_json::from_str("\"preparing\"").unwrap();
		assert_eq!(parsed, OrderStatus::Preparing);
	}

	#[test]
	fn test_status_classification() {
		assert!(OrderStatus::Delivered.is_terminal());
		assert!(OrderStatus::Cancelled.is_terminal());
		assert!(!OrderStatus::Preparing.is_terminal());

		assert!(OrderStatus::Preparing.is_in_flight());
		assert!(OrderStatus::OnTheWay.is_in_flight());
		assert!(!OrderStatus::Pending.is_in_flight());
		assert!(!OrderStatus::Delivered.is_in_flight());
	}

	#[test]
	fn test_item_snapshots_dish() {
		let d = dish(Decimal::new(1250, 2));
		let item = OrderItem::from_dish(&d, 3, Some("extra basil".to_string()));

		assert_eq!(item.dish_id, d.id);
		assert_eq!(item.dish_name, "Margherita");
		assert_eq!(item.unit_price, Decimal::new(1250, 2));
		assert_eq!(item.preparing_time, Some(12));
		assert_eq!(item.on_the_way_time, Some(18));
		assert_eq!(item.line_total(), Decimal::new(3750, 2));
	}

	#[test]
	fn test_delivered_milestone_keeps_alias_in_sync() {
		let mut order = Order {
			id: Uuid::new_v4(),
			order_number: "ORD-TEST".to_string(),
			user_id: Uuid::new_v4(),
			restaurant_id: Uuid::new_v4(),
			driver_id: None,
			items: vec![],
			subtotal: Decimal::ZERO,
			delivery_fee: Decimal::ZERO,
			tax: Decimal::ZERO,
			total: Decimal::ZERO,
			status: OrderStatus::OnTheWay,
			delivery_address: "1 Test Lane".to_string(),
			notes: None,
			placed_at: None,
			preparing_at: None,
			on_the_way_at: None,
			delivered_at: None,
			estimated_delivery_at: None,
			created_at: Utc::now(),
			updated_at: Utc::now(),
		};

		let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 35, 0).unwrap();
		order.set_milestone(OrderStatus::Delivered, at);

		assert_eq!(order.delivered_at, Some(at));
		assert_eq!(order.estimated_delivery_at, Some(at));
	}
}
