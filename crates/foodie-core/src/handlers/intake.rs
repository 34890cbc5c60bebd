//! Order intake handler.
//!
//! Turns a validated placement request into a persisted order: snapshots
//! the dish lines, computes the money fields, and projects the lifecycle
//! schedule exactly once from the placement time. Orders enter the
//! pipeline in `preparing`; everything after that is the transition
//! engine's business.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use foodie_config::PricingConfig;
use foodie_types::{order_number, NewOrder, Order, OrderItem, OrderStatus};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::lifecycle::{project_schedule, resolve_durations};
use crate::state::OrderStateMachine;

/// Errors produced while placing an order.
#[derive(Debug, Error)]
pub enum IntakeError {
	#[error("Order must contain at least one item")]
	EmptyOrder,
	#[error("Delivery address must not be empty")]
	MissingAddress,
	#[error("Invalid quantity for dish '{dish}'")]
	InvalidQuantity { dish: String },
	#[error("Dish '{0}' is not available")]
	DishUnavailable(String),
	#[error("Dish '{dish}' does not belong to the ordering restaurant")]
	WrongRestaurant { dish: String },
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Creates orders from placement requests.
pub struct OrderIntake {
	state: Arc<OrderStateMachine>,
	pricing: PricingConfig,
}

impl OrderIntake {
	pub fn new(state: Arc<OrderStateMachine>, pricing: PricingConfig) -> Self {
		Self { state, pricing }
	}

	/// Places a new order at the current time.
	pub async fn place(&self, new_order: NewOrder) -> Result<Order, IntakeError> {
		self.place_at(new_order, Utc::now()).await
	}

	/// Places a new order with an explicit placement time.
	///
	/// The schedule is projected from `now` here and never recomputed, so
	/// the milestone timestamps written in this call are the ones every
	/// later transition decision reads.
	pub async fn place_at(
		&self,
		new_order: NewOrder,
		now: DateTime<Utc>,
	) -> Result<Order, IntakeError> {
		if new_order.items.is_empty() {
			return Err(IntakeError::EmptyOrder);
		}
		if new_order.delivery_address.trim().is_empty() {
			return Err(IntakeError::MissingAddress);
		}
		for line in &new_order.items {
			if line.quantity == 0 {
				return Err(IntakeError::InvalidQuantity {
					dish: line.dish.name.clone(),
				});
			}
			if !line.dish.is_available {
				return Err(IntakeError::DishUnavailable(line.dish.name.clone()));
			}
			if line.dish.restaurant_id != new_order.restaurant_id {
				return Err(IntakeError::WrongRestaurant {
					dish: line.dish.name.clone(),
				});
			}
		}

		let items: Vec<OrderItem> = new_order
			.items
			.iter()
			.map(|line| OrderItem::from_dish(&line.dish, line.quantity, line.notes.clone()))
			.collect();

		let subtotal: Decimal = items.iter().map(OrderItem::line_total).sum();
		let tax = (subtotal * self.pricing.tax_rate).round_dp(2);
		let total = subtotal + self.pricing.delivery_fee + tax;

		let id = Uuid::new_v4();
		let mut order = Order {
			id,
			order_number: order_number(&id),
			user_id: new_order.user_id,
			restaurant_id: new_order.restaurant_id,
			driver_id: None,
			items,
			subtotal,
			delivery_fee: self.pricing.delivery_fee,
			tax,
			total,
			status: OrderStatus::Preparing,
			delivery_address: new_order.delivery_address,
			notes: new_order.notes,
			placed_at: Some(now),
			preparing_at: None,
			on_the_way_at: None,
			delivered_at: None,
			estimated_delivery_at: None,
			created_at: now,
			updated_at: now,
		};

		let durations = resolve_durations(&order.items);
		if let Some(schedule) = project_schedule(order.placed_at, durations) {
			schedule.apply(&mut order);
		}

		self.state
			.store_order(&order)
			.await
			.map_err(|e| IntakeError::Storage(e.to_string()))?;

		info!(
			order_id = %order.id,
			order_number = %order.order_number,
			restaurant_id = %order.restaurant_id,
			total = %order.total,
			estimated_delivery_at = ?order.estimated_delivery_at,
			"Order placed"
		);

		Ok(order)
	}
}
