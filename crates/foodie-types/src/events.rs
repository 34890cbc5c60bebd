//! Event types for order status notifications.
//!
//! This module defines the events published on the event bus when the sweep
//! job advances an order. Subscribers forward them to real-time transports;
//! the lifecycle engine only cares about channel addressing and payload.

use crate::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event name under which status updates reach external consumers.
pub const ORDER_STATUS_UPDATED: &str = "order.status.updated";

/// Events emitted by the order lifecycle engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// A sweep advanced an order to a new status.
	StatusUpdated(StatusUpdate),
}

/// Payload of a status-change notification.
///
/// Addressed to two logical audiences: the placing customer and the
/// restaurant fulfilling the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
	/// Order that changed.
	pub order_id: Uuid,
	/// Status the order advanced to.
	pub new_status: OrderStatus,
	/// Restaurant audience.
	pub restaurant_id: Uuid,
	/// Customer audience.
	pub user_id: Uuid,
	/// When the change was observed.
	pub timestamp: DateTime<Utc>,
}

impl StatusUpdate {
	/// Channel addressed to the placing customer.
	pub fn user_channel(&self) -> String {
		format!("user.{}", self.user_id)
	}

	/// Channel addressed to the restaurant.
	pub fn restaurant_channel(&self) -> String {
		format!("restaurant.{}", self.restaurant_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_channel_addressing() {
		let user_id = Uuid::new_v4();
		let restaurant_id = Uuid::new_v4();
		let update = StatusUpdate {
			order_id: Uuid::new_v4(),
			new_status: OrderStatus::OnTheWay,
			restaurant_id,
			user_id,
			timestamp: Utc::now(),
		};

		assert_eq!(update.user_channel(), format!("user.{}", user_id));
		assert_eq!(
			update.restaurant_channel(),
			format!("restaurant.{}", restaurant_id)
		);
	}
}
