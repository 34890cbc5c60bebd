//! Order state machine managing status transitions and persistence.
//!
//! Wraps the storage service with order-aware operations: typed lookups,
//! manual transition validation and the namespace-wide scans the sweep and
//! list endpoints are built on. Backends are plain key-value stores, so
//! every query here loads the namespace and filters in process.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use foodie_storage::{StorageError, StorageService};
use foodie_types::{Order, OrderStatus};
use once_cell::sync::Lazy;
use thiserror::Error;
use uuid::Uuid;

/// Storage namespace under which orders are persisted.
pub const ORDERS_NAMESPACE: &str = "orders";

/// Status changes an operator may apply directly.
///
/// The forward chain mirrors the time-based engine; cancellation is allowed
/// from any non-terminal status. Terminal statuses accept nothing.
static VALID_TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut transitions: HashMap<OrderStatus, HashSet<OrderStatus>> = HashMap::new();
	transitions.insert(
		OrderStatus::Pending,
		[OrderStatus::Preparing, OrderStatus::Cancelled]
			.into_iter()
			.collect(),
	);
	transitions.insert(
		OrderStatus::Preparing,
		[OrderStatus::OnTheWay, OrderStatus::Cancelled]
			.into_iter()
			.collect(),
	);
	transitions.insert(
		OrderStatus::OnTheWay,
		[OrderStatus::Delivered, OrderStatus::Cancelled]
			.into_iter()
			.collect(),
	);
	transitions.insert(OrderStatus::Delivered, HashSet::new());
	transitions.insert(OrderStatus::Cancelled, HashSet::new());
	transitions
});

/// Errors specific to order state management.
#[derive(Debug, Error)]
pub enum OrderStateError {
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	#[error("Invalid status transition from {from} to {to}")]
	InvalidTransition {
		from: OrderStatus,
		to: OrderStatus,
	},
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Manages order lifecycle state on top of the storage service.
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Checks whether a manual transition between two statuses is allowed.
	fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
		VALID_TRANSITIONS
			.get(&from)
			.map(|valid_targets| valid_targets.contains(&to))
			.unwrap_or(false)
	}

	/// Retrieves an order by id.
	pub async fn get_order(&self, order_id: Uuid) -> Result<Order, OrderStateError> {
		self.storage
			.retrieve::<Order>(ORDERS_NAMESPACE, &order_id.to_string())
			.await
			.map_err(|e| match e {
				StorageError::NotFound => OrderStateError::OrderNotFound(order_id.to_string()),
				other => OrderStateError::Storage(other.to_string()),
			})
	}

	/// Persists a newly created order.
	pub async fn store_order(&self, order: &Order) -> Result<(), OrderStateError> {
		self.storage
			.store(ORDERS_NAMESPACE, &order.id.to_string(), order)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}

	/// Persists an already mutated order, stamping its modification time.
	///
	/// The order must exist; use [`store_order`](Self::store_order) for
	/// first-time persistence.
	pub async fn save_order(&self, order: &mut Order) -> Result<(), OrderStateError> {
		order.updated_at = Utc::now();
		self.storage
			.update(ORDERS_NAMESPACE, &order.id.to_string(), order)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => OrderStateError::OrderNotFound(order.id.to_string()),
				other => OrderStateError::Storage(other.to_string()),
			})
	}

	/// Applies a manual status change after validating it.
	///
	/// When the target status has no milestone timestamp yet the moment of
	/// the change is stamped, keeping status and timestamps consistent for
	/// orders advanced by an operator ahead of schedule.
	pub async fn update_order_status(
		&self,
		order_id: Uuid,
		new_status: OrderStatus,
	) -> Result<Order, OrderStateError> {
		let mut order = self.get_order(order_id).await?;

		if !Self::is_valid_transition(order.status, new_status) {
			return Err(OrderStateError::InvalidTransition {
				from: order.status,
				to: new_status,
			});
		}

		order.status = new_status;
		if order.milestone(new_status).is_none() {
			order.set_milestone(new_status, Utc::now());
		}
		self.save_order(&mut order).await?;

		Ok(order)
	}

	/// Assigns a delivery driver to an order.
	pub async fn assign_driver(
		&self,
		order_id: Uuid,
		driver_id: Uuid,
	) -> Result<Order, OrderStateError> {
		let mut order = self.get_order(order_id).await?;
		order.driver_id = Some(driver_id);
		self.save_order(&mut order).await?;

		Ok(order)
	}

	/// Returns every order eligible for automatic advancement.
	pub async fn in_flight_orders(&self) -> Result<Vec<Order>, OrderStateError> {
		let orders = self.all_orders().await?;
		Ok(orders
			.into_iter()
			.filter(|order| order.status.is_in_flight())
			.collect())
	}

	/// Returns a customer's orders, newest first.
	pub async fn orders_for_customer(&self, user_id: Uuid) -> Result<Vec<Order>, OrderStateError> {
		let mut orders: Vec<Order> = self
			.all_orders()
			.await?
			.into_iter()
			.filter(|order| order.user_id == user_id)
			.collect();
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

		Ok(orders)
	}

	/// Returns a restaurant's orders, newest first.
	pub async fn orders_for_restaurant(
		&self,
		restaurant_id: Uuid,
	) -> Result<Vec<Order>, OrderStateError> {
		let mut orders: Vec<Order> = self
			.all_orders()
			.await?
			.into_iter()
			.filter(|order| order.restaurant_id == restaurant_id)
			.collect();
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

		Ok(orders)
	}

	async fn all_orders(&self) -> Result<Vec<Order>, OrderStateError> {
		self.storage
			.retrieve_all::<Order>(ORDERS_NAMESPACE)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}
}
