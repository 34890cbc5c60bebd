//! On-demand status refresh on read paths.
//!
//! Customer-facing reads run the same single-step transition engine as
//! the sweep so nobody is shown a stale status between passes. Unlike the
//! sweep this path stays silent: no notification and no audit line is
//! emitted for a change applied here, and the next sweep pass finds the
//! order already caught up. Subscribers only ever see sweep-observed
//! changes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use foodie_types::Order;
use uuid::Uuid;

use crate::lifecycle::advance;
use crate::state::{OrderStateError, OrderStateMachine};

/// Catches orders up with the clock when they are read.
pub struct RefreshHook {
	state: Arc<OrderStateMachine>,
}

impl RefreshHook {
	pub fn new(state: Arc<OrderStateMachine>) -> Self {
		Self { state }
	}

	/// Loads an order, advancing and persisting it first when overdue.
	pub async fn order(&self, order_id: Uuid) -> Result<Order, OrderStateError> {
		self.order_at(order_id, Utc::now()).await
	}

	/// Same as [`order`](Self::order) with an explicit clock.
	///
	/// A failed save surfaces to the caller rather than returning the
	/// advanced-but-unpersisted view.
	pub async fn order_at(
		&self,
		order_id: Uuid,
		now: DateTime<Utc>,
	) -> Result<Order, OrderStateError> {
		let mut order = self.state.get_order(order_id).await?;
		if advance(&mut order, now).is_some() {
			self.state.save_order(&mut order).await?;
		}

		Ok(order)
	}

	/// Advances every order in the slice, persisting the ones that moved.
	pub async fn refresh_all(&self, orders: &mut [Order]) -> Result<(), OrderStateError> {
		self.refresh_all_at(orders, Utc::now()).await
	}

	/// Same as [`refresh_all`](Self::refresh_all) with an explicit clock.
	///
	/// Aborts on the first failed save; earlier orders in the slice keep
	/// their already persisted refresh.
	pub async fn refresh_all_at(
		&self,
		orders: &mut [Order],
		now: DateTime<Utc>,
	) -> Result<(), OrderStateError> {
		for order in orders.iter_mut() {
			if advance(order, now).is_some() {
				self.state.save_order(order).await?;
			}
		}

		Ok(())
	}
}
