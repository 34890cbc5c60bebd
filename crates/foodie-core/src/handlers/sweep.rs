//! Periodic lifecycle sweep over in-flight orders.
//!
//! Each pass loads every order still moving through the pipeline, applies
//! the single-step transition engine and persists what changed. Customer
//! and restaurant notifications are published only after the new status
//! has been stored, so subscribers never learn about a change that later
//! failed to commit. One misbehaving order never aborts the pass.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use foodie_types::{OrderEvent, OrderStatus, StatusUpdate};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::event_bus::EventBus;
use crate::lifecycle::advance;
use crate::state::OrderStateMachine;

/// Errors produced by a sweep pass.
#[derive(Debug, Error)]
pub enum SweepError {
	#[error("A sweep pass is already running")]
	AlreadyRunning,
	#[error("Storage error: {0}")]
	Storage(String),
}

/// One status change applied and persisted during a pass.
#[derive(Debug, Clone, Copy)]
pub struct SweepChange {
	pub order_id: Uuid,
	pub from: OrderStatus,
	pub to: OrderStatus,
}

/// One order that could not be persisted during a pass.
#[derive(Debug, Clone)]
pub struct SweepFailure {
	pub order_id: Uuid,
	pub error: String,
}

/// Outcome of a single sweep pass.
#[derive(Debug, Default)]
pub struct SweepReport {
	/// In-flight orders examined.
	pub scanned: usize,
	/// Changes applied and persisted, in processing order.
	pub changes: Vec<SweepChange>,
	/// Orders whose change could not be persisted.
	pub failures: Vec<SweepFailure>,
}

impl SweepReport {
	/// Number of orders whose status moved forward.
	pub fn updated(&self) -> usize {
		self.changes.len()
	}
}

/// Advances overdue orders in batch.
pub struct Sweeper {
	state: Arc<OrderStateMachine>,
	event_bus: EventBus,
	running: Mutex<()>,
}

impl Sweeper {
	pub fn new(state: Arc<OrderStateMachine>, event_bus: EventBus) -> Self {
		Self {
			state,
			event_bus,
			running: Mutex::new(()),
		}
	}

	/// Runs one sweep pass against the current time.
	pub async fn run(&self) -> Result<SweepReport, SweepError> {
		self.run_at(Utc::now()).await
	}

	/// Runs one sweep pass against an explicit clock.
	///
	/// At most one pass executes at a time; a pass that finds another
	/// still running returns [`SweepError::AlreadyRunning`] instead of
	/// queueing behind it.
	pub async fn run_at(&self, now: DateTime<Utc>) -> Result<SweepReport, SweepError> {
		let _guard = self
			.running
			.try_lock()
			.map_err(|_| SweepError::AlreadyRunning)?;

		let orders = self
			.state
			.in_flight_orders()
			.await
			.map_err(|e| SweepError::Storage(e.to_string()))?;

		let mut report = SweepReport {
			scanned: orders.len(),
			..Default::default()
		};

		for mut order in orders {
			if let Some(change) = advance(&mut order, now) {
				match self.state.save_order(&mut order).await {
					Ok(()) => {
						info!(
							order_id = %order.id,
							old_status = %change.from,
							new_status = %change.to,
							placed_at = ?order.placed_at,
							preparing_at = ?order.preparing_at,
							on_the_way_at = ?order.on_the_way_at,
							delivered_at = ?order.delivered_at,
							"Order status updated"
						);

						let update = StatusUpdate {
							order_id: order.id,
							new_status: change.to,
							restaurant_id: order.restaurant_id,
							user_id: order.user_id,
							timestamp: now,
						};
						// Best-effort fan-out; stored state is authoritative.
						self.event_bus
							.publish(OrderEvent::StatusUpdated(update))
							.ok();

						report.changes.push(SweepChange {
							order_id: order.id,
							from: change.from,
							to: change.to,
						});
					},
					Err(e) => {
						warn!(
							order_id = %order.id,
							error = %e,
							"Failed to persist status change, skipping order"
						);
						report.failures.push(SweepFailure {
							order_id: order.id,
							error: e.to_string(),
						});
					},
				}
			}
		}

		debug!(
			scanned = report.scanned,
			updated = report.changes.len(),
			failed = report.failures.len(),
			"Sweep pass complete"
		);

		Ok(report)
	}
}
