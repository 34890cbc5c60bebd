//! Time-based status advancement.
//!
//! The transition engine compares the clock against an order's stored
//! milestone timestamps and moves the status forward at most one step per
//! call. Callers that want an order fully caught up invoke it repeatedly;
//! each persisted step then reflects a real observed transition.

use chrono::{DateTime, Utc};
use foodie_types::{Milestones, Order, OrderStatus};

/// A single status transition applied to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
	pub from: OrderStatus,
	pub to: OrderStatus,
}

/// Returns the status an order in `status` should move to at `now`, if any.
///
/// Only the two in-flight statuses ever advance: `preparing` becomes
/// `on_the_way` once the departure milestone has passed, and `on_the_way`
/// becomes `delivered` once the arrival milestone has passed. Thresholds
/// are inclusive. A missing milestone never fires, so orders without a
/// projected schedule stay where they are.
pub fn next_transition(
	status: OrderStatus,
	milestones: &Milestones,
	now: DateTime<Utc>,
) -> Option<OrderStatus> {
	match status {
		OrderStatus::Preparing => match milestones.on_the_way_at {
			Some(due) if now >= due => Some(OrderStatus::OnTheWay),
			_ => None,
		},
		OrderStatus::OnTheWay => match milestones.delivered_at {
			Some(due) if now >= due => Some(OrderStatus::Delivered),
			_ => None,
		},
		// pending waits for external acceptance; terminal statuses never move.
		OrderStatus::Pending | OrderStatus::Delivered | OrderStatus::Cancelled => None,
	}
}

/// Advances an order by at most one status step at `now`.
///
/// Mutates the order in place and returns the applied change, or `None`
/// when nothing is due. Re-invoking with the same clock is a no-op once
/// the order has caught up, and a status is never skipped or reverted.
/// The caller owns persistence and any notification fan-out.
pub fn advance(order: &mut Order, now: DateTime<Utc>) -> Option<StatusChange> {
	let next = next_transition(order.status, &order.milestones(), now)?;
	let from = order.status;
	order.status = next;
	// The projector stamps milestones at placement; this covers orders
	// mutated outside the engine that arrive without one.
	if order.milestone(next).is_none() {
		order.set_milestone(next, now);
	}

	Some(StatusChange { from, to: next })
}
