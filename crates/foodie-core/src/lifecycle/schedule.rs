//! Timestamp projection for newly placed orders.
//!
//! When an order is placed its full lifecycle schedule is computed once
//! from the placement time and the resolved phase durations. Later status
//! changes compare the clock against these stored timestamps instead of
//! re-deriving them, so an order's expectations never drift after creation.

use chrono::{DateTime, Duration, Utc};
use foodie_types::Order;

use crate::lifecycle::durations::ResolvedDurations;

/// Projected milestone timestamps for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
	/// When preparation starts. Equal to the placement time.
	pub preparing_at: DateTime<Utc>,
	/// When the order is expected to leave the kitchen.
	pub on_the_way_at: DateTime<Utc>,
	/// When the order is expected to reach the customer.
	pub delivered_at: DateTime<Utc>,
}

impl Schedule {
	/// Writes the schedule onto an order.
	///
	/// The customer-facing `estimated_delivery_at` is kept equal to
	/// `delivered_at`; the two fields are one value under two names.
	pub fn apply(&self, order: &mut Order) {
		order.preparing_at = Some(self.preparing_at);
		order.on_the_way_at = Some(self.on_the_way_at);
		order.delivered_at = Some(self.delivered_at);
		order.estimated_delivery_at = Some(self.delivered_at);
	}
}

/// Projects the lifecycle schedule for an order placed at `placed_at`.
///
/// Preparation starts immediately at placement, the order leaves the
/// kitchen after the preparation window and arrives after the delivery
/// window on top of that. Returns `None` when the placement time is
/// absent, in which case the order carries no schedule and is never
/// advanced automatically.
pub fn project_schedule(
	placed_at: Option<DateTime<Utc>>,
	durations: ResolvedDurations,
) -> Option<Schedule> {
	let placed_at = placed_at?;
	let on_the_way_at = placed_at + Duration::minutes(i64::from(durations.prep_minutes));
	let delivered_at = on_the_way_at + Duration::minutes(i64::from(durations.delivery_minutes));

	Some(Schedule {
		preparing_at: placed_at,
		on_the_way_at,
		delivered_at,
	})
}
