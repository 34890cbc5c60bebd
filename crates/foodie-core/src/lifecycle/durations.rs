//! Duration resolution for order lifecycle scheduling.
//!
//! An order's preparation and delivery windows are derived from the dish
//! timing metadata captured on its line items. Items prepared in parallel
//! finish together, so the slowest item governs each phase and durations
//! are combined with a maximum rather than a sum.

use foodie_types::OrderItem;

/// Preparation window in minutes used when no item carries a value.
pub const DEFAULT_PREP_MINUTES: u32 = 15;

/// Delivery window in minutes used when no item carries a value.
pub const DEFAULT_DELIVERY_MINUTES: u32 = 20;

/// Effective phase durations for a single order, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDurations {
	/// Minutes from placement until the order leaves the kitchen.
	pub prep_minutes: u32,
	/// Minutes the order spends in transit after leaving the kitchen.
	pub delivery_minutes: u32,
}

/// Resolves the preparation and delivery durations for a set of line items.
///
/// Each phase takes the maximum value declared across the items; items
/// without timing metadata do not participate. When no item declares a
/// value for a phase (including the empty order case) the phase falls back
/// to its default.
pub fn resolve_durations(items: &[OrderItem]) -> ResolvedDurations {
	let prep_minutes = items
		.iter()
		.filter_map(|item| item.preparing_time)
		.max()
		.unwrap_or(DEFAULT_PREP_MINUTES);
	let delivery_minutes = items
		.iter()
		.filter_map(|item| item.on_the_way_time)
		.max()
		.unwrap_or(DEFAULT_DELIVERY_MINUTES);

	ResolvedDurations {
		prep_minutes,
		delivery_minutes,
	}
}
