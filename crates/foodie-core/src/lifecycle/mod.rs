//! Pure order lifecycle logic.
//!
//! Everything here is clock-in, decision-out: duration resolution from
//! line items, one-shot schedule projection at placement, and single-step
//! status advancement against stored milestones. Persistence and event
//! fan-out live with the callers in [`crate::handlers`].

pub mod durations;
pub mod schedule;
pub mod transition;

pub use durations::{
	resolve_durations, ResolvedDurations, DEFAULT_DELIVERY_MINUTES, DEFAULT_PREP_MINUTES,
};
pub use schedule::{project_schedule, Schedule};
pub use transition::{advance, next_transition, StatusChange};
