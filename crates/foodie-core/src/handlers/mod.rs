//! Handlers implementing the order lifecycle operations.
//!
//! Each handler owns one flow: intake creates orders, the sweeper batches
//! time-based advancement, and the refresh hook catches orders up on read
//! paths. All of them go through the state machine in [`crate::state`]
//! and the pure logic in [`crate::lifecycle`].

pub mod intake;
pub mod refresh;
pub mod sweep;

pub use intake::{IntakeError, OrderIntake};
pub use refresh::RefreshHook;
pub use sweep::{SweepChange, SweepError, SweepFailure, SweepReport, Sweeper};
