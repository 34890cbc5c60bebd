//! State management for order lifecycle tracking.

pub mod order;

pub use order::{OrderStateError, OrderStateMachine, ORDERS_NAMESPACE};
