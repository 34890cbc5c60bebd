//! Core order lifecycle engine for the foodie delivery system.
//!
//! This crate provides the orchestration engine that coordinates order
//! intake, time-based status progression and read-path refresh. It wires
//! configured storage backends to the order state machine and exposes the
//! operations the service layer builds its HTTP and CLI surfaces on.
//!
//! The engine follows a modular architecture where order state lives behind
//! the storage abstraction and every status change flows through a single
//! transition path, so the sweep job and the on-demand refresh hook can
//! never disagree about when an order moves forward.

pub mod builder;
pub mod engine;
pub mod event_bus;
pub mod handlers;
pub mod lifecycle;
pub mod state;

pub use builder::{BuilderError, EngineFactories, OrderEngineBuilder};
pub use engine::{EngineError, OrderEngine};
