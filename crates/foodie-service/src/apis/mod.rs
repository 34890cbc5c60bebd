//! API implementations for the foodie order service.

pub mod orders;
