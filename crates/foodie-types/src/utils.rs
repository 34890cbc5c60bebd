//! Utility functions for identifiers.

use uuid::Uuid;

/// Derives the human-readable order number from an order id.
///
/// Uses the first twelve hex characters of the id, uppercased, behind a
/// fixed `ORD-` prefix. Stable for a given id.
pub fn order_number(id: &Uuid) -> String {
	let hex = id.simple().to_string();
	format!("ORD-{}", hex[..12].to_uppercase())
}
