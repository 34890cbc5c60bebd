//! Order API implementation.
//!
//! Implements the order endpoints on top of the engine operations and
//! maps engine errors onto HTTP error responses. Identifier parsing
//! happens here so the engine only ever sees well-formed UUIDs.

use foodie_core::handlers::IntakeError;
use foodie_core::state::OrderStateError;
use foodie_core::OrderEngine;
use foodie_types::{ApiError, NewOrder, Order, OrderUpdateRequest};
use tracing::info;
use uuid::Uuid;

/// Places a new order.
pub async fn place_order(engine: &OrderEngine, request: NewOrder) -> Result<Order, ApiError> {
	engine.place_order(request).await.map_err(map_intake_error)
}

/// Retrieves an order by id, refreshed against the clock.
pub async fn get_order(engine: &OrderEngine, id: &str) -> Result<Order, ApiError> {
	info!("Retrieving order with ID: {}", id);

	let order_id = parse_id(id)?;
	engine.get_order(order_id).await.map_err(map_state_error)
}

/// Applies a manual status change and/or driver assignment.
pub async fn update_order(
	engine: &OrderEngine,
	id: &str,
	update: OrderUpdateRequest,
) -> Result<Order, ApiError> {
	if update.status.is_none() && update.driver_id.is_none() {
		return Err(ApiError::BadRequest {
			error_type: "EMPTY_UPDATE".to_string(),
			message: "Update must set a status or a driver".to_string(),
			details: Some(serde_json::json!({
				"expected_fields": ["status", "driver_id"],
			})),
		});
	}

	let order_id = parse_id(id)?;
	engine
		.update_order(order_id, update)
		.await
		.map_err(map_state_error)
}

/// Lists a customer's orders, refreshed against the clock.
pub async fn customer_orders(engine: &OrderEngine, id: &str) -> Result<Vec<Order>, ApiError> {
	let user_id = parse_id(id)?;
	engine.customer_orders(user_id).await.map_err(map_state_error)
}

/// Lists a restaurant's orders as stored.
pub async fn restaurant_orders(engine: &OrderEngine, id: &str) -> Result<Vec<Order>, ApiError> {
	let restaurant_id = parse_id(id)?;
	engine
		.restaurant_orders(restaurant_id)
		.await
		.map_err(map_state_error)
}

/// Validates a path identifier.
fn parse_id(id: &str) -> Result<Uuid, ApiError> {
	Uuid::parse_str(id).map_err(|_| ApiError::BadRequest {
		error_type: "INVALID_ID".to_string(),
		message: format!("Identifier must be a valid UUID: {}", id),
		details: None,
	})
}

fn map_intake_error(error: IntakeError) -> ApiError {
	match error {
		IntakeError::Storage(message) => ApiError::InternalServerError {
			error_type: "INTERNAL_ERROR".to_string(),
			message,
		},
		validation => ApiError::BadRequest {
			error_type: "INVALID_ORDER".to_string(),
			message: validation.to_string(),
			details: None,
		},
	}
}

fn map_state_error(error: OrderStateError) -> ApiError {
	match error {
		OrderStateError::OrderNotFound(id) => ApiError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message: format!("Order not found: {}", id),
		},
		OrderStateError::InvalidTransition { from, to } => ApiError::UnprocessableEntity {
			error_type: "INVALID_STATUS_TRANSITION".to_string(),
			message: format!("Invalid status transition from {} to {}", from, to),
			details: None,
		},
		OrderStateError::Storage(message) => ApiError::InternalServerError {
			error_type: "INTERNAL_ERROR".to_string(),
			message,
		},
	}
}
