//! HTTP server for the foodie order API.
//!
//! Thin axum layer over the order engine: routing, state injection and
//! error-to-response mapping. Behavior, including the read-path refresh,
//! lives in the engine; handlers here never touch storage directly.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
	routing::{get, post},
	Router,
};
use foodie_config::ApiConfig;
use foodie_core::OrderEngine;
use foodie_types::{ApiError, NewOrder, Order, OrderUpdateRequest};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the order engine for processing requests.
	pub engine: Arc<OrderEngine>,
}

/// Builds the API router for the given state.
pub fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders", post(handle_place_order))
				.route(
					"/orders/{id}",
					get(handle_get_order).patch(handle_update_order),
				)
				.route("/users/{id}/orders", get(handle_customer_orders))
				.route("/restaurants/{id}/orders", get(handle_restaurant_orders)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server for the order API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<OrderEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { engine });

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /api/orders requests.
async fn handle_place_order(
	State(state): State<AppState>,
	Json(request): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
	match crate::apis::orders::place_order(&state.engine, request).await {
		Ok(order) => Ok((StatusCode::CREATED, Json(order))),
		Err(e) => {
			tracing::warn!("Order placement failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/orders/{id} requests.
///
/// The engine catches the order up with the clock before it is returned,
/// so the response never shows a stale status.
async fn handle_get_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, ApiError> {
	match crate::apis::orders::get_order(&state.engine, &id).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(e)
		},
	}
}

/// Handles PATCH /api/orders/{id} requests.
async fn handle_update_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
	Json(request): Json<OrderUpdateRequest>,
) -> Result<Json<Order>, ApiError> {
	match crate::apis::orders::update_order(&state.engine, &id, request).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order update failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/users/{id}/orders requests.
async fn handle_customer_orders(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, ApiError> {
	match crate::apis::orders::customer_orders(&state.engine, &id).await {
		Ok(orders) => Ok(Json(orders)),
		Err(e) => {
			tracing::warn!("Customer order listing failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/restaurants/{id}/orders requests.
async fn handle_restaurant_orders(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, ApiError> {
	match crate::apis::orders::restaurant_orders(&state.engine, &id).await {
		Ok(orders) => Ok(Json(orders)),
		Err(e) => {
			tracing::warn!("Restaurant order listing failed: {}", e);
			Err(e)
		},
	}
}
