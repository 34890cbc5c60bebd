//! Core order lifecycle engine implementation.
//!
//! This module contains the main [`OrderEngine`] that coordinates intake,
//! time-based advancement and read-path refresh against a single storage
//! backend. The engine exposes the operations the HTTP and CLI surfaces
//! are built on and owns the periodic sweep loop when run as a daemon.

use std::sync::Arc;
use std::time::Duration;

use foodie_config::Config;
use foodie_storage::StorageService;
use foodie_types::{NewOrder, Order, OrderUpdateRequest};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::event_bus::EventBus;
use crate::handlers::{IntakeError, OrderIntake, RefreshHook, SweepError, SweepReport, Sweeper};
use crate::state::{OrderStateError, OrderStateMachine};

/// Errors that prevent the engine from running.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Service error: {0}")]
	Service(String),
}

/// The order lifecycle engine.
///
/// Cheap to clone; all components are shared behind `Arc`s, so the HTTP
/// server and the sweep loop operate on the same state.
#[derive(Clone)]
pub struct OrderEngine {
	config: Config,
	state: Arc<OrderStateMachine>,
	intake: Arc<OrderIntake>,
	sweeper: Arc<Sweeper>,
	refresh: Arc<RefreshHook>,
	event_bus: EventBus,
}

impl OrderEngine {
	/// Wires the engine components onto the given storage backend.
	pub fn new(config: Config, storage: Arc<StorageService>, event_bus: EventBus) -> Self {
		let state = Arc::new(OrderStateMachine::new(storage));
		let intake = Arc::new(OrderIntake::new(state.clone(), config.pricing.clone()));
		let sweeper = Arc::new(Sweeper::new(state.clone(), event_bus.clone()));
		let refresh = Arc::new(RefreshHook::new(state.clone()));

		Self {
			config,
			state,
			intake,
			sweeper,
			refresh,
			event_bus,
		}
	}

	/// Places a new order.
	pub async fn place_order(&self, new_order: NewOrder) -> Result<Order, IntakeError> {
		self.intake.place(new_order).await
	}

	/// Returns an order by id, caught up with the clock first.
	pub async fn get_order(&self, order_id: Uuid) -> Result<Order, OrderStateError> {
		self.refresh.order(order_id).await
	}

	/// Returns a customer's orders, newest first, each caught up first.
	pub async fn customer_orders(&self, user_id: Uuid) -> Result<Vec<Order>, OrderStateError> {
		let mut orders = self.state.orders_for_customer(user_id).await?;
		self.refresh.refresh_all(&mut orders).await?;

		Ok(orders)
	}

	/// Returns a restaurant's orders, newest first, exactly as stored.
	///
	/// The kitchen view reads stored state only; it moves when a sweep
	/// pass or a customer read advances the order.
	pub async fn restaurant_orders(
		&self,
		restaurant_id: Uuid,
	) -> Result<Vec<Order>, OrderStateError> {
		self.state.orders_for_restaurant(restaurant_id).await
	}

	/// Applies a manual order update: a validated status change, a driver
	/// assignment, or both.
	pub async fn update_order(
		&self,
		order_id: Uuid,
		update: OrderUpdateRequest,
	) -> Result<Order, OrderStateError> {
		let mut order = match update.status {
			Some(new_status) => self.state.update_order_status(order_id, new_status).await?,
			None => self.state.get_order(order_id).await?,
		};
		if let Some(driver_id) = update.driver_id {
			order = self.state.assign_driver(order_id, driver_id).await?;
		}

		Ok(order)
	}

	/// Runs a single sweep pass immediately.
	pub async fn sweep_once(&self) -> Result<SweepReport, SweepError> {
		self.sweeper.run().await
	}

	/// Runs the engine until a shutdown signal arrives.
	///
	/// Sweeps on the configured interval; the first pass fires right away
	/// so a restarted engine catches up overdue orders immediately. Sweep
	/// failures are logged and never stop the loop.
	pub async fn run(&self) -> Result<(), EngineError> {
		info!(
			service_id = %self.config.service.id,
			interval_seconds = self.config.sweep.interval_seconds,
			"Starting order lifecycle engine"
		);

		let mut interval =
			tokio::time::interval(Duration::from_secs(self.config.sweep.interval_seconds));

		loop {
			tokio::select! {
				_ = interval.tick() => {
					match self.sweeper.run().await {
						Ok(report) => {
							if report.updated() > 0 || !report.failures.is_empty() {
								info!(
									scanned = report.scanned,
									updated = report.updated(),
									failed = report.failures.len(),
									"Sweep pass applied changes"
								);
							}
						},
						Err(SweepError::AlreadyRunning) => {
							warn!("Previous sweep pass still running, skipping tick");
						},
						Err(e) => {
							warn!(error = %e, "Sweep pass failed");
						},
					}
				}
				signal = tokio::signal::ctrl_c() => {
					signal.map_err(|e| {
						EngineError::Service(format!("Failed to listen for shutdown signal: {}", e))
					})?;
					info!("Shutting down order lifecycle engine");
					break;
				}
			}
		}

		Ok(())
	}

	/// Returns the event bus for subscribing to lifecycle notifications.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Returns the engine configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{DateTime, TimeZone, Utc};
	use foodie_storage::implementations::memory::MemoryStorage;
	use foodie_types::{Dish, NewOrderItem, OrderEvent, OrderStatus};
	use rust_decimal::Decimal;

	fn test_config() -> Config {
		r#"
[service]
id = "engine-test"

[storage]
primary = "memory"

[storage.implementations.memory]
"#
		.parse()
		.unwrap()
	}

	fn engine_with_seeder() -> (OrderEngine, Arc<OrderStateMachine>) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let seeder = Arc::new(OrderStateMachine::new(storage.clone()));
		let engine = OrderEngine::new(test_config(), storage, EventBus::default());
		(engine, seeder)
	}

	fn ts(hour: u32, min: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 1, 1, hour, min, 0).unwrap()
	}

	/// An order whose milestones are firmly in the past.
	fn overdue_order(status: OrderStatus) -> Order {
		let placed = ts(12, 0);
		Order {
			id: Uuid::new_v4(),
			order_number: "ORD-TEST".to_string(),
			user_id: Uuid::new_v4(),
			restaurant_id: Uuid::new_v4(),
			driver_id: None,
			items: vec![],
			subtotal: Decimal::ZERO,
			delivery_fee: Decimal::ZERO,
			tax: Decimal::ZERO,
			total: Decimal::ZERO,
			status,
			delivery_address: "1 Test Lane".to_string(),
			notes: None,
			placed_at: Some(placed),
			preparing_at: Some(placed),
			on_the_way_at: Some(ts(12, 15)),
			delivered_at: Some(ts(12, 35)),
			estimated_delivery_at: Some(ts(12, 35)),
			created_at: placed,
			updated_at: placed,
		}
	}

	fn pizza_order(restaurant_id: Uuid, user_id: Uuid) -> NewOrder {
		NewOrder {
			user_id,
			restaurant_id,
			delivery_address: "1 Test Lane".to_string(),
			notes: None,
			items: vec![NewOrderItem {
				dish: Dish {
					id: Uuid::new_v4(),
					restaurant_id,
					name: "Pizza".to_string(),
					price: Decimal::new(1250, 2),
					preparing_time: Some(15),
					on_the_way_time: Some(20),
					is_available: true,
				},
				quantity: 1,
				notes: None,
			}],
		}
	}

	#[tokio::test]
	async fn test_place_then_get_roundtrip() {
		let (engine, _seeder) = engine_with_seeder();
		let restaurant_id = Uuid::new_v4();

		let placed = engine
			.place_order(pizza_order(restaurant_id, Uuid::new_v4()))
			.await
			.unwrap();
		let fetched = engine.get_order(placed.id).await.unwrap();

		// Freshly placed, nothing is due yet.
		assert_eq!(fetched.status, OrderStatus::Preparing);
		assert_eq!(fetched.total, placed.total);
	}

	#[tokio::test]
	async fn test_get_order_catches_up_overdue_order() {
		let (engine, seeder) = engine_with_seeder();
		let order = overdue_order(OrderStatus::Preparing);
		seeder.store_order(&order).await.unwrap();

		let fetched = engine.get_order(order.id).await.unwrap();
		assert_eq!(fetched.status, OrderStatus::OnTheWay);
	}

	#[tokio::test]
	async fn test_customer_list_refreshes_but_restaurant_list_does_not() {
		let (engine, seeder) = engine_with_seeder();
		let mut order = overdue_order(OrderStatus::Preparing);
		let user_id = order.user_id;
		let restaurant_id = order.restaurant_id;
		seeder.store_order(&order).await.unwrap();

		let kitchen_view = engine.restaurant_orders(restaurant_id).await.unwrap();
		assert_eq!(kitchen_view[0].status, OrderStatus::Preparing);

		let customer_view = engine.customer_orders(user_id).await.unwrap();
		assert_eq!(customer_view[0].status, OrderStatus::OnTheWay);

		// The customer read persisted the advancement; the kitchen sees
		// the new stored status on its next read.
		order = seeder.get_order(order.id).await.unwrap();
		assert_eq!(order.status, OrderStatus::OnTheWay);
	}

	#[tokio::test]
	async fn test_sweep_once_reports_and_notifies() {
		let (engine, seeder) = engine_with_seeder();
		let order = overdue_order(OrderStatus::OnTheWay);
		seeder.store_order(&order).await.unwrap();
		let mut rx = engine.event_bus().subscribe();

		let report = engine.sweep_once().await.unwrap();
		assert_eq!(report.updated(), 1);

		let OrderEvent::StatusUpdated(update) = rx.try_recv().unwrap();
		assert_eq!(update.order_id, order.id);
		assert_eq!(update.new_status, OrderStatus::Delivered);
	}

	#[tokio::test]
	async fn test_update_order_applies_status_and_driver() {
		let (engine, seeder) = engine_with_seeder();
		let order = overdue_order(OrderStatus::Preparing);
		seeder.store_order(&order).await.unwrap();

		let driver_id = Uuid::new_v4();
		let updated = engine
			.update_order(
				order.id,
				OrderUpdateRequest {
					status: Some(OrderStatus::Cancelled),
					driver_id: Some(driver_id),
				},
			)
			.await
			.unwrap();

		assert_eq!(updated.status, OrderStatus::Cancelled);
		assert_eq!(updated.driver_id, Some(driver_id));
	}

	#[tokio::test]
	async fn test_update_order_rejects_invalid_transition() {
		let (engine, seeder) = engine_with_seeder();
		let order = overdue_order(OrderStatus::Delivered);
		seeder.store_order(&order).await.unwrap();

		let result = engine
			.update_order(
				order.id,
				OrderUpdateRequest {
					status: Some(OrderStatus::Preparing),
					driver_id: None,
				},
			)
			.await;

		assert!(matches!(
			result,
			Err(OrderStateError::InvalidTransition { .. })
		));
	}

	#[tokio::test]
	async fn test_place_order_validation_bubbles_up() {
		let (engine, _seeder) = engine_with_seeder();

		let result = engine
			.place_order(NewOrder {
				user_id: Uuid::new_v4(),
				restaurant_id: Uuid::new_v4(),
				delivery_address: "1 Test Lane".to_string(),
				notes: None,
				items: vec![],
			})
			.await;

		assert!(matches!(result, Err(IntakeError::EmptyOrder)));
	}
}
