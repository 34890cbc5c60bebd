//! Event bus for broadcasting order lifecycle notifications.
//!
//! Status changes applied by the sweep are fanned out to subscribers over
//! a broadcast channel. Delivery is best-effort: publishing never blocks,
//! and when nobody is subscribed events are simply dropped. Persisted
//! order state is the source of truth, never the event stream.

use foodie_types::OrderEvent;
use tokio::sync::broadcast;

/// Broadcast bus carrying [`OrderEvent`]s to all subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
	sender: broadcast::Sender<OrderEvent>,
}

impl EventBus {
	/// Creates a bus that buffers up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to every current subscriber.
	///
	/// Returns the number of subscribers reached. Fails only when no
	/// subscriber exists, which callers treat as a non-event.
	pub fn publish(
		&self,
		event: OrderEvent,
	) -> Result<usize, broadcast::error::SendError<OrderEvent>> {
		self.sender.send(event)
	}

	/// Opens a new subscription to the event stream.
	pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1000)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use foodie_types::{OrderStatus, StatusUpdate};
	use uuid::Uuid;

	fn update() -> StatusUpdate {
		StatusUpdate {
			order_id: Uuid::new_v4(),
			new_status: OrderStatus::OnTheWay,
			restaurant_id: Uuid::new_v4(),
			user_id: Uuid::new_v4(),
			timestamp: Utc::now(),
		}
	}

	#[tokio::test]
	async fn test_subscribers_receive_published_events() {
		let bus = EventBus::new(16);
		let mut rx = bus.subscribe();

		let sent = update();
		bus.publish(OrderEvent::StatusUpdated(sent.clone())).unwrap();

		let OrderEvent::StatusUpdated(received) = rx.recv().await.unwrap();
		assert_eq!(received.order_id, sent.order_id);
		assert_eq!(received.new_status, OrderStatus::OnTheWay);
	}

	#[tokio::test]
	async fn test_publish_without_subscribers_is_an_error_callers_ignore() {
		let bus = EventBus::new(16);
		assert!(bus.publish(OrderEvent::StatusUpdated(update())).is_err());
	}
}
