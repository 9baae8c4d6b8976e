use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the write paths. Consumed in-process by
/// [`process_events`]; this is telemetry plumbing, not an event store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Store events
    StoreCreated(Uuid),
    StoreUpdated(Uuid),
    StoreDeleted(Uuid),

    // Product events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    QuantityAdjusted {
        product_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
        reason: String,
        note: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is gone.
    /// Write paths must not fail because the event loop lags or shut down.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Failed to publish event: {}", e);
        }
    }
}

/// Consumes events from the channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::QuantityAdjusted {
                product_id,
                old_quantity,
                new_quantity,
                reason,
                ..
            } => {
                info!(
                    product_id = %product_id,
                    old_quantity = %old_quantity,
                    new_quantity = %new_quantity,
                    reason = %reason,
                    "Stock level changed"
                );
            }
            other => {
                info!(event = ?other, "Event processed");
            }
        }
    }

    info!("Event channel closed; stopping event loop");
}
