use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events announced by the pipeline. Consumed by a logging task;
/// the channel is fire-and-forget and never blocks request handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    IntentIssued {
        payment_intent_id: String,
        amount_minor_units: i64,
        currency: String,
    },
    OrderMaterialized {
        order_id: Uuid,
        payment_intent_id: String,
        line_item_count: usize,
    },
    PaymentFailureRecorded {
        payment_intent_id: String,
        order_found: bool,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Channel for an in-process consumer plus a sender, sized for burst
    /// webhook delivery.
    pub fn channel() -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(1024);
        (Self::new(tx), rx)
    }

    pub async fn send(&self, event: Event) {
        if let Err(err) = self.sender.send(event).await {
            warn!("event channel closed, dropping event: {}", err);
        }
    }
}

/// Drains the event channel, logging each event. Runs until every sender
/// is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::IntentIssued {
                payment_intent_id,
                amount_minor_units,
                currency,
            } => info!(
                %payment_intent_id,
                amount = amount_minor_units,
                %currency,
                "payment intent issued"
            ),
            Event::OrderMaterialized {
                order_id,
                payment_intent_id,
                line_item_count,
            } => info!(
                %order_id,
                %payment_intent_id,
                line_items = line_item_count,
                "order materialized"
            ),
            Event::PaymentFailureRecorded {
                payment_intent_id,
                order_found,
            } => info!(%payment_intent_id, order_found, "payment failure recorded"),
        }
    }
}
