use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Event kinds the receiver dispatches on. Anything else is acknowledged
/// and ignored.
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// Inbound processor notification envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventData {
    pub object: PaymentIntentObject,
}

/// The payment-intent object inside a notification. `amount_received`
/// reflects what the processor actually captured and takes precedence
/// over the authorized `amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub amount_received: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntentObject {
    /// The amount the processor actually captured. `None` when the payload
    /// carries no amount at all; callers must not default it to zero.
    pub fn captured_amount(&self) -> Option<i64> {
        self.amount_received.or(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_received_wins_over_amount() {
        let object = PaymentIntentObject {
            id: "pi_1".into(),
            amount: Some(5_000),
            amount_received: Some(4_500),
            currency: Some("usd".into()),
            metadata: HashMap::new(),
        };
        assert_eq!(object.captured_amount(), Some(4_500));
    }

    #[test]
    fn wholly_missing_amount_is_not_zero() {
        let object = PaymentIntentObject {
            id: "pi_1".into(),
            amount: None,
            amount_received: None,
            currency: None,
            metadata: HashMap::new(),
        };
        assert_eq!(object.captured_amount(), None);
    }

    #[test]
    fn envelope_parses_a_minimal_event() {
        let raw = r#"{
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_42", "amount": 1000 } }
        }"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, EVENT_PAYMENT_SUCCEEDED);
        assert_eq!(event.data.object.id, "pi_42");
        assert_eq!(event.data.object.captured_amount(), Some(1_000));
    }
}
