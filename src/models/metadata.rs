use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

use super::cart::{CustomerDraft, ValidatedLineItem};

/// Current metadata schema version. Bump when the embedded shape changes;
/// parsing rejects anything else as corrupt.
pub const SCHEMA_VERSION: u32 = 1;

const KEY_SCHEMA_VERSION: &str = "schema_version";
const KEY_LINE_ITEMS: &str = "line_items";
const KEY_CUSTOMER: &str = "customer";

/// Order content carried through the payment intent. The pipeline is
/// stateless between intent creation and the asynchronous confirmation,
/// so this is the only channel moving the validated cart forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub schema_version: u32,
    pub line_items: Vec<ValidatedLineItem>,
    pub customer: CustomerDraft,
}

impl IntentMetadata {
    pub fn new(line_items: Vec<ValidatedLineItem>, customer: CustomerDraft) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            line_items,
            customer,
        }
    }

    /// Flatten into the processor's string-to-string metadata map.
    pub fn to_provider_map(&self) -> Result<HashMap<String, String>, ServiceError> {
        let mut map = HashMap::new();
        map.insert(KEY_SCHEMA_VERSION.to_string(), self.schema_version.to_string());
        map.insert(
            KEY_LINE_ITEMS.to_string(),
            serde_json::to_string(&self.line_items)
                .map_err(|e| ServiceError::InternalError(format!("serialize line items: {e}")))?,
        );
        map.insert(
            KEY_CUSTOMER.to_string(),
            serde_json::to_string(&self.customer)
                .map_err(|e| ServiceError::InternalError(format!("serialize customer: {e}")))?,
        );
        Ok(map)
    }

    /// Parse back out of a notification's metadata map. Any missing key,
    /// version mismatch, or JSON failure is `CorruptIntentMetadata`:
    /// redelivery will never make the payload parseable.
    pub fn from_provider_map(map: &HashMap<String, String>) -> Result<Self, ServiceError> {
        let version: u32 = map
            .get(KEY_SCHEMA_VERSION)
            .ok_or_else(|| corrupt("schema_version missing"))?
            .parse()
            .map_err(|_| corrupt("schema_version is not an integer"))?;
        if version != SCHEMA_VERSION {
            return Err(corrupt(&format!("unsupported schema_version {version}")));
        }

        let line_items: Vec<ValidatedLineItem> = serde_json::from_str(
            map.get(KEY_LINE_ITEMS)
                .ok_or_else(|| corrupt("line_items missing"))?,
        )
        .map_err(|e| corrupt(&format!("line_items unparseable: {e}")))?;

        let customer: CustomerDraft = serde_json::from_str(
            map.get(KEY_CUSTOMER)
                .ok_or_else(|| corrupt("customer missing"))?,
        )
        .map_err(|e| corrupt(&format!("customer unparseable: {e}")))?;

        Ok(Self {
            schema_version: version,
            line_items,
            customer,
        })
    }
}

fn corrupt(reason: &str) -> ServiceError {
    ServiceError::CorruptIntentMetadata(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::catalog_product::ProductType;
    use crate::models::cart::{LineItemDetails, Participant};

    fn sample() -> IntentMetadata {
        IntentMetadata::new(
            vec![ValidatedLineItem {
                product_type: ProductType::Activity,
                product_id: "hike".into(),
                product_name: "Guided hike".into(),
                quantity: 1,
                unit_price_minor_units: 5_000,
                line_total_minor_units: 5_000,
                details: LineItemDetails::Activity {
                    participant: Participant::First,
                },
            }],
            CustomerDraft {
                email: "jamie@example.com".into(),
                name: Some("Jamie".into()),
                phone: None,
                address: None,
                shirt_size: None,
                measurements: None,
                companion_name: None,
            },
        )
    }

    #[test]
    fn round_trips_through_the_provider_map() {
        let meta = sample();
        let map = meta.to_provider_map().unwrap();
        let back = IntentMetadata::from_provider_map(&map).unwrap();
        assert_eq!(back.schema_version, SCHEMA_VERSION);
        assert_eq!(back.line_items, meta.line_items);
        assert_eq!(back.line_items[0].unit_price_minor_units, 5_000);
        assert_eq!(back.customer.email, "jamie@example.com");
    }

    #[test]
    fn missing_line_items_is_corrupt() {
        let mut map = sample().to_provider_map().unwrap();
        map.remove("line_items");
        let err = IntentMetadata::from_provider_map(&map).unwrap_err();
        assert!(matches!(err, ServiceError::CorruptIntentMetadata(_)));
    }

    #[test]
    fn wrong_schema_version_is_corrupt() {
        let mut map = sample().to_provider_map().unwrap();
        map.insert("schema_version".into(), "2".into());
        let err = IntentMetadata::from_provider_map(&map).unwrap_err();
        assert!(matches!(err, ServiceError::CorruptIntentMetadata(_)));
    }
}
