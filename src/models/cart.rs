use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::entities::catalog_product::ProductType;

/// One line of a client-submitted cart. Everything here is untrusted and
/// loosely typed on purpose: validation, not deserialization, decides what
/// is acceptable. `client_claimed_unit_price` is never used for pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineRequest {
    pub product_type: Option<ProductType>,
    pub product_id: Option<String>,
    pub quantity: Option<i32>,
    #[serde(default)]
    pub client_claimed_unit_price: Option<i64>,
    /// Activity: which participant(s) the line covers.
    #[serde(default)]
    pub participant: Option<String>,
    /// Sponsorship tier label.
    #[serde(default)]
    pub tier: Option<String>,
    // Accommodation stay details.
    #[serde(default)]
    pub check_in: Option<NaiveDate>,
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
    #[serde(default)]
    pub nights: Option<i32>,
    #[serde(default)]
    pub guests: Option<i32>,
}

/// Participant designation for activity lines. `Both` doubles the
/// effective quantity used for pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participant {
    First,
    Second,
    Both,
}

impl Participant {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "first" => Some(Self::First),
            "second" => Some(Self::Second),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn multiplier(self) -> i64 {
        match self {
            Self::Both => 2,
            _ => 1,
        }
    }
}

/// Type-specific payload of a validated line, a tagged union so that a
/// missing field is a parse error rather than a latent runtime surprise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineItemDetails {
    Activity {
        participant: Participant,
    },
    Accommodation {
        check_in: NaiveDate,
        check_out: NaiveDate,
        nights: i32,
        guests: i32,
        price_per_night_minor_units: i64,
    },
    Sponsorship {
        tier: Option<String>,
    },
}

/// Server-derived line item. Immutable once produced; embedded verbatim
/// into intent metadata and later copied into order rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedLineItem {
    pub product_type: ProductType,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_minor_units: i64,
    pub line_total_minor_units: i64,
    pub details: LineItemDetails,
}

/// Output of cart validation: the trusted total plus the canonical lines.
#[derive(Debug, Clone)]
pub struct ValidatedCart {
    pub total_minor_units: i64,
    pub line_items: Vec<ValidatedLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Customer profile as submitted at checkout. Only the email is required;
/// it is the natural key and is normalized to lower case everywhere.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<PostalAddress>,
    #[serde(default)]
    pub shirt_size: Option<String>,
    #[serde(default)]
    pub measurements: Option<Value>,
    #[serde(default)]
    pub companion_name: Option<String>,
}

impl CustomerDraft {
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_ascii_lowercase()
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_default()
    }
}
