use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};

use crate::entities::catalog_product::ProductType;

/// Error body returned to HTTP callers. Cart-submission failures carry
/// `failing_item_id` so the client can point at the offending line.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "failingItemId", skip_serializing_if = "Option::is_none")]
    pub failing_item_id: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    // Client-input class: 4xx, attributable to a cart line.
    #[error("Malformed line item: {reason}")]
    MalformedLineItem {
        product_id: Option<String>,
        reason: String,
    },

    #[error("Stay dates for {product_id} span {computed} night(s) but the cart claims {claimed}")]
    DateArithmeticMismatch {
        product_id: String,
        claimed: i64,
        computed: i64,
    },

    #[error("No {product_type} with id {product_id} exists in the catalog")]
    ProductNotFound {
        product_type: ProductType,
        product_id: String,
    },

    #[error("Catalog price for {product_type} {product_id} is not a valid amount in minor units")]
    InvalidCatalogPrice {
        product_type: ProductType,
        product_id: String,
    },

    #[error("Order total {total} is below the minimum chargeable amount of {minimum}")]
    EmptyOrBelowMinimumTotal { total: i64, minimum: i64 },

    // Infrastructure class: retryable by the caller / the processor.
    #[error("Payment provider unavailable: {0}")]
    PaymentProviderUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    // Fatal: redelivery cannot repair the payload.
    #[error("Corrupt payment-intent metadata: {0}")]
    CorruptIntentMetadata(String),

    #[error("Webhook signature verification failed")]
    SignatureVerificationFailed,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedLineItem { .. }
            | Self::DateArithmeticMismatch { .. }
            | Self::InvalidCatalogPrice { .. }
            | Self::ValidationError(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ProductNotFound { .. } => StatusCode::NOT_FOUND,
            Self::EmptyOrBelowMinimumTotal { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SignatureVerificationFailed => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PaymentProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::DatabaseError(_)
            | Self::CorruptIntentMetadata(_)
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for HTTP responses. Store and metadata internals
    /// are replaced with generic text; client-input errors keep their
    /// actionable detail.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::CorruptIntentMetadata(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// The cart line this error is attributable to, if any.
    pub fn failing_item_id(&self) -> Option<&str> {
        match self {
            Self::MalformedLineItem { product_id, .. } => product_id.as_deref(),
            Self::DateArithmeticMismatch { product_id, .. } => Some(product_id),
            Self::ProductNotFound { product_id, .. } => Some(product_id),
            Self::InvalidCatalogPrice { product_id, .. } => Some(product_id),
            _ => None,
        }
    }

    /// Whether processor-driven redelivery can make this error go away.
    /// Used by the webhook receiver to pick 500 (retry) vs 200 (ack).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::PaymentProviderUnavailable(_) | Self::InternalError(_)
        )
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: self.response_message(),
            failing_item_id: self.failing_item_id().map(|s| s.to_string()),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_input_errors_identify_the_failing_line() {
        let err = ServiceError::ProductNotFound {
            product_type: ProductType::Activity,
            product_id: "hike".into(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.failing_item_id(), Some("hike"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn store_errors_do_not_leak_detail() {
        let err = ServiceError::DatabaseError(DbErr::Custom("connection refused".into()));
        assert_eq!(err.response_message(), "Database error");
        assert!(err.is_retryable());
    }

    #[test]
    fn corrupt_metadata_is_not_retryable() {
        let err = ServiceError::CorruptIntentMetadata("missing line_items".into());
        assert!(!err.is_retryable());
    }
}
