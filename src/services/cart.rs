use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::{
    entities::catalog_product::ProductType,
    errors::ServiceError,
    models::cart::{
        CartLineRequest, LineItemDetails, Participant, ValidatedCart, ValidatedLineItem,
    },
};

use super::catalog::CatalogService;

/// Recomputes every price in a client-submitted cart against the catalog
/// and produces the server-trusted total plus canonical line items.
/// Validation is fail-fast: the first bad line aborts with an error that
/// identifies it.
#[derive(Clone)]
pub struct CartService {
    catalog: Arc<CatalogService>,
    /// Processor minimum chargeable amount for the configured currency.
    minimum_total_minor_units: i64,
}

impl CartService {
    pub fn new(catalog: Arc<CatalogService>, minimum_total_minor_units: i64) -> Self {
        Self {
            catalog,
            minimum_total_minor_units,
        }
    }

    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn validate(&self, lines: &[CartLineRequest]) -> Result<ValidatedCart, ServiceError> {
        let mut line_items = Vec::with_capacity(lines.len());
        let mut total: i64 = 0;

        for line in lines {
            let item = self.validate_line(line).await?;
            total += item.line_total_minor_units;
            line_items.push(item);
        }

        // A zero or negative total is a pricing bug, not a free order;
        // legitimate free orders would need an explicit discount path.
        if total <= 0 || total < self.minimum_total_minor_units {
            return Err(ServiceError::EmptyOrBelowMinimumTotal {
                total,
                minimum: self.minimum_total_minor_units,
            });
        }

        Ok(ValidatedCart {
            total_minor_units: total,
            line_items,
        })
    }

    async fn validate_line(
        &self,
        line: &CartLineRequest,
    ) -> Result<ValidatedLineItem, ServiceError> {
        let product_id = line
            .product_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| malformed(None, "productId is required"))?;
        let product_type = line
            .product_type
            .ok_or_else(|| malformed(Some(product_id), "productType is required"))?;
        let quantity = line
            .quantity
            .ok_or_else(|| malformed(Some(product_id), "quantity is required"))?;
        if quantity < 1 {
            return Err(malformed(Some(product_id), "quantity must be at least 1"));
        }

        let product = self.catalog.resolve(product_type, product_id).await?;
        let unit_price = product.unit_price_minor_units;

        if let Some(claimed) = line.client_claimed_unit_price {
            if claimed != unit_price {
                debug!(
                    product_id,
                    claimed,
                    catalog = unit_price,
                    "ignoring client-claimed unit price"
                );
            }
        }

        match product_type {
            ProductType::Accommodation => {
                let check_in = line
                    .check_in
                    .ok_or_else(|| malformed(Some(product_id), "checkIn is required"))?;
                let check_out = line
                    .check_out
                    .ok_or_else(|| malformed(Some(product_id), "checkOut is required"))?;
                let claimed_nights = line
                    .nights
                    .ok_or_else(|| malformed(Some(product_id), "nights is required"))?;
                let guests = line
                    .guests
                    .ok_or_else(|| malformed(Some(product_id), "guests is required"))?;
                if claimed_nights < 1 {
                    return Err(malformed(Some(product_id), "nights must be at least 1"));
                }
                if guests < 1 {
                    return Err(malformed(Some(product_id), "guests must be at least 1"));
                }

                let computed = computed_nights(check_in, check_out);
                if computed < 1 {
                    return Err(malformed(
                        Some(product_id),
                        "checkOut must be after checkIn",
                    ));
                }
                if computed != i64::from(claimed_nights) {
                    return Err(ServiceError::DateArithmeticMismatch {
                        product_id: product_id.to_string(),
                        claimed: i64::from(claimed_nights),
                        computed,
                    });
                }

                // Priced per night; the line quantity is locked to 1.
                Ok(ValidatedLineItem {
                    product_type,
                    product_id: product_id.to_string(),
                    product_name: product.display_name,
                    quantity: 1,
                    unit_price_minor_units: unit_price,
                    line_total_minor_units: unit_price * computed,
                    details: LineItemDetails::Accommodation {
                        check_in,
                        check_out,
                        nights: claimed_nights,
                        guests,
                        price_per_night_minor_units: unit_price,
                    },
                })
            }
            ProductType::Activity => {
                let participant = match line.participant.as_deref() {
                    Some(raw) => Participant::parse(raw).ok_or_else(|| {
                        malformed(Some(product_id), "unrecognized participant designation")
                    })?,
                    None => Participant::First,
                };
                let effective = i64::from(quantity) * participant.multiplier();
                Ok(ValidatedLineItem {
                    product_type,
                    product_id: product_id.to_string(),
                    product_name: product.display_name,
                    quantity,
                    unit_price_minor_units: unit_price,
                    line_total_minor_units: unit_price * effective,
                    details: LineItemDetails::Activity { participant },
                })
            }
            ProductType::Sponsorship => Ok(ValidatedLineItem {
                product_type,
                product_id: product_id.to_string(),
                product_name: product.display_name,
                quantity,
                unit_price_minor_units: unit_price,
                line_total_minor_units: unit_price * i64::from(quantity),
                details: LineItemDetails::Sponsorship {
                    tier: line.tier.clone(),
                },
            }),
        }
    }
}

/// Whole nights between check-in and check-out.
fn computed_nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

fn malformed(product_id: Option<&str>, reason: &str) -> ServiceError {
    ServiceError::MalformedLineItem {
        product_id: product_id.map(|s| s.to_string()),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn nights_span_whole_days() {
        assert_eq!(computed_nights(date(2025, 8, 23), date(2025, 8, 25)), 2);
        assert_eq!(computed_nights(date(2025, 8, 23), date(2025, 8, 24)), 1);
    }

    #[test]
    fn inverted_ranges_are_non_positive() {
        assert_eq!(computed_nights(date(2025, 8, 25), date(2025, 8, 23)), -2);
        assert_eq!(computed_nights(date(2025, 8, 23), date(2025, 8, 23)), 0);
    }
}
