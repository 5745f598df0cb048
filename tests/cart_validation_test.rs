mod common;

use chrono::NaiveDate;
use common::TestApp;

use registration_api::{
    entities::catalog_product::ProductType,
    errors::ServiceError,
    models::cart::{CartLineRequest, LineItemDetails, Participant},
};

fn line(product_type: ProductType, product_id: &str, quantity: i32) -> CartLineRequest {
    CartLineRequest {
        product_type: Some(product_type),
        product_id: Some(product_id.to_string()),
        quantity: Some(quantity),
        client_claimed_unit_price: None,
        participant: None,
        tier: None,
        check_in: None,
        check_out: None,
        nights: None,
        guests: None,
    }
}

fn stay(
    product_id: &str,
    check_in: (i32, u32, u32),
    check_out: (i32, u32, u32),
    nights: i32,
) -> CartLineRequest {
    let mut request = line(ProductType::Accommodation, product_id, 1);
    request.check_in = NaiveDate::from_ymd_opt(check_in.0, check_in.1, check_in.2);
    request.check_out = NaiveDate::from_ymd_opt(check_out.0, check_out.1, check_out.2);
    request.nights = Some(nights);
    request.guests = Some(2);
    request
}

#[tokio::test]
async fn single_activity_line_totals_its_catalog_price() {
    let app = TestApp::new().await;
    app.insert_product(ProductType::Activity, "hike", "Guided summit hike", 5_000)
        .await;

    let cart = app
        .state
        .services
        .cart
        .validate(&[line(ProductType::Activity, "hike", 1)])
        .await
        .expect("cart should validate");

    assert_eq!(cart.total_minor_units, 5_000);
    assert_eq!(cart.line_items.len(), 1);
    let item = &cart.line_items[0];
    assert_eq!(item.line_total_minor_units, 5_000);
    assert_eq!(item.unit_price_minor_units, 5_000);
    assert_eq!(item.product_name, "Guided summit hike");
}

#[tokio::test]
async fn client_claimed_price_never_affects_the_total() {
    let app = TestApp::new().await;
    app.insert_product(ProductType::Activity, "hike", "Guided summit hike", 5_000)
        .await;

    let mut cheap = line(ProductType::Activity, "hike", 1);
    cheap.client_claimed_unit_price = Some(1);

    let cart = app
        .state
        .services
        .cart
        .validate(&[cheap])
        .await
        .expect("cart should validate");

    assert_eq!(cart.total_minor_units, 5_000);
}

#[tokio::test]
async fn accommodation_totals_price_per_night_times_nights() {
    let app = TestApp::new().await;
    app.insert_product(
        ProductType::Accommodation,
        "lakeside-cabin",
        "Lakeside cabin",
        20_000,
    )
    .await;

    let cart = app
        .state
        .services
        .cart
        .validate(&[stay("lakeside-cabin", (2025, 8, 23), (2025, 8, 25), 2)])
        .await
        .expect("stay should validate");

    assert_eq!(cart.total_minor_units, 40_000);
    let item = &cart.line_items[0];
    assert_eq!(item.quantity, 1, "accommodation quantity is locked to 1");
    assert_eq!(item.line_total_minor_units, 40_000);
    match &item.details {
        LineItemDetails::Accommodation { nights, guests, .. } => {
            assert_eq!(*nights, 2);
            assert_eq!(*guests, 2);
        }
        other => panic!("expected accommodation details, got {other:?}"),
    }
}

#[tokio::test]
async fn mismatched_nights_claim_is_rejected() {
    let app = TestApp::new().await;
    app.insert_product(
        ProductType::Accommodation,
        "lakeside-cabin",
        "Lakeside cabin",
        20_000,
    )
    .await;

    let err = app
        .state
        .services
        .cart
        .validate(&[stay("lakeside-cabin", (2025, 8, 23), (2025, 8, 25), 3)])
        .await
        .expect_err("mismatched nights must be rejected");

    match err {
        ServiceError::DateArithmeticMismatch {
            product_id,
            claimed,
            computed,
        } => {
            assert_eq!(product_id, "lakeside-cabin");
            assert_eq!(claimed, 3);
            assert_eq!(computed, 2);
        }
        other => panic!("expected DateArithmeticMismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn inverted_stay_dates_are_malformed() {
    let app = TestApp::new().await;
    app.insert_product(
        ProductType::Accommodation,
        "lakeside-cabin",
        "Lakeside cabin",
        20_000,
    )
    .await;

    let err = app
        .state
        .services
        .cart
        .validate(&[stay("lakeside-cabin", (2025, 8, 25), (2025, 8, 23), 2)])
        .await
        .expect_err("inverted dates must be rejected");

    assert!(matches!(err, ServiceError::MalformedLineItem { .. }));
}

#[tokio::test]
async fn both_participants_doubles_an_activity_line() {
    let app = TestApp::new().await;
    app.insert_product(ProductType::Activity, "kayak-tour", "Kayak tour", 15_000)
        .await;

    let mut both = line(ProductType::Activity, "kayak-tour", 1);
    both.participant = Some("Both".to_string());

    let cart = app
        .state
        .services
        .cart
        .validate(&[both])
        .await
        .expect("cart should validate");

    assert_eq!(cart.total_minor_units, 30_000);
    let item = &cart.line_items[0];
    assert_eq!(item.line_total_minor_units, 30_000);
    assert!(matches!(
        item.details,
        LineItemDetails::Activity {
            participant: Participant::Both
        }
    ));
}

#[tokio::test]
async fn unknown_product_fails_fast_with_the_offending_id() {
    let app = TestApp::new().await;
    app.insert_product(ProductType::Activity, "hike", "Guided summit hike", 5_000)
        .await;

    let err = app
        .state
        .services
        .cart
        .validate(&[
            line(ProductType::Activity, "hike", 1),
            line(ProductType::Activity, "ghost-walk", 1),
        ])
        .await
        .expect_err("unknown product must be rejected");

    match &err {
        ServiceError::ProductNotFound { product_id, .. } => {
            assert_eq!(product_id, "ghost-walk");
        }
        other => panic!("expected ProductNotFound, got {other:?}"),
    }
    assert_eq!(err.failing_item_id(), Some("ghost-walk"));
}

#[tokio::test]
async fn sponsorship_scales_with_quantity() {
    let app = TestApp::new().await;
    app.insert_product(
        ProductType::Sponsorship,
        "bronze-sponsor",
        "Bronze sponsorship",
        50_000,
    )
    .await;

    let mut sponsor = line(ProductType::Sponsorship, "bronze-sponsor", 2);
    sponsor.tier = Some("bronze".to_string());

    let cart = app
        .state
        .services
        .cart
        .validate(&[sponsor])
        .await
        .expect("cart should validate");

    assert_eq!(cart.total_minor_units, 100_000);
}

#[tokio::test]
async fn missing_quantity_is_malformed() {
    let app = TestApp::new().await;
    app.insert_product(ProductType::Activity, "hike", "Guided summit hike", 5_000)
        .await;

    let mut request = line(ProductType::Activity, "hike", 1);
    request.quantity = None;

    let err = app
        .state
        .services
        .cart
        .validate(&[request])
        .await
        .expect_err("missing quantity must be rejected");

    assert!(matches!(err, ServiceError::MalformedLineItem { .. }));
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let app = TestApp::new().await;

    let err = app
        .state
        .services
        .cart
        .validate(&[])
        .await
        .expect_err("empty cart must be rejected");

    assert!(matches!(
        err,
        ServiceError::EmptyOrBelowMinimumTotal { total: 0, .. }
    ));
}

#[tokio::test]
async fn totals_below_the_processor_minimum_are_rejected() {
    let app = TestApp::new().await;
    app.insert_product(ProductType::Activity, "sticker", "Event sticker", 10)
        .await;

    let err = app
        .state
        .services
        .cart
        .validate(&[line(ProductType::Activity, "sticker", 1)])
        .await
        .expect_err("sub-minimum total must be rejected");

    match err {
        ServiceError::EmptyOrBelowMinimumTotal { total, minimum } => {
            assert_eq!(total, 10);
            assert_eq!(minimum, 50);
        }
        other => panic!("expected EmptyOrBelowMinimumTotal, got {other:?}"),
    }
}

#[tokio::test]
async fn negative_catalog_price_is_an_invalid_price() {
    let app = TestApp::new().await;
    app.insert_product(ProductType::Activity, "bad-price", "Broken row", -100)
        .await;

    let err = app
        .state
        .services
        .cart
        .validate(&[line(ProductType::Activity, "bad-price", 1)])
        .await
        .expect_err("negative catalog price must be rejected");

    assert!(matches!(err, ServiceError::InvalidCatalogPrice { .. }));
}

#[tokio::test]
async fn product_type_must_match_the_catalog_row() {
    let app = TestApp::new().await;
    app.insert_product(ProductType::Activity, "hike", "Guided summit hike", 5_000)
        .await;

    let err = app
        .state
        .services
        .cart
        .validate(&[line(ProductType::Sponsorship, "hike", 1)])
        .await
        .expect_err("type mismatch must be rejected");

    assert!(matches!(err, ServiceError::ProductNotFound { .. }));
}
