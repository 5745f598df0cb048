pub mod checkout;
pub mod health;
pub mod webhooks;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig,
    events::EventSender,
    payments::PaymentProvider,
    services::{CartService, CatalogService, OrderService, PaymentIntentService},
};

/// Services shared by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub payments: Arc<PaymentIntentService>,
    pub orders: Arc<OrderService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        provider: Arc<dyn PaymentProvider>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        let catalog = Arc::new(CatalogService::new(db.clone()));
        let cart = Arc::new(CartService::new(
            catalog.clone(),
            config.minimum_charge_minor_units,
        ));
        let payments = Arc::new(PaymentIntentService::new(
            db.clone(),
            provider,
            event_sender.clone(),
            config.currency.clone(),
        ));
        let orders = Arc::new(OrderService::new(db, event_sender));
        Self {
            catalog,
            cart,
            payments,
            orders,
        }
    }
}
