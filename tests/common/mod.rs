#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Database, Set};
use sea_orm_migration::MigratorTrait;

use registration_api::{
    config::AppConfig,
    entities::catalog_product::{self, ProductType},
    errors::ServiceError,
    events::EventSender,
    handlers::AppServices,
    migrator::Migrator,
    models::cart::CustomerDraft,
    payments::{
        CreateIntentRequest, PaymentProvider, ProviderCustomer, ProviderPaymentIntent,
    },
    AppState,
};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret_1234567890";

/// In-memory processor double. Records every call so tests can assert on
/// what crossed the capability boundary.
#[derive(Default)]
pub struct MockProvider {
    pub customers: Mutex<Vec<ProviderCustomer>>,
    pub intents: Mutex<Vec<CreateIntentRequest>>,
    pub update_calls: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl MockProvider {
    pub fn seed_customer(&self, id: &str, email: &str) {
        self.customers.lock().unwrap().push(ProviderCustomer {
            id: id.to_string(),
            email: email.to_string(),
        });
    }

    pub fn intent_count(&self) -> usize {
        self.intents.lock().unwrap().len()
    }

    pub fn last_intent(&self) -> CreateIntentRequest {
        self.intents
            .lock()
            .unwrap()
            .last()
            .expect("no intent was created")
            .clone()
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderCustomer>, ServiceError> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn create_customer(
        &self,
        draft: &CustomerDraft,
    ) -> Result<ProviderCustomer, ServiceError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let customer = ProviderCustomer {
            id: format!("cus_mock_{n}"),
            email: draft.normalized_email(),
        };
        self.customers.lock().unwrap().push(customer.clone());
        Ok(customer)
    }

    async fn update_customer(
        &self,
        customer_id: &str,
        _draft: &CustomerDraft,
    ) -> Result<(), ServiceError> {
        self.update_calls
            .lock()
            .unwrap()
            .push(customer_id.to_string());
        Ok(())
    }

    async fn create_payment_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<ProviderPaymentIntent, ServiceError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.intents.lock().unwrap().push(request);
        Ok(ProviderPaymentIntent {
            id: format!("pi_mock_{n}"),
            client_secret: format!("pi_mock_{n}_secret"),
        })
    }
}

pub struct TestApp {
    pub state: AppState,
    pub provider: Arc<MockProvider>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");
        Migrator::up(&db, None).await.expect("migrations failed");
        let db = Arc::new(db);

        let config = test_config();
        let (event_sender, event_rx) = EventSender::channel();
        tokio::spawn(registration_api::events::process_events(event_rx));

        let provider = Arc::new(MockProvider::default());
        let services = AppServices::new(
            db.clone(),
            provider.clone() as Arc<dyn PaymentProvider>,
            event_sender.clone(),
            &config,
        );

        Self {
            state: AppState {
                db,
                config,
                event_sender,
                services,
            },
            provider,
        }
    }

    pub fn router(&self) -> axum::Router {
        registration_api::router(self.state.clone())
    }

    pub async fn insert_product(
        &self,
        product_type: ProductType,
        id: &str,
        name: &str,
        price_minor_units: i64,
    ) {
        catalog_product::ActiveModel {
            id: Set(id.to_string()),
            product_type: Set(product_type),
            name: Set(name.to_string()),
            price_minor_units: Set(price_minor_units),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to insert catalog product");
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        environment: "test".into(),
        log_level: "warn".into(),
        log_json: false,
        currency: "usd".into(),
        minimum_charge_minor_units: 50,
        payment_api_base: "http://localhost:0".into(),
        payment_secret_key: "sk_test_key".into(),
        webhook_secret: TEST_WEBHOOK_SECRET.into(),
        webhook_tolerance_secs: 300,
        provider_timeout_secs: 5,
        db_max_connections: 5,
        db_min_connections: 1,
        auto_migrate: false,
        seed_demo_catalog: false,
        cors_allowed_origins: None,
    }
}

pub fn test_customer(email: &str) -> CustomerDraft {
    CustomerDraft {
        email: email.to_string(),
        name: Some("Jamie Rivera".to_string()),
        phone: Some("+15550100".to_string()),
        address: None,
        shirt_size: Some("M".to_string()),
        measurements: None,
        companion_name: None,
    }
}
