use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{errors::ServiceError, models::cart::CustomerDraft};

use super::{CreateIntentRequest, PaymentProvider, ProviderCustomer, ProviderPaymentIntent};

/// Stripe-style REST gateway: form-encoded requests, bearer-key auth,
/// bounded timeout. The trait keeps the rest of the pipeline vendor-free.
#[derive(Clone)]
pub struct StripeGateway {
    http: Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct CustomerObject {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerList {
    #[serde(default)]
    data: Vec<CustomerObject>,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentObject {
    id: String,
    client_secret: String,
}

impl StripeGateway {
    pub fn new(
        api_base: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("build http client: {e}")))?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_base.trim_end_matches('/'), path)
    }

    /// Profile fields shared by customer create and update calls.
    fn profile_form(draft: &CustomerDraft) -> Vec<(String, String)> {
        let mut form = vec![("name".to_string(), draft.display_name())];
        if let Some(phone) = &draft.phone {
            form.push(("phone".to_string(), phone.clone()));
        }
        if let Some(address) = &draft.address {
            form.push(("address[line1]".to_string(), address.line1.clone()));
            if let Some(line2) = &address.line2 {
                form.push(("address[line2]".to_string(), line2.clone()));
            }
            form.push(("address[city]".to_string(), address.city.clone()));
            form.push(("address[postal_code]".to_string(), address.postal_code.clone()));
            form.push(("address[country]".to_string(), address.country.clone()));
        }
        form
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, ServiceError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(provider_error)?;
        decode(response).await
    }
}

#[async_trait::async_trait]
impl PaymentProvider for StripeGateway {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderCustomer>, ServiceError> {
        let response = self
            .http
            .get(self.url("customers"))
            .bearer_auth(&self.secret_key)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await
            .map_err(provider_error)?;
        let list: CustomerList = decode(response).await?;
        Ok(list.data.into_iter().next().map(|c| ProviderCustomer {
            id: c.id,
            email: c.email.unwrap_or_else(|| email.to_string()),
        }))
    }

    async fn create_customer(
        &self,
        draft: &CustomerDraft,
    ) -> Result<ProviderCustomer, ServiceError> {
        let mut form = Self::profile_form(draft);
        form.push(("email".to_string(), draft.normalized_email()));
        let customer: CustomerObject = self.post_form("customers", &form).await?;
        debug!(customer_id = %customer.id, "created processor customer");
        Ok(ProviderCustomer {
            id: customer.id,
            email: draft.normalized_email(),
        })
    }

    async fn update_customer(
        &self,
        customer_id: &str,
        draft: &CustomerDraft,
    ) -> Result<(), ServiceError> {
        let form = Self::profile_form(draft);
        let _: CustomerObject = self
            .post_form(&format!("customers/{customer_id}"), &form)
            .await?;
        Ok(())
    }

    async fn create_payment_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<ProviderPaymentIntent, ServiceError> {
        let mut form = vec![
            ("amount".to_string(), request.amount_minor_units.to_string()),
            ("currency".to_string(), request.currency.clone()),
            ("customer".to_string(), request.customer_id.clone()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];
        for (key, value) in &request.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        let intent: PaymentIntentObject = self.post_form("payment_intents", &form).await?;
        debug!(intent_id = %intent.id, amount = request.amount_minor_units, "created payment intent");
        Ok(ProviderPaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }
}

fn provider_error(err: reqwest::Error) -> ServiceError {
    ServiceError::PaymentProviderUnavailable(err.to_string())
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(%status, "processor call failed");
        return Err(ServiceError::PaymentProviderUnavailable(format!(
            "processor returned {status}: {body}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::PaymentProviderUnavailable(format!("decode response: {e}")))
}
