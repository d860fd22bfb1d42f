use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{
    config::StripeConfig,
    data_objects::{NewPaymentIntent, NewRefund, PaymentIntent, StripeList, StripeRefund},
    helpers::stripe_error_message,
    StripeApiError,
};

/// Stripe caps list pages at 100 objects.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for StripeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StripeApi ({})", self.config.api_url)
    }
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let val = HeaderValue::from_str(&format!("Bearer {}", config.secret_key.reveal()))
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        form: Option<Vec<(String, String)>>,
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(form) = form {
            req = req.form(&form);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RestRequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message: stripe_error_message(&body) })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    pub async fn create_payment_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, StripeApiError> {
        debug!("Creating payment intent for {} {} to {}", intent.amount, intent.currency, intent.destination);
        let result =
            self.rest_query::<PaymentIntent>(Method::POST, "/payment_intents", &[], Some(intent.form_fields())).await?;
        info!("Created payment intent {}", result.id);
        Ok(result)
    }

    pub async fn get_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeApiError> {
        let path = format!("/payment_intents/{id}");
        debug!("Fetching payment intent {id}");
        self.rest_query::<PaymentIntent>(Method::GET, &path, &[], None).await
    }

    /// The most recent payment intents, newest first.
    pub async fn list_payment_intents(&self, limit: usize) -> Result<Vec<PaymentIntent>, StripeApiError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE).to_string();
        let result = self
            .rest_query::<StripeList<PaymentIntent>>(Method::GET, "/payment_intents", &[("limit", limit.as_str())], None)
            .await?;
        debug!("Fetched {} payment intents", result.data.len());
        Ok(result.data)
    }

    pub async fn create_refund(&self, refund: NewRefund) -> Result<StripeRefund, StripeApiError> {
        debug!("Refunding {} on charge {}", refund.amount, refund.charge);
        let result = self.rest_query::<StripeRefund>(Method::POST, "/refunds", &[], Some(refund.form_fields())).await?;
        info!("Refund {} created with status {:?}", result.id, result.status);
        Ok(result)
    }
}
