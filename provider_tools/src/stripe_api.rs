use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};

use crate::{
    config::StripeConfig,
    data_objects::{checkout_session_form, CheckoutSession, LineItem},
    helpers::{build_client, error_details},
    StripeApiError,
};

/// A client for Stripe Checkout. Payment outcomes are not queried here; they arrive as signed webhooks and are
/// checked by [`crate::WebhookVerifier`].
#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let val = HeaderValue::from_str(&format!("Bearer {}", config.secret_key.reveal()))
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        let client =
            build_client(headers, config.timeout).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Creates a hosted checkout session in `payment` mode, with one line per item.
    pub async fn create_checkout_session(&self, items: &[LineItem]) -> Result<CheckoutSession, StripeApiError> {
        let form = checkout_session_form(items, &self.config.success_url, &self.config.cancel_url);
        let url = self.url("/v1/checkout/sessions");
        trace!("💳️ Creating Stripe checkout session: {url}");
        let response =
            self.client.post(url).form(&form).send().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let (status, message) = error_details(response).await;
            return Err(StripeApiError::QueryError { status, message });
        }
        let session = response.json::<CheckoutSession>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))?;
        if session.url.is_none() {
            return Err(StripeApiError::MissingCheckoutUrl(session.id));
        }
        info!("💳️ Stripe checkout session {} created for {} items", session.id, items.len());
        Ok(session)
    }
}
