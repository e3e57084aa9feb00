use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use cpg_common::Secret;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::{
    config::PaypalConfig,
    data_objects::{paypal_order_body, AccessTokenResponse, LineItem, PaypalOrder},
    helpers::{build_client, error_details},
    PaypalApiError,
};

/// Tokens are refreshed this long before PayPal says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct AccessToken {
    token: Secret<String>,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_EXPIRY_MARGIN < self.expires_at
    }
}

/// A client for the PayPal Orders v2 API.
///
/// Authentication uses the OAuth2 client-credentials flow. The access token is cached and shared between clones of
/// the client.
#[derive(Clone)]
pub struct PaypalApi {
    config: PaypalConfig,
    client: Arc<Client>,
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl PaypalApi {
    pub fn new(config: PaypalConfig) -> Result<Self, PaypalApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client =
            build_client(headers, config.timeout).map_err(|e| PaypalApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), token: Arc::new(RwLock::new(None)) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn access_token(&self) -> Result<String, PaypalApiError> {
        if let Some(token) = self.token.read().await.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.token.reveal().clone());
        }
        let mut cache = self.token.write().await;
        // Another task may have refreshed the token while we waited for the lock
        if let Some(token) = cache.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.token.reveal().clone());
        }
        debug!("💳️ Requesting a new PayPal access token");
        let response = self
            .client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.reveal()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PaypalApiError::RestResponseError(e.to_string()))?;
        if !response.status().is_success() {
            let (status, message) = error_details(response).await;
            return Err(PaypalApiError::Authentication(format!("Error {status}. {message}")));
        }
        let token = response.json::<AccessTokenResponse>().await.map_err(|e| PaypalApiError::JsonError(e.to_string()))?;
        let expires_at = Instant::now() + Duration::from_secs(token.expires_in);
        let value = token.access_token.clone();
        *cache = Some(AccessToken { token: Secret::new(token.access_token), expires_at });
        trace!("💳️ PayPal access token refreshed. It is valid for {}s", token.expires_in);
        Ok(value)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, PaypalApiError> {
        let token = self.access_token().await?;
        let url = self.url(path);
        trace!("💳️ Sending PayPal query: {method} {url}");
        let mut req = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| PaypalApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ PayPal query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| PaypalApiError::JsonError(e.to_string()))
        } else {
            let (status, message) = error_details(response).await;
            Err(PaypalApiError::QueryError { status, message })
        }
    }

    /// Creates a PayPal order for the given items, to be approved by the buyer and captured later.
    pub async fn create_order(&self, items: &[LineItem]) -> Result<PaypalOrder, PaypalApiError> {
        let body = paypal_order_body(items);
        let order = self.rest_query::<PaypalOrder, Value>(Method::POST, "/v2/checkout/orders", Some(body)).await?;
        info!("💳️ PayPal order {} created for {} items. Status: {}", order.id, items.len(), order.status);
        Ok(order)
    }

    /// Captures the payment for an approved order. Only a `COMPLETED` status means that money moved.
    pub async fn capture_order(&self, order_id: &str) -> Result<PaypalOrder, PaypalApiError> {
        let path = format!("/v2/checkout/orders/{order_id}/capture");
        debug!("💳️ Capturing PayPal order {order_id}");
        let order = self.rest_query::<PaypalOrder, Value>(Method::POST, &path, Some(json!({}))).await?;
        info!("💳️ PayPal order {order_id} capture returned status {}", order.status);
        Ok(order)
    }
}
