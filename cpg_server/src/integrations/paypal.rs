use cpg_engine::{
    db_types::{ProviderKind, ProviderTxId},
    traits::{CaptureOutcome, CaptureProvider, ChargeInitiation, ChargeRequest, PaymentProvider, ProviderError},
};
use log::*;
use provider_tools::{PaypalApi, PaypalApiError, PaypalOrder};
use serde_json::Value;

use crate::integrations::line_items;

/// PayPal orders are approved by the buyer in the PayPal UI and then captured by the gateway on the client's request.
#[derive(Clone)]
pub struct PaypalProvider {
    api: PaypalApi,
}

impl PaypalProvider {
    pub fn new(api: PaypalApi) -> Self {
        Self { api }
    }
}

pub fn provider_error(e: PaypalApiError) -> ProviderError {
    match e {
        PaypalApiError::Initialization(s) | PaypalApiError::Authentication(s) => ProviderError::Configuration(s),
        PaypalApiError::RestResponseError(s) => ProviderError::Unreachable(s),
        PaypalApiError::JsonError(s) => ProviderError::InvalidResponse(s),
        PaypalApiError::QueryError { status, message } => ProviderError::Rejected { status, message },
    }
}

impl PaymentProvider for PaypalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SyncCapture
    }

    async fn open_charge(&self, charge: &ChargeRequest) -> Result<ChargeInitiation, ProviderError> {
        let order = self.api.create_order(&line_items(charge)).await.map_err(provider_error)?;
        let payload = serde_json::to_value(&order).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(ChargeInitiation::Approval { provider_id: ProviderTxId::from(order.id), payload })
    }
}

/// Pulls the first `details[].issue` (e.g. `INSTRUMENT_DECLINED`) out of a PayPal error body, falling back to the
/// error `name` and then to the raw body.
fn paypal_issue(message: &str) -> String {
    let Ok(body) = serde_json::from_str::<Value>(message) else {
        return message.to_string();
    };
    body["details"][0]["issue"].as_str().or_else(|| body["name"].as_str()).unwrap_or(message).to_string()
}

/// Interprets the result of a capture call.
///
/// PayPal reports declined or unapproved payments as 4xx responses, so those are failed captures rather than provider
/// trouble. Expired credentials (401) and throttling (429) stay provider errors, as do 5xx and transport failures.
pub fn capture_outcome(
    provider_id: &ProviderTxId,
    result: Result<PaypalOrder, PaypalApiError>,
) -> Result<CaptureOutcome, ProviderError> {
    match result {
        Ok(order) if order.is_completed() => Ok(CaptureOutcome::Completed),
        Ok(order) => {
            warn!("💳️ PayPal capture for {provider_id} returned {}. Payment did not complete.", order.status);
            Ok(CaptureOutcome::NotCompleted(order.status))
        },
        Err(PaypalApiError::QueryError { status, message })
            if (400..500).contains(&status) && status != 401 && status != 429 =>
        {
            let issue = paypal_issue(&message);
            warn!("💳️ PayPal refused to capture {provider_id} ({status}): {issue}");
            Ok(CaptureOutcome::NotCompleted(issue))
        },
        Err(e) => Err(provider_error(e)),
    }
}

impl CaptureProvider for PaypalProvider {
    async fn confirm(&self, provider_id: &ProviderTxId) -> Result<CaptureOutcome, ProviderError> {
        let result = self.api.capture_order(provider_id.as_str()).await;
        capture_outcome(provider_id, result)
    }
}
