use cpg_engine::{
    db_types::{ProviderKind, ProviderTxId},
    traits::{ChargeInitiation, ChargeRequest, PaymentProvider, ProviderError},
};
use provider_tools::{StripeApi, StripeApiError};

use crate::integrations::line_items;

/// Stripe Checkout. The buyer pays on a hosted page and Stripe notifies the webhook when the payment completes.
#[derive(Clone)]
pub struct StripeProvider {
    api: StripeApi,
}

impl StripeProvider {
    pub fn new(api: StripeApi) -> Self {
        Self { api }
    }
}

pub fn provider_error(e: StripeApiError) -> ProviderError {
    match e {
        StripeApiError::Initialization(s) => ProviderError::Configuration(s),
        StripeApiError::RestResponseError(s) => ProviderError::Unreachable(s),
        StripeApiError::JsonError(s) => ProviderError::InvalidResponse(s),
        StripeApiError::QueryError { status, message } => ProviderError::Rejected { status, message },
        StripeApiError::MissingCheckoutUrl(id) => {
            ProviderError::InvalidResponse(format!("Checkout session {id} has no payment page"))
        },
    }
}

impl PaymentProvider for StripeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AsyncWebhook
    }

    async fn open_charge(&self, charge: &ChargeRequest) -> Result<ChargeInitiation, ProviderError> {
        let session = self.api.create_checkout_session(&line_items(charge)).await.map_err(provider_error)?;
        let redirect_url = session.url.ok_or_else(|| {
            ProviderError::InvalidResponse(format!("Checkout session {} has no payment page", session.id))
        })?;
        Ok(ChargeInitiation::Redirect { provider_id: ProviderTxId::from(session.id), redirect_url })
    }
}
