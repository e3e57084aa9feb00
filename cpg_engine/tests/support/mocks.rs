use cpg_engine::{
    db_types::{ProviderKind, ProviderTxId},
    traits::{
        CaptureOutcome,
        CaptureProvider,
        ChargeInitiation,
        ChargeRequest,
        PaymentProvider,
        ProviderError,
    },
};
use mockall::mock;
use serde_json::json;

mock! {
    pub PaypalProvider {}
    impl PaymentProvider for PaypalProvider {
        fn kind(&self) -> ProviderKind;
        async fn open_charge(&self, charge: &ChargeRequest) -> Result<ChargeInitiation, ProviderError>;
    }
    impl CaptureProvider for PaypalProvider {
        async fn confirm(&self, provider_id: &ProviderTxId) -> Result<CaptureOutcome, ProviderError>;
    }
}

mock! {
    pub StripeProvider {}
    impl PaymentProvider for StripeProvider {
        fn kind(&self) -> ProviderKind;
        async fn open_charge(&self, charge: &ChargeRequest) -> Result<ChargeInitiation, ProviderError>;
    }
}

pub fn approval(provider_id: &str) -> ChargeInitiation {
    ChargeInitiation::Approval { provider_id: provider_id.into(), payload: json!({ "id": provider_id }) }
}

pub fn redirect(session_id: &str) -> ChargeInitiation {
    ChargeInitiation::Redirect {
        provider_id: session_id.into(),
        redirect_url: format!("https://checkout.example.com/pay/{session_id}"),
    }
}

/// A capture provider that opens a charge with the given id and confirms it with `outcome`.
pub fn capture_provider(provider_id: &'static str, outcome: CaptureOutcome) -> MockPaypalProvider {
    let mut provider = MockPaypalProvider::new();
    provider.expect_kind().return_const(ProviderKind::SyncCapture);
    provider.expect_open_charge().returning(move |_| Ok(approval(provider_id)));
    provider.expect_confirm().returning(move |_| Ok(outcome.clone()));
    provider
}

pub fn webhook_provider(session_id: &'static str) -> MockStripeProvider {
    let mut provider = MockStripeProvider::new();
    provider.expect_kind().return_const(ProviderKind::AsyncWebhook);
    provider.expect_open_charge().returning(move |_| Ok(redirect(session_id)));
    provider
}
