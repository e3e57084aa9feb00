use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::db_types::{Cents, CourseId, ProviderKind, ProviderTxId};

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("The payment provider could not be reached. {0}")]
    Unreachable(String),
    #[error("The payment provider rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment provider sent a response we could not understand. {0}")]
    InvalidResponse(String),
    #[error("The payment provider integration is misconfigured. {0}")]
    Configuration(String),
}

/// One line of a charge. Every course is charged with a quantity of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeLine {
    pub course_id: CourseId,
    pub name: String,
    pub description: String,
    pub price: Cents,
}

/// A request to open a charge for a computed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeRequest {
    pub total: Cents,
    pub lines: Vec<ChargeLine>,
}

impl ChargeRequest {
    pub fn new(lines: Vec<ChargeLine>) -> Self {
        let total = lines.iter().map(|l| l.price).sum();
        Self { total, lines }
    }
}

/// What the caller needs in order to send the buyer to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChargeInitiation {
    /// Synchronous-capture providers return an approval object that the client completes before calling capture.
    Approval { provider_id: ProviderTxId, payload: Value },
    /// Asynchronous-webhook providers return a hosted payment page to redirect the buyer to.
    Redirect { provider_id: ProviderTxId, redirect_url: String },
}

impl ChargeInitiation {
    pub fn provider_id(&self) -> &ProviderTxId {
        match self {
            ChargeInitiation::Approval { provider_id, .. } | ChargeInitiation::Redirect { provider_id, .. } => {
                provider_id
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Completed,
    /// The provider did not complete the capture. Carries the provider's status for diagnostics.
    NotCompleted(String),
}

/// Every payment provider can open a charge.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    fn kind(&self) -> ProviderKind;

    /// Opens a charge for `charge.total`, with one line per course.
    async fn open_charge(&self, charge: &ChargeRequest) -> Result<ChargeInitiation, ProviderError>;
}

/// Synchronous-capture providers can additionally be asked whether a charge was paid.
///
/// Asynchronous-webhook providers do not implement this trait: their outcome arrives as a signed
/// notification, never as a method call.
#[allow(async_fn_in_trait)]
pub trait CaptureProvider: PaymentProvider {
    /// Captures the approved charge. Only [`CaptureOutcome::Completed`] may lead to fulfilment.
    async fn confirm(&self, provider_id: &ProviderTxId) -> Result<CaptureOutcome, ProviderError>;
}
