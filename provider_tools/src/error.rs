use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaypalApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not obtain a PayPal access token: {0}")]
    Authentication(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("PayPal query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum StripeApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Stripe query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Stripe did not return a checkout URL for session {0}")]
    MissingCheckoutUrl(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Invalid webhook signature. {0}")]
    InvalidSignature(String),
    #[error("Invalid webhook payload. {0}")]
    InvalidPayload(String),
}
