use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use cpg_engine::{AccountApiError, CartApiError, CheckoutError};
use log::*;
use provider_tools::WebhookError;
use thiserror::Error;

use crate::{request_id::current_request_id, validation::ValidationError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    ValidationError(#[from] ValidationError),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    AlreadyOwned(String),
    #[error("Conflict. {0}")]
    Conflict(String),
    #[error("The cart is empty. There is nothing to check out.")]
    EmptyCart,
    #[error("Payment was not completed. {0}")]
    CaptureFailed(String),
    #[error("The payment provider failed. {0}")]
    ProviderError(String),
    #[error("Webhook signature rejected. {0}")]
    SignatureError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AlreadyOwned(_) => StatusCode::BAD_REQUEST,
            Self::SignatureError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::CaptureFailed(_) => StatusCode::PAYMENT_REQUIRED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::EmptyCart => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ProviderError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let req_id = current_request_id().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        if status.is_server_error() {
            error!("💻️ [req_id {req_id}] {status}: {self}");
        } else {
            debug!("💻️ [req_id {req_id}] {status}: {self}");
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No bearer token was provided.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Access token has expired.")]
    TokenExpired,
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
            CheckoutError::EmptyCart => Self::EmptyCart,
            CheckoutError::CourseNotFound(_) => Self::NoRecordFound(e.to_string()),
            CheckoutError::InvalidPrice { .. } => Self::BackendError(e.to_string()),
            CheckoutError::Provider(_) => Self::ProviderError(e.to_string()),
            CheckoutError::CaptureNotCompleted { .. } => Self::CaptureFailed(e.to_string()),
            CheckoutError::OrphanedCharge { .. } => Self::BackendError(e.to_string()),
            CheckoutError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            CheckoutError::OrderExpired(_) => Self::Conflict(e.to_string()),
            CheckoutError::DuplicateProviderId(_) => Self::Conflict(e.to_string()),
        }
    }
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
            CartApiError::CourseNotFound(_) => Self::NoRecordFound(e.to_string()),
            CartApiError::AlreadyOwned(_) => Self::AlreadyOwned(e.to_string()),
        }
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
        }
    }
}

impl From<WebhookError> for ServerError {
    fn from(e: WebhookError) -> Self {
        match e {
            WebhookError::InvalidSignature(s) => Self::SignatureError(s),
            WebhookError::InvalidPayload(s) => Self::InvalidRequestBody(s),
        }
    }
}
