//! Request input validation.
//!
//! A [`RequestValidator`] is built once when the server starts and handed to the handlers as `web::Data`. Handlers
//! never see raw path or body input: they ask the validator for typed identifiers instead.
use cpg_engine::db_types::{CourseId, ProviderTxId};
use log::debug;
use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::{data_objects::AddToCartRequest, errors::ServerError};

pub const MAX_PROVIDER_ID_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}. {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new<S: Into<String>>(field: &str, message: S) -> Self {
        Self { field: field.to_string(), message: message.into() }
    }
}

#[derive(Debug, Clone)]
pub struct RequestValidator {
    provider_id_pattern: Regex,
    max_provider_id_length: usize,
}

impl RequestValidator {
    pub fn new(max_provider_id_length: usize) -> Result<Self, ServerError> {
        let provider_id_pattern = Regex::new(r"^[A-Za-z0-9_-]+$")
            .map_err(|e| ServerError::InitializeError(format!("Invalid provider id pattern. {e}")))?;
        Ok(Self { provider_id_pattern, max_provider_id_length })
    }

    /// Course ids are UUIDs.
    pub fn course_id(&self, raw: &str) -> Result<CourseId, ValidationError> {
        Uuid::parse_str(raw).map_err(|e| {
            debug!("💻️ Rejected course id '{raw}'. {e}");
            ValidationError::new("courseId", format!("'{raw}' is not a valid course id"))
        })?;
        Ok(CourseId::from(raw))
    }

    /// Provider ids are opaque, but are only ever made of ASCII letters, digits, `_` and `-`.
    pub fn provider_id(&self, raw: &str) -> Result<ProviderTxId, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::new("providerId", "The provider id is empty"));
        }
        if raw.len() > self.max_provider_id_length {
            return Err(ValidationError::new(
                "providerId",
                format!("The provider id is longer than {} characters", self.max_provider_id_length),
            ));
        }
        if !self.provider_id_pattern.is_match(raw) {
            return Err(ValidationError::new("providerId", "The provider id contains invalid characters"));
        }
        Ok(ProviderTxId::from(raw))
    }

    pub fn add_to_cart_body(&self, body: &[u8]) -> Result<CourseId, ValidationError> {
        let request = serde_json::from_slice::<AddToCartRequest>(body)
            .map_err(|e| ValidationError::new("body", format!("Expected {{\"courseId\": \"<uuid>\"}}. {e}")))?;
        self.course_id(request.course_id.trim())
    }
}
