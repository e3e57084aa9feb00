//! Stripe webhook authentication.
//!
//! Stripe signs each notification with the endpoint's signing secret. The `Stripe-Signature` header has the form
//! `t=<unix timestamp>,v1=<hex signature>[,v1=<hex signature>...]`, and each signature is
//! `HMAC-SHA256(secret, "<t>.<raw body>")`. During secret rotation more than one `v1` entry may be present; any one
//! of them matching is sufficient.
use chrono::Utc;
use cpg_common::Secret;
use hmac::{Hmac, Mac};
use log::*;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use crate::WebhookError;

type HmacSha256 = Hmac<Sha256>;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
const PAYMENT_MODE: &str = "payment";

/// What a verified notification asks the gateway to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// A hosted checkout in payment mode completed. The session id is the provider transaction id of the order.
    CheckoutCompleted { session_id: String },
    /// Authentic, but not something the gateway acts on.
    Ignored { event_type: String, reason: String },
}

#[derive(Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Deserialize)]
struct EventData {
    object: Value,
}

#[derive(Deserialize)]
struct SessionObject {
    id: String,
    mode: String,
}

#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Secret<String>,
    tolerance: i64,
}

impl WebhookVerifier {
    /// `tolerance` is the maximum allowed distance, in seconds, between the signature timestamp and now.
    pub fn new(secret: Secret<String>, tolerance: i64) -> Self {
        Self { secret, tolerance }
    }

    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<WebhookEvent, WebhookError> {
        self.verify_at(payload, signature_header, Utc::now().timestamp())
    }

    /// As [`Self::verify`], with an explicit notion of the current time.
    pub fn verify_at(&self, payload: &[u8], signature_header: &str, now: i64) -> Result<WebhookEvent, WebhookError> {
        self.check_signature(payload, signature_header, now)?;
        parse_event(payload)
    }

    fn check_signature(&self, payload: &[u8], header: &str, now: i64) -> Result<(), WebhookError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", t)) => timestamp = t.parse::<i64>().ok(),
                Some(("v1", sig)) => signatures.push(sig),
                _ => {},
            }
        }
        let timestamp =
            timestamp.ok_or_else(|| WebhookError::InvalidSignature("Missing or malformed timestamp".into()))?;
        if signatures.is_empty() {
            return Err(WebhookError::InvalidSignature("No v1 signature present".into()));
        }
        if now.abs_diff(timestamp) > self.tolerance.unsigned_abs() {
            warn!("🔐️ Webhook timestamp {timestamp} is outside the {}s tolerance (now: {now})", self.tolerance);
            return Err(WebhookError::InvalidSignature("Timestamp outside the tolerance zone".into()));
        }
        let mac = signed_content_mac(self.secret.reveal(), timestamp, payload)?;
        // verify_slice compares in constant time
        let matched = signatures
            .into_iter()
            .filter_map(|s| hex::decode(s).ok())
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());
        if matched {
            trace!("🔐️ Webhook signature verified");
            Ok(())
        } else {
            warn!("🔐️ Webhook signature mismatch");
            Err(WebhookError::InvalidSignature("No signature matches the payload".into()))
        }
    }
}

fn parse_event(payload: &[u8]) -> Result<WebhookEvent, WebhookError> {
    let event: EventEnvelope =
        serde_json::from_slice(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
    if event.event_type != CHECKOUT_SESSION_COMPLETED {
        debug!("🔐️ Ignoring webhook event of type {}", event.event_type);
        return Ok(WebhookEvent::Ignored { event_type: event.event_type, reason: "Unhandled event type".into() });
    }
    let session: SessionObject =
        serde_json::from_value(event.data.object).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
    if session.mode != PAYMENT_MODE {
        debug!("🔐️ Ignoring completed session {} in {} mode", session.id, session.mode);
        return Ok(WebhookEvent::Ignored {
            event_type: event.event_type,
            reason: format!("Session mode is {}", session.mode),
        });
    }
    Ok(WebhookEvent::CheckoutCompleted { session_id: session.id })
}

fn signed_content_mac(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| WebhookError::InvalidSignature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Produces a valid `Stripe-Signature` header value for `payload`.
pub fn sign_payload(secret: &str, payload: &[u8], timestamp: i64) -> Result<String, WebhookError> {
    let mac = signed_content_mac(secret, timestamp, payload)?;
    Ok(format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes())))
}
