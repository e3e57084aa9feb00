use std::time::Duration;

use cpg_common::Secret;
use log::*;

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;

fn env_or_default(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| {
        warn!("🪛️ {var} not set, using {default} as default");
        default.to_string()
    })
}

fn secret_from_env(var: &str) -> Secret<String> {
    Secret::new(std::env::var(var).unwrap_or_else(|_| {
        warn!("🪛️ {var} not set. Calls that need it will be rejected by the provider.");
        String::default()
    }))
}

/// Reads `CPG_PROVIDER_TIMEOUT_SECS`. Applies to every HTTP call made to a payment provider.
pub fn provider_timeout_from_env() -> Duration {
    std::env::var("CPG_PROVIDER_TIMEOUT_SECS")
        .ok()
        .and_then(|s| {
            s.parse::<u64>()
                .map_err(|e| warn!("🪛️ Invalid value for CPG_PROVIDER_TIMEOUT_SECS ({s}). {e}"))
                .ok()
        })
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_PROVIDER_TIMEOUT)
}

#[derive(Debug, Clone)]
pub struct PaypalConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub timeout: Duration,
}

impl Default for PaypalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-m.sandbox.paypal.com".to_string(),
            client_id: String::default(),
            client_secret: Secret::default(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

impl PaypalConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = env_or_default("CPG_PAYPAL_BASE_URL", "https://api-m.sandbox.paypal.com");
        let client_id = env_or_default("CPG_PAYPAL_CLIENT_ID", "");
        let client_secret = secret_from_env("CPG_PAYPAL_CLIENT_SECRET");
        let timeout = provider_timeout_from_env();
        Self { base_url, client_id, client_secret, timeout }
    }
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub base_url: String,
    pub secret_key: Secret<String>,
    pub webhook_secret: Secret<String>,
    /// Maximum age, in seconds, of a webhook signature timestamp.
    pub webhook_tolerance: i64,
    pub success_url: String,
    pub cancel_url: String,
    pub timeout: Duration,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.stripe.com".to_string(),
            secret_key: Secret::default(),
            webhook_secret: Secret::default(),
            webhook_tolerance: DEFAULT_WEBHOOK_TOLERANCE_SECS,
            success_url: "http://localhost:4000/success".to_string(),
            cancel_url: "http://localhost:4000/cancel".to_string(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let base_url = env_or_default("CPG_STRIPE_BASE_URL", &defaults.base_url);
        let secret_key = secret_from_env("CPG_STRIPE_SECRET_KEY");
        let webhook_secret = secret_from_env("CPG_STRIPE_WEBHOOK_SECRET");
        let webhook_tolerance = std::env::var("CPG_STRIPE_WEBHOOK_TOLERANCE_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid value for CPG_STRIPE_WEBHOOK_TOLERANCE_SECS ({s}). {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_WEBHOOK_TOLERANCE_SECS);
        let success_url = env_or_default("CPG_STRIPE_SUCCESS_URL", &defaults.success_url);
        let cancel_url = env_or_default("CPG_STRIPE_CANCEL_URL", &defaults.cancel_url);
        let timeout = provider_timeout_from_env();
        Self { base_url, secret_key, webhook_secret, webhook_tolerance, success_url, cancel_url, timeout }
    }
}
