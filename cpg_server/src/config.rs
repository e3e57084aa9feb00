use std::env;

use chrono::Duration;
use cpg_common::{helpers::parse_boolean_flag, Secret};
use cpg_engine::shop_objects::RetryPolicy;
use log::*;
use provider_tools::{PaypalConfig, StripeConfig};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_CPG_HOST: &str = "127.0.0.1";
const DEFAULT_CPG_PORT: u16 = 8360;
const DEFAULT_PENDING_ORDER_TIMEOUT: Duration = Duration::hours(24);
const DEFAULT_WEBHOOK_FULFIL_ATTEMPTS: u32 = 3;
const DEFAULT_WEBHOOK_FULFIL_DELAY_MS: u64 = 500;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, pending database migrations are applied when the server starts.
    pub auto_migrate: bool,
    pub auth: AuthConfig,
    /// The time after which an unpaid order is considered abandoned and marked as expired.
    pub pending_order_timeout: Duration,
    /// How hard the Stripe webhook tries to find the order for a notification before giving up and letting Stripe
    /// redeliver it.
    pub webhook_retry: RetryPolicy,
    pub paypal: PaypalConfig,
    pub stripe: StripeConfig,
    /// The browser origin allowed to call the API cross-origin (`*` for any). If unset, no CORS headers are sent.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CPG_HOST.to_string(),
            port: DEFAULT_CPG_PORT,
            database_url: String::default(),
            auto_migrate: false,
            auth: AuthConfig::default(),
            pending_order_timeout: DEFAULT_PENDING_ORDER_TIMEOUT,
            webhook_retry: RetryPolicy::default(),
            paypal: PaypalConfig::default(),
            stripe: StripeConfig::default(),
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CPG_HOST").ok().unwrap_or_else(|| DEFAULT_CPG_HOST.into());
        let port = env::var("CPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CPG_PORT. {e} Using the default, {DEFAULT_CPG_PORT}, instead."
                    );
                    DEFAULT_CPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CPG_PORT);
        let database_url = env::var("CPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ CPG_DATABASE_URL is not set. Please set it to the URL for the course shop database.");
            String::default()
        });
        let auto_migrate = parse_boolean_flag(env::var("CPG_AUTO_MIGRATE").ok(), false);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let pending_order_timeout = configure_pending_order_timeout();
        let webhook_retry = configure_webhook_retry();
        let paypal = PaypalConfig::new_from_env_or_default();
        let stripe = StripeConfig::new_from_env_or_default();
        let cors_origin = cors_origin(env::var("CPG_CORS_ORIGIN").ok());
        Self {
            host,
            port,
            database_url,
            auto_migrate,
            auth,
            pending_order_timeout,
            webhook_retry,
            paypal,
            stripe,
            cors_origin,
        }
    }
}

fn cors_origin(value: Option<String>) -> Option<String> {
    let origin = value.map(|s| s.trim().trim_end_matches('/').to_string()).filter(|s| !s.is_empty());
    match &origin {
        Some(o) => info!("🪛️ Cross-origin requests are allowed from {o}"),
        None => debug!("🪛️ CPG_CORS_ORIGIN is not set. Cross-origin requests are not enabled."),
    }
    origin
}

fn configure_pending_order_timeout() -> Duration {
    env::var("CPG_PENDING_ORDER_TIMEOUT")
        .map_err(|_| {
            info!(
                "🪛️ CPG_PENDING_ORDER_TIMEOUT is not set. Using the default value of {} hrs.",
                DEFAULT_PENDING_ORDER_TIMEOUT.num_hours()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::hours)
                .map_err(|e| warn!("🪛️ Invalid configuration value for CPG_PENDING_ORDER_TIMEOUT. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_PENDING_ORDER_TIMEOUT)
}

fn configure_webhook_retry() -> RetryPolicy {
    let attempts = env::var("CPG_WEBHOOK_FULFIL_ATTEMPTS")
        .ok()
        .and_then(|s| {
            s.parse::<u32>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for CPG_WEBHOOK_FULFIL_ATTEMPTS. {e}"))
                .ok()
        })
        .unwrap_or(DEFAULT_WEBHOOK_FULFIL_ATTEMPTS);
    let delay_ms = env::var("CPG_WEBHOOK_FULFIL_DELAY_MS")
        .ok()
        .and_then(|s| {
            s.parse::<u64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for CPG_WEBHOOK_FULFIL_DELAY_MS. {e}"))
                .ok()
        })
        .unwrap_or(DEFAULT_WEBHOOK_FULFIL_DELAY_MS);
    debug!("🪛️ Webhook fulfilment will be attempted {attempts} times, {delay_ms}ms apart");
    RetryPolicy::new(attempts, std::time::Duration::from_millis(delay_ms))
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret used to verify HS256 bearer tokens. Tokens are issued by the identity service, not by this
    /// server.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No token issued \
             elsewhere will be accepted. DO NOT operate on production like this. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: &str) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.to_string()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("CPG_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [CPG_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("CPG_JWT_SECRET is empty".to_string()));
        }
        Ok(Self::new(&secret))
    }
}
