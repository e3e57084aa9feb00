//! Clients for the payment providers supported by the course payment gateway.
//!
//! * [`PaypalApi`] opens PayPal orders and captures them once the buyer has approved the payment.
//! * [`StripeApi`] opens Stripe Checkout sessions. Their outcome arrives as a webhook, which is authenticated by
//!   [`WebhookVerifier`].
//!
//! These clients know nothing about carts or orders. The server adapts them to the checkout engine's provider traits.
mod config;
mod data_objects;
mod error;
mod helpers;
mod paypal_api;
mod stripe_api;
mod webhook;

pub use config::{provider_timeout_from_env, PaypalConfig, StripeConfig, DEFAULT_WEBHOOK_TOLERANCE_SECS};
pub use data_objects::{CheckoutSession, LineItem, PaypalLink, PaypalOrder};
pub use error::{PaypalApiError, StripeApiError, WebhookError};
pub use paypal_api::PaypalApi;
pub use stripe_api::StripeApi;
pub use webhook::{sign_payload, WebhookEvent, WebhookVerifier, CHECKOUT_SESSION_COMPLETED};
