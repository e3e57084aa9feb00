//! Payment provider integrations.
//!
//! Each integration wraps a `provider_tools` API client and implements the engine's provider traits for it. PayPal
//! confirms payments on request, so it implements both [`cpg_engine::traits::PaymentProvider`] and
//! [`cpg_engine::traits::CaptureProvider`]. Stripe reports payments through its webhook and only implements the
//! former.
use cpg_engine::traits::{ChargeLine, ChargeRequest};
use provider_tools::LineItem;

pub mod paypal;
pub mod stripe;

pub use paypal::PaypalProvider;
pub use stripe::StripeProvider;

pub(crate) fn line_items(charge: &ChargeRequest) -> Vec<LineItem> {
    charge
        .lines
        .iter()
        .map(|ChargeLine { name, description, price, .. }| LineItem::new(name, description, *price))
        .collect()
}
