use cpg_common::{Cents, CURRENCY_CODE, CURRENCY_CODE_LOWER};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One course in a charge. Every line is charged with a quantity of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub description: String,
    pub price: Cents,
}

impl LineItem {
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, description: S2, price: Cents) -> Self {
        Self { name: name.into(), description: description.into(), price }
    }
}

//--------------------------------------        PayPal         ---------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    /// Lifetime of the token, in seconds
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaypalLink {
    pub href: String,
    pub rel: String,
    #[serde(default)]
    pub method: String,
}

/// The parts of a PayPal order that the gateway cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaypalOrder {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<PaypalLink>,
}

impl PaypalOrder {
    pub const COMPLETED: &'static str = "COMPLETED";

    pub fn is_completed(&self) -> bool {
        self.status == Self::COMPLETED
    }
}

/// The JSON body for `POST /v2/checkout/orders`. Amounts are decimal strings in USD.
pub fn paypal_order_body(items: &[LineItem]) -> Value {
    let total = items.iter().map(|i| i.price).sum::<Cents>().to_decimal_string();
    let items = items
        .iter()
        .map(|i| {
            json!({
                "name": i.name,
                "description": i.description,
                "quantity": "1",
                "unit_amount": { "currency_code": CURRENCY_CODE, "value": i.price.to_decimal_string() },
            })
        })
        .collect::<Vec<Value>>();
    json!({
        "intent": "CAPTURE",
        "purchase_units": [{
            "items": items,
            "amount": {
                "currency_code": CURRENCY_CODE,
                "value": total,
                "breakdown": { "item_total": { "currency_code": CURRENCY_CODE, "value": total } },
            },
        }],
    })
}

//--------------------------------------        Stripe         ---------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// The form fields for `POST /v1/checkout/sessions`, using Stripe's bracketed key syntax for nested values.
pub fn checkout_session_form(items: &[LineItem], success_url: &str, cancel_url: &str) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), success_url.to_string()),
        ("cancel_url".to_string(), cancel_url.to_string()),
    ];
    for (i, item) in items.iter().enumerate() {
        let key = |k: &str| format!("line_items[{i}]{k}");
        form.push((key("[quantity]"), "1".to_string()));
        form.push((key("[price_data][currency]"), CURRENCY_CODE_LOWER.to_string()));
        form.push((key("[price_data][unit_amount]"), item.price.value().to_string()));
        form.push((key("[price_data][tax_behavior]"), "inclusive".to_string()));
        form.push((key("[price_data][product_data][name]"), item.name.clone()));
        // Stripe rejects empty strings
        if !item.description.is_empty() {
            form.push((key("[price_data][product_data][description]"), item.description.clone()));
        }
    }
    form
}
