use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use cpg_common::Cents;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// The authenticated user. Identity is always supplied by the caller; the engine never looks it up itself.
    UserId
);
string_id!(CourseId);
string_id!(
    /// The local order identifier. Generated when the order is written.
    OrderId
);
string_id!(
    /// The payment provider's own identifier for a charge (PayPal order id, Stripe checkout session id).
    ///
    /// This is the join key between the provider and the local order, since neither completion path carries the
    /// local order id.
    ProviderTxId
);

impl OrderId {
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// A charge has been opened with the provider, but payment has not been confirmed.
    Pending,
    /// Payment was confirmed and the cart was cleared. Terminal.
    Success,
    /// Payment was never confirmed and the order timed out. Terminal.
    Expired,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatusType::Pending)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Success => write!(f, "Success"),
            OrderStatusType::Expired => write!(f, "Expired"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Success" => Ok(Self::Success),
            "Expired" => Ok(Self::Expired),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------     ProviderKind      ---------------------------------------------------------
/// The two ways a payment provider can confirm a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ProviderKind {
    /// The client calls a capture endpoint after approving the payment with the provider.
    SyncCapture,
    /// The provider posts a signed notification to the server when payment completes.
    AsyncWebhook,
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::SyncCapture => write!(f, "SyncCapture"),
            ProviderKind::AsyncWebhook => write!(f, "AsyncWebhook"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SyncCapture" => Ok(Self::SyncCapture),
            "AsyncWebhook" => Ok(Self::AsyncWebhook),
            s => Err(ConversionError(format!("Invalid provider kind: {s}"))),
        }
    }
}

//--------------------------------------        Course         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub course_id: CourseId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: Cents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       CartItem        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub provider: ProviderKind,
    pub provider_id: ProviderTxId,
    pub status: OrderStatusType,
    pub total_price: Cents,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_id: OrderId,
    pub course_id: CourseId,
    /// The catalog price at the moment of checkout. Later catalog edits never touch it.
    pub price: Cents,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub course_id: CourseId,
    pub price: Cents,
}

impl NewOrderItem {
    pub fn new(course_id: CourseId, price: Cents) -> Self {
        Self { course_id, price }
    }
}

/// A pending order, bound to the provider charge that was opened for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub provider: ProviderKind,
    pub provider_id: ProviderTxId,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(user_id: UserId, provider: ProviderKind, provider_id: ProviderTxId) -> Self {
        Self { user_id, provider, provider_id, items: Vec::new() }
    }

    pub fn with_item(mut self, course_id: CourseId, price: Cents) -> Self {
        self.items.push(NewOrderItem::new(course_id, price));
        self
    }

    /// The order total is always the sum of the item snapshots.
    pub fn total_price(&self) -> Cents {
        self.items.iter().map(|i| i.price).sum()
    }
}
