use std::{fmt::Display, iter::Sum};

use serde::{Deserialize, Serialize};
use sqlx::Type;

use crate::op;

pub const CURRENCY_CODE: &str = "USD";
pub const CURRENCY_CODE_LOWER: &str = "usd";

/// The most a single course may cost in the catalog ($10,000.00).
pub const MAX_COURSE_PRICE: Cents = Cents(1_000_000);

//--------------------------------------        Cents         ---------------------------------------------------------
/// An amount of money in minor currency units (US cents).
///
/// Prices, order item snapshots and order totals are all stored and summed as whole cents. Providers that want a
/// decimal representation (e.g. PayPal's `"25.00"`) get it from [`Cents::to_decimal_string`].
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Cents(i64);

op!(binary Cents, Add, add);

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), std::ops::Add::add)
    }
}

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.to_decimal_string())
    }
}

impl Cents {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Formats the amount as a decimal string with exactly two fractional digits, e.g. `1050` -> `"10.50"`.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}
