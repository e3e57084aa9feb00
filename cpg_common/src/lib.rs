mod cents;
mod secret;

pub mod helpers;
pub mod op;

pub use cents::{Cents, CURRENCY_CODE, CURRENCY_CODE_LOWER, MAX_COURSE_PRICE};
pub use secret::Secret;
