use thiserror::Error;

use crate::db_types::{CartItem, CourseId, UserId};

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        CartError::DatabaseError(e.to_string())
    }
}

/// The cart store. A cart item is unique per (user, course).
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// All the items in the user's cart, oldest first.
    async fn fetch_cart_items(&self, user_id: &UserId) -> Result<Vec<CartItem>, CartError>;

    /// Adds the course to the user's cart. Returns `false` if it was already there, in which case nothing changes.
    async fn add_cart_item(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, CartError>;

    /// Removes a single course from the cart. Returns `false` if it was not in the cart.
    async fn remove_cart_item(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, CartError>;

    /// Empties the cart, returning the number of items removed. Clearing an empty cart is not an error.
    async fn clear_cart(&self, user_id: &UserId) -> Result<u64, CartError>;
}
