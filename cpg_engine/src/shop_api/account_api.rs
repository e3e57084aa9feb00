//! Read access to a user's purchase history and the courses they own.
use std::fmt::Debug;

use log::trace;

use crate::{
    db_types::{Course, UserId},
    shop_api::{errors::AccountApiError, shop_objects::OrderWithItems},
    traits::OrderManagement,
};

pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Every order the user has placed, in any status, newest first, with its priced line items.
    pub async fn order_history(&self, user_id: &UserId) -> Result<Vec<OrderWithItems>, AccountApiError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.db.fetch_order_items(&order.order_id).await?;
            result.push(OrderWithItems { order, items });
        }
        trace!("Order history for {user_id}: {} orders", result.len());
        Ok(result)
    }

    /// The courses the user has paid for.
    pub async fn owned_courses(&self, user_id: &UserId) -> Result<Vec<Course>, AccountApiError> {
        let courses = self.db.fetch_owned_courses(user_id).await?;
        Ok(courses)
    }
}
