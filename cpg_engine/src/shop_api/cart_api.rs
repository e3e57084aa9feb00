use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{CourseId, UserId},
    shop_api::{
        errors::CartApiError,
        shop_objects::{CartLine, CartView},
    },
    traits::{CartManagement, CatalogManagement, OrderManagement},
};

/// The `CartApi` manages a user's pending selections, joined with catalog data for display.
pub struct CartApi<B> {
    db: B,
}

impl<B: Debug> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi ({:?})", self.db)
    }
}

impl<B> CartApi<B>
where B: CatalogManagement + CartManagement + OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// The user's cart with the current catalog data for each course, oldest item first.
    pub async fn cart_for_user(&self, user_id: &UserId) -> Result<CartView, CartApiError> {
        let items = self.db.fetch_cart_items(user_id).await?;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let course = self.db.fetch_course(&item.course_id).await?;
            lines.push(CartLine { course, added_at: item.created_at });
        }
        Ok(CartView::new(lines))
    }

    /// Adds the course to the cart. Adding a course that is already in the cart does nothing.
    ///
    /// Fails with [`CartApiError::CourseNotFound`] for unknown courses and [`CartApiError::AlreadyOwned`] if the user
    /// has already paid for the course.
    pub async fn add_item(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, CartApiError> {
        let course = self.db.fetch_course(course_id).await?;
        let owned = self.db.fetch_owned_courses(user_id).await?;
        if owned.iter().any(|c| c.course_id == course.course_id) {
            debug!("🛒️ {user_id} tried to add {course_id} to their cart, but already owns it");
            return Err(CartApiError::AlreadyOwned(course_id.clone()));
        }
        let added = self.db.add_cart_item(user_id, course_id).await?;
        if added {
            debug!("🛒️ {course_id} added to the cart of {user_id}");
        } else {
            trace!("🛒️ {course_id} is already in the cart of {user_id}");
        }
        Ok(added)
    }

    pub async fn remove_item(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, CartApiError> {
        let removed = self.db.remove_cart_item(user_id, course_id).await?;
        trace!("🛒️ Remove {course_id} from the cart of {user_id}: {removed}");
        Ok(removed)
    }

    pub async fn clear(&self, user_id: &UserId) -> Result<u64, CartApiError> {
        let count = self.db.clear_cart(user_id).await?;
        Ok(count)
    }
}
