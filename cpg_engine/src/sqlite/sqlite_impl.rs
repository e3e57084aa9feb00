//! `SqliteDatabase` is a concrete implementation of a checkout engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
use std::fmt::Debug;

use chrono::Duration;
use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{carts, catalog, db_url, new_pool, orders};
use crate::{
    db_types::{
        CartItem,
        Course,
        CourseId,
        NewOrder,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        ProviderTxId,
        UserId,
    },
    traits::{
        CartError,
        CartManagement,
        CatalogError,
        CatalogManagement,
        CheckoutDatabase,
        Fulfilment,
        OrderLedgerError,
        OrderManagement,
        StatusUpdate,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL from the `CPG_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool for {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Applying the migrations to an up-to-date database is a no-op.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date for {}", self.url);
        Ok(())
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_course(&self, course_id: &CourseId) -> Result<Course, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_course(course_id, &mut conn).await?.ok_or_else(|| CatalogError::CourseNotFound(course_id.clone()))
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart_items(&self, user_id: &UserId) -> Result<Vec<CartItem>, CartError> {
        let mut conn = self.pool.acquire().await?;
        let items = carts::fetch_cart_items(user_id, &mut conn).await?;
        Ok(items)
    }

    async fn add_cart_item(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, CartError> {
        let mut conn = self.pool.acquire().await?;
        let added = carts::add_item(user_id, course_id, &mut conn).await?;
        Ok(added)
    }

    async fn remove_cart_item(&self, user_id: &UserId, course_id: &CourseId) -> Result<bool, CartError> {
        let mut conn = self.pool.acquire().await?;
        let removed = carts::remove_item(user_id, course_id, &mut conn).await?;
        Ok(removed)
    }

    async fn clear_cart(&self, user_id: &UserId) -> Result<u64, CartError> {
        let mut conn = self.pool.acquire().await?;
        let count = carts::clear_cart(user_id, &mut conn).await?;
        debug!("🛒️ Cleared {count} items from the cart of {user_id}");
        Ok(count)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderLedgerError> {
        if order.items.is_empty() {
            return Err(OrderLedgerError::EmptyOrder);
        }
        let mut tx = self.pool.begin().await?;
        let inserted = orders::insert_order(&order, &mut tx).await?;
        for item in &order.items {
            orders::insert_order_item(&inserted.order_id, item, &mut tx).await?;
        }
        tx.commit().await?;
        debug!(
            "🗃️ Order {} for {} ({} items, {}) saved against provider transaction {}",
            inserted.order_id,
            inserted.user_id,
            order.items.len(),
            inserted.total_price,
            inserted.provider_id
        );
        Ok(inserted)
    }

    async fn fetch_order_by_provider_id(&self, provider_id: &ProviderTxId) -> Result<Order, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_provider_id(provider_id, &mut conn)
            .await?
            .ok_or_else(|| OrderLedgerError::ProviderIdNotFound(provider_id.clone()))
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
    ) -> Result<StatusUpdate, OrderLedgerError> {
        let mut tx = self.pool.begin().await?;
        let result = match orders::update_pending_order_status(order_id, new_status, &mut tx).await? {
            Some(order) => {
                debug!("🗃️ Order {order_id} moved to {new_status}");
                StatusUpdate::Updated(order)
            },
            None => {
                let order = orders::fetch_order_by_id(order_id, &mut tx)
                    .await?
                    .ok_or_else(|| OrderLedgerError::OrderNotFound(order_id.clone()))?;
                debug!("🗃️ Order {order_id} is already {}. Status change to {new_status} skipped.", order.status);
                StatusUpdate::Unchanged(order)
            },
        };
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_owned_courses(&self, user_id: &UserId) -> Result<Vec<Course>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let courses = orders::fetch_owned_courses(user_id, &mut conn).await?;
        Ok(courses)
    }

    async fn expire_old_orders(&self, older_than: Duration) -> Result<Vec<Order>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let expired = orders::expire_orders(older_than, &mut conn).await?;
        if !expired.is_empty() {
            debug!("🗃️ {} pending orders older than {}s were expired", expired.len(), older_than.num_seconds());
        }
        Ok(expired)
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fulfil_order(&self, provider_id: &ProviderTxId) -> Result<Fulfilment, OrderLedgerError> {
        let mut tx = self.pool.begin().await?;
        let fulfilment = match orders::mark_order_paid(provider_id, &mut tx).await? {
            Some(order) => {
                let cleared = carts::clear_cart(&order.user_id, &mut tx).await?;
                debug!("🗃️ Order {} marked as paid. {cleared} cart items cleared for {}", order.order_id, order.user_id);
                Fulfilment { order, newly_fulfilled: true, cart_items_cleared: cleared }
            },
            None => {
                let order = orders::fetch_order_by_provider_id(provider_id, &mut tx)
                    .await?
                    .ok_or_else(|| OrderLedgerError::ProviderIdNotFound(provider_id.clone()))?;
                match order.status {
                    OrderStatusType::Success => {
                        debug!("🗃️ Order {} was already fulfilled. Nothing to do.", order.order_id);
                        Fulfilment { order, newly_fulfilled: false, cart_items_cleared: 0 }
                    },
                    OrderStatusType::Expired => return Err(OrderLedgerError::OrderExpired(provider_id.clone())),
                    OrderStatusType::Pending => {
                        return Err(OrderLedgerError::DatabaseError(format!(
                            "Order {} is pending but could not be marked as paid",
                            order.order_id
                        )))
                    },
                }
            },
        };
        tx.commit().await?;
        Ok(fulfilment)
    }

    async fn close(&mut self) -> Result<(), OrderLedgerError> {
        self.pool.close().await;
        Ok(())
    }
}
