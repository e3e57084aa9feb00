use chrono::Duration;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Course, NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType, ProviderTxId, UserId},
    traits::OrderLedgerError,
};

/// Inserts the order row (without its items) using the given connection. This is not atomic. Embed this call inside
/// a transaction together with [`insert_order_item`] and pass `&mut *tx` as the connection argument.
///
/// The order is created in `Pending` status. A unique-constraint violation means that an order is already bound to
/// the provider id, and is reported as [`OrderLedgerError::DuplicateProviderId`].
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderLedgerError> {
    let order_id = OrderId::random();
    let result = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                user_id,
                provider,
                provider_id,
                status,
                total_price
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(order.user_id.as_str())
    .bind(order.provider.to_string())
    .bind(order.provider_id.as_str())
    .bind(OrderStatusType::Pending.to_string())
    .bind(order.total_price().value())
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => Ok(order),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            debug!("📝️ Provider transaction {} is already bound to an order", order.provider_id);
            Err(OrderLedgerError::DuplicateProviderId(order.provider_id.clone()))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn insert_order_item(
    order_id: &OrderId,
    item: &NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    let item = sqlx::query_as(
        "INSERT INTO order_items (order_id, course_id, price) VALUES ($1, $2, $3) RETURNING order_id, course_id, \
         price, created_at",
    )
    .bind(order_id.as_str())
    .bind(item.course_id.as_str())
    .bind(item.price.value())
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order_by_id(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_provider_id(
    provider_id: &ProviderTxId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE provider_id = $1")
        .bind(provider_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as(
        "SELECT order_id, course_id, price, created_at FROM order_items WHERE order_id = $1 ORDER BY course_id",
    )
    .bind(order_id.as_str())
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Fetches all orders for the user, most recent first
pub async fn fetch_orders_for_user(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, order_id")
        .bind(user_id.as_str())
        .fetch_all(conn)
        .await?;
    trace!("📝️ Result of fetch_orders_for_user: {}", orders.len());
    Ok(orders)
}

/// The courses the user has paid for. Ownership is derived from `Success` orders only.
pub async fn fetch_owned_courses(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Course>, sqlx::Error> {
    let courses = sqlx::query_as(
        r#"
        SELECT DISTINCT courses.* FROM courses
        JOIN order_items ON order_items.course_id = courses.course_id
        JOIN orders ON orders.order_id = order_items.order_id
        WHERE orders.user_id = $1 AND orders.status = 'Success'
        ORDER BY courses.name, courses.course_id
        "#,
    )
    .bind(user_id.as_str())
    .fetch_all(conn)
    .await?;
    Ok(courses)
}

/// Moves the order to `status`, but only if it is currently `Pending`.
///
/// Returns `None` if the order does not exist or is already terminal. Callers that need to distinguish the two
/// should re-read the order in the same transaction.
pub(crate) async fn update_pending_order_status(
    order_id: &OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 AND status = 'Pending' \
         RETURNING *",
    )
    .bind(status.to_string())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// The guarded status flip at the heart of fulfilment. Only a `Pending` order bound to `provider_id` is moved to
/// `Success`; concurrent callers for the same id see `None`.
pub(crate) async fn mark_order_paid(
    provider_id: &ProviderTxId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET status = 'Success', updated_at = CURRENT_TIMESTAMP WHERE provider_id = $1 AND status = \
         'Pending' RETURNING *",
    )
    .bind(provider_id.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Marks `Pending` orders that have not been touched for longer than `older_than` as `Expired`.
pub(crate) async fn expire_orders(older_than: Duration, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
        UPDATE orders SET status = 'Expired', updated_at = CURRENT_TIMESTAMP
        WHERE status = 'Pending' AND unixepoch(CURRENT_TIMESTAMP) - unixepoch(updated_at) > $1
        RETURNING *
        "#,
    )
    .bind(older_than.num_seconds())
    .fetch_all(conn)
    .await?;
    Ok(orders)
}
