use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{CartItem, CourseId, UserId};

pub async fn fetch_cart_items(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Vec<CartItem>, sqlx::Error> {
    let items = sqlx::query_as(
        "SELECT user_id, course_id, created_at FROM cart_items WHERE user_id = $1 ORDER BY created_at, course_id",
    )
    .bind(user_id.as_str())
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Inserts the item if it is not already in the cart. Returns `true` if a row was written.
pub async fn add_item(user_id: &UserId, course_id: &CourseId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO cart_items (user_id, course_id) VALUES ($1, $2) ON CONFLICT (user_id, course_id) DO NOTHING",
    )
    .bind(user_id.as_str())
    .bind(course_id.as_str())
    .execute(conn)
    .await?;
    trace!("🛒️ Add {course_id} to cart for {user_id}: {} rows affected", result.rows_affected());
    Ok(result.rows_affected() > 0)
}

pub async fn remove_item(
    user_id: &UserId,
    course_id: &CourseId,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND course_id = $2")
        .bind(user_id.as_str())
        .bind(course_id.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes every item in the user's cart. This is not atomic on its own; the fulfilment flow calls it inside the
/// same transaction that marks the order as paid.
pub async fn clear_cart(user_id: &UserId, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1").bind(user_id.as_str()).execute(conn).await?;
    Ok(result.rows_affected())
}
