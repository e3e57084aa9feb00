use cpg_engine::{
    db_types::{Cents, CourseId, ProviderTxId},
    traits::CheckoutDatabase,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/cpg_test_{}.db", dir.display(), rand::random::<u64>())
}

/// Creates a fresh, migrated database at `url`.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        Sqlite::drop_database(url).await.expect("Error dropping stale test database");
    }
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    db.run_migrations().await.expect("Error running DB migrations");
    info!("🚀️ Test database ready at {url}");
    db
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Could not drop {url}: {e}");
    }
}

/// Catalog rows are owned by another service, so tests write them directly.
pub async fn seed_course(db: &SqliteDatabase, name: &str, price: i64) -> CourseId {
    let course_id = CourseId::from(uuid::Uuid::new_v4().to_string());
    sqlx::query("INSERT INTO courses (course_id, name, description, price) VALUES ($1, $2, $3, $4)")
        .bind(course_id.as_str())
        .bind(name)
        .bind(format!("Learn {name}"))
        .bind(price)
        .execute(db.pool())
        .await
        .expect("Error seeding course");
    course_id
}

pub async fn set_course_price(db: &SqliteDatabase, course_id: &CourseId, price: Cents) {
    sqlx::query("UPDATE courses SET price = $1, updated_at = CURRENT_TIMESTAMP WHERE course_id = $2")
        .bind(price.value())
        .bind(course_id.as_str())
        .execute(db.pool())
        .await
        .expect("Error updating course price");
}

/// Pretends the order was last touched `hours` ago.
pub async fn age_order(db: &SqliteDatabase, provider_id: &ProviderTxId, hours: i64) {
    sqlx::query("UPDATE orders SET updated_at = datetime('now', $1) WHERE provider_id = $2")
        .bind(format!("-{hours} hours"))
        .bind(provider_id.as_str())
        .execute(db.pool())
        .await
        .expect("Error ageing order");
}
