use chrono::Duration;
use cpg_engine::{db_types::Order, events::EventProducers, CheckoutApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

pub const EXPIRY_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Starts the expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_expiry_worker(db: SqliteDatabase, producers: EventProducers, pending_expiry: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(EXPIRY_INTERVAL);
        let api = CheckoutApi::new(db, producers);
        info!("🕰️ Pending order expiry worker started");
        loop {
            timer.tick().await;
            trace!("🕰️ Running pending order expiry job");
            match api.expire_old_orders(pending_expiry).await {
                Ok(expired) if expired.is_empty() => trace!("🕰️ No orders expired"),
                Ok(expired) => {
                    info!("🕰️ {} orders expired", expired.len());
                    debug!("🕰️ Expired orders: {}", order_list(&expired));
                },
                Err(e) => {
                    error!("🕰️ Error running pending order expiry job: {e}");
                },
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] provider_id: {} user: {}", o.order_id, o.provider_id, o.user_id))
        .collect::<Vec<String>>()
        .join(", ")
}
