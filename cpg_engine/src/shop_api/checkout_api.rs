use std::fmt::Debug;

use chrono::Duration;
use cpg_common::MAX_COURSE_PRICE;
use log::*;

use crate::{
    db_types::{Cents, Course, NewOrder, Order, OrderStatusType, ProviderTxId, UserId},
    events::{EventProducers, OrderExpiredEvent, OrderFulfilledEvent},
    shop_api::{errors::CheckoutError, shop_objects::RetryPolicy},
    traits::{
        CaptureOutcome,
        CaptureProvider,
        ChargeInitiation,
        ChargeLine,
        ChargeRequest,
        CheckoutDatabase,
        Fulfilment,
        OrderLedgerError,
        PaymentProvider,
    },
};

/// `CheckoutApi` drives an order through its life: opening a charge for the cart, confirming the payment and
/// fulfilling the order, and expiring orders that were never paid.
///
/// The API is generic over the payment provider per call, so the same instance serves every integration.
pub struct CheckoutApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for CheckoutApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B> CheckoutApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CheckoutApi<B>
where B: CheckoutDatabase
{
    /// Opens a charge for everything in the user's cart and records a `Pending` order bound to it.
    ///
    /// The prices charged are the catalog prices at the time of this call. They are copied into the order items and
    /// never re-read.
    ///
    /// An empty cart fails with [`CheckoutError::EmptyCart`] before the provider is contacted. If the provider opens
    /// the charge but the order cannot be written, the charge is orphaned. This is logged and reported as
    /// [`CheckoutError::OrphanedCharge`] (or [`CheckoutError::DuplicateProviderId`]) and is not retried.
    pub async fn checkout<P: PaymentProvider>(
        &self,
        user_id: &UserId,
        provider: &P,
    ) -> Result<ChargeInitiation, CheckoutError> {
        let items = self.db.fetch_cart_items(user_id).await?;
        if items.is_empty() {
            debug!("🧾️ Checkout for {user_id} refused. The cart is empty.");
            return Err(CheckoutError::EmptyCart);
        }
        let course_ids = items.into_iter().map(|i| i.course_id).collect::<Vec<_>>();
        let courses = self.db.fetch_courses(&course_ids).await?;
        let lines = courses.into_iter().map(charge_line).collect::<Result<Vec<_>, _>>()?;
        let charge = ChargeRequest::new(lines);
        trace!("🧾️ Opening a {} charge of {} for {user_id} ({} items)", provider.kind(), charge.total, charge.lines.len());
        let initiation = provider.open_charge(&charge).await?;
        let provider_id = initiation.provider_id().clone();
        let order = charge
            .lines
            .iter()
            .fold(NewOrder::new(user_id.clone(), provider.kind(), provider_id.clone()), |order, line| {
                order.with_item(line.course_id.clone(), line.price)
            });
        match self.db.insert_order(order).await {
            Ok(order) => {
                info!(
                    "🧾️ Order {} for {user_id} is pending. {} charge {provider_id} opened for {}",
                    order.order_id, order.provider, order.total_price
                );
                Ok(initiation)
            },
            Err(OrderLedgerError::DuplicateProviderId(id)) => {
                error!(
                    "🧾️ ORPHANED CHARGE. The provider returned transaction id {id} for {user_id}, but an order is \
                     already bound to it. The new charge has no matching order."
                );
                Err(CheckoutError::DuplicateProviderId(id))
            },
            Err(e) => {
                error!(
                    "🧾️ ORPHANED CHARGE. Charge {provider_id} of {} for {user_id} was opened, but the order could not \
                     be saved. {e}",
                    charge.total
                );
                Err(CheckoutError::OrphanedCharge { provider_id, reason: e.to_string() })
            },
        }
    }

    /// Confirms a synchronous-capture charge on the user's behalf and fulfils the order if payment completed.
    ///
    /// The order must exist and belong to `user_id`; anything else is reported as [`CheckoutError::OrderNotFound`]
    /// without contacting the provider. An order that is already fulfilled is returned as is, so a repeated capture
    /// request is harmless.
    pub async fn capture<P: CaptureProvider>(
        &self,
        user_id: &UserId,
        provider_id: &ProviderTxId,
        provider: &P,
    ) -> Result<Fulfilment, CheckoutError> {
        let order = match self.db.fetch_order_by_provider_id(provider_id).await {
            Ok(order) if &order.user_id == user_id => order,
            Ok(order) => {
                warn!(
                    "🧾️ {user_id} tried to capture {provider_id}, which belongs to order {} of another user",
                    order.order_id
                );
                return Err(CheckoutError::OrderNotFound(provider_id.clone()));
            },
            Err(e) => return Err(e.into()),
        };
        match order.status {
            OrderStatusType::Expired => return Err(CheckoutError::OrderExpired(provider_id.clone())),
            OrderStatusType::Success => {
                debug!("🧾️ Order {} is already fulfilled. Capture is a no-op.", order.order_id);
                return Ok(Fulfilment { order, newly_fulfilled: false, cart_items_cleared: 0 });
            },
            OrderStatusType::Pending => {},
        }
        match provider.confirm(provider_id).await? {
            CaptureOutcome::Completed => {
                debug!("🧾️ Payment for {provider_id} was captured");
                self.fulfil(provider_id).await
            },
            CaptureOutcome::NotCompleted(status) => {
                info!("🧾️ Capture for {provider_id} did not complete. Provider status: {status}");
                Err(CheckoutError::CaptureNotCompleted { provider_id: provider_id.clone(), status })
            },
        }
    }

    /// Runs the fulfilment transaction for a confirmed payment and notifies subscribers on first fulfilment.
    pub async fn fulfil(&self, provider_id: &ProviderTxId) -> Result<Fulfilment, CheckoutError> {
        match self.db.fulfil_order(provider_id).await {
            Ok(fulfilment) => {
                if fulfilment.newly_fulfilled {
                    info!(
                        "🧾️ Order {} for {} is fulfilled. {} cart items cleared.",
                        fulfilment.order.order_id, fulfilment.order.user_id, fulfilment.cart_items_cleared
                    );
                    self.call_order_fulfilled_hook(&fulfilment.order).await;
                }
                Ok(fulfilment)
            },
            Err(OrderLedgerError::ProviderIdNotFound(id)) => {
                debug!("🧾️ No order is bound to {id} (yet)");
                Err(CheckoutError::OrderNotFound(id))
            },
            Err(OrderLedgerError::OrderExpired(id)) => {
                error!(
                    "🧾️ PAYMENT FOR EXPIRED ORDER. Payment for {id} was confirmed, but the order had already expired. \
                     Money moved but the purchase was not registered."
                );
                Err(CheckoutError::OrderExpired(id))
            },
            Err(e) => {
                error!(
                    "🧾️ FULFILMENT FAILED. Payment for {provider_id} was confirmed, but the order could not be \
                     fulfilled. {e}"
                );
                Err(e.into())
            },
        }
    }

    /// As [`Self::fulfil`], but an unknown provider id is retried according to `policy`. The order may simply not
    /// have been committed yet when a provider notification arrives.
    pub async fn fulfil_with_retry(
        &self,
        provider_id: &ProviderTxId,
        policy: RetryPolicy,
    ) -> Result<Fulfilment, CheckoutError> {
        let mut attempt = 1;
        loop {
            match self.fulfil(provider_id).await {
                Err(CheckoutError::OrderNotFound(_)) if attempt < policy.attempts => {
                    debug!(
                        "🧾️ Attempt {attempt}/{} to fulfil {provider_id} found no order. Retrying in {}ms",
                        policy.attempts,
                        policy.delay.as_millis()
                    );
                    attempt += 1;
                    tokio::time::sleep(policy.delay).await;
                },
                result => return result,
            }
        }
    }

    /// Expires every pending order that has not been updated for longer than `older_than`, notifying subscribers of
    /// each one.
    pub async fn expire_old_orders(&self, older_than: Duration) -> Result<Vec<Order>, CheckoutError> {
        let expired = self.db.expire_old_orders(older_than).await?;
        for order in &expired {
            for producer in &self.producers.order_expired_producer {
                producer.publish_event(OrderExpiredEvent::new(order.clone())).await;
            }
        }
        Ok(expired)
    }

    async fn call_order_fulfilled_hook(&self, order: &Order) {
        for producer in &self.producers.order_fulfilled_producer {
            debug!("🧾️ Notifying order fulfilled hook subscribers");
            producer.publish_event(OrderFulfilledEvent::new(order.clone())).await;
        }
    }
}

/// Catalog prices are charged as they are, so a price outside `0..=MAX_COURSE_PRICE` stops the checkout before any
/// provider is contacted.
fn charge_line(course: Course) -> Result<ChargeLine, CheckoutError> {
    if course.price < Cents::default() || course.price > MAX_COURSE_PRICE {
        error!(
            "🧾️ Course {} is priced at {}, outside the allowed range. Refusing to charge it.",
            course.course_id, course.price
        );
        return Err(CheckoutError::InvalidPrice { course_id: course.course_id, price: course.price });
    }
    let Course { course_id, name, description, price, .. } = course;
    Ok(ChargeLine { course_id, name, description, price })
}
