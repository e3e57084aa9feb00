//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
//!
//! Every handler that acts on behalf of a user takes a [`JwtClaims`] argument. The user id is read from the claims
//! and handed to the engine explicitly; nothing else in the request can select whose data is touched.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use cpg_engine::{
    shop_objects::RetryPolicy,
    traits::{CaptureProvider, ChargeInitiation, CheckoutDatabase, OrderManagement, PaymentProvider},
    AccountApi,
    CartApi,
    CheckoutApi,
};
use log::*;
use provider_tools::{WebhookEvent, WebhookVerifier};
use serde_json::{json, Value};

use crate::{auth::JwtClaims, errors::ServerError, validation::RequestValidator};

pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(my_cart => Get "/cart" impl CheckoutDatabase);
pub async fn my_cart<B: CheckoutDatabase>(
    claims: JwtClaims,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET cart for {}", claims.sub);
    let cart = api.cart_for_user(&claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(clear_cart => Delete "/cart" impl CheckoutDatabase);
pub async fn clear_cart<B: CheckoutDatabase>(
    claims: JwtClaims,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let count = api.clear(&claims.user_id()).await?;
    debug!("💻️ Cleared {count} items from the cart of {}", claims.sub);
    Ok(HttpResponse::NoContent().finish())
}

route!(add_cart_item => Put "/cart/items" impl CheckoutDatabase);
pub async fn add_cart_item<B: CheckoutDatabase>(
    claims: JwtClaims,
    body: web::Bytes,
    validator: web::Data<RequestValidator>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let course_id = validator.add_to_cart_body(&body)?;
    trace!("💻️ Add {course_id} to the cart of {}", claims.sub);
    api.add_item(&claims.user_id(), &course_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

route!(remove_cart_item => Delete "/cart/items/{course_id}" impl CheckoutDatabase);
pub async fn remove_cart_item<B: CheckoutDatabase>(
    claims: JwtClaims,
    path: web::Path<String>,
    validator: web::Data<RequestValidator>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let course_id = validator.course_id(&path.into_inner())?;
    trace!("💻️ Remove {course_id} from the cart of {}", claims.sub);
    api.remove_item(&claims.user_id(), &course_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

//----------------------------------------------   History  ----------------------------------------------------
route!(owned_courses => Get "/courses/owned" impl OrderManagement);
pub async fn owned_courses<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let courses = api.owned_courses(&claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(courses))
}

route!(my_orders => Get "/orders" impl OrderManagement);
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let orders = api.order_history(&claims.user_id()).await?;
    trace!("💻️ {} orders in the history of {}", orders.len(), claims.sub);
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
/// The JSON the client needs to send the buyer on to the provider: PayPal's order object, or the Stripe payment page
/// URL.
fn initiation_body(initiation: ChargeInitiation) -> Value {
    match initiation {
        ChargeInitiation::Approval { payload, .. } => payload,
        ChargeInitiation::Redirect { redirect_url, .. } => json!(redirect_url),
    }
}

route!(paypal_checkout => Post "/orders/paypal" impl CheckoutDatabase, CaptureProvider);
/// Opens a PayPal order for everything in the cart. The response is PayPal's order object, which the client uses to
/// show the approval UI before calling the capture route.
pub async fn paypal_checkout<B: CheckoutDatabase, P: CaptureProvider>(
    claims: JwtClaims,
    api: web::Data<CheckoutApi<B>>,
    provider: web::Data<P>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ PayPal checkout for {}", claims.sub);
    let initiation = api.checkout(&claims.user_id(), provider.get_ref()).await?;
    Ok(HttpResponse::Ok().json(initiation_body(initiation)))
}

route!(paypal_capture => Post "/orders/paypal/{id}/capture" impl CheckoutDatabase, CaptureProvider);
/// Captures an approved PayPal order. The order is fulfilled only if PayPal reports the capture as completed.
pub async fn paypal_capture<B: CheckoutDatabase, P: CaptureProvider>(
    claims: JwtClaims,
    path: web::Path<String>,
    validator: web::Data<RequestValidator>,
    api: web::Data<CheckoutApi<B>>,
    provider: web::Data<P>,
) -> Result<HttpResponse, ServerError> {
    let provider_id = validator.provider_id(&path.into_inner())?;
    debug!("💻️ PayPal capture of {provider_id} for {}", claims.sub);
    let fulfilment = api.capture(&claims.user_id(), &provider_id, provider.get_ref()).await?;
    trace!("💻️ Capture of {provider_id} done. Newly fulfilled: {}", fulfilment.newly_fulfilled);
    Ok(HttpResponse::NoContent().finish())
}

route!(stripe_checkout => Post "/orders/stripe" impl CheckoutDatabase, PaymentProvider);
/// Opens a Stripe checkout session for everything in the cart and returns the URL of the hosted payment page.
pub async fn stripe_checkout<B: CheckoutDatabase, P: PaymentProvider>(
    claims: JwtClaims,
    api: web::Data<CheckoutApi<B>>,
    provider: web::Data<P>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ Stripe checkout for {}", claims.sub);
    let initiation = api.checkout(&claims.user_id(), provider.get_ref()).await?;
    Ok(HttpResponse::Ok().json(initiation_body(initiation)))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(stripe_webhook => Post "/orders/stripe/capture" impl CheckoutDatabase);
/// Stripe's payment notification.
///
/// The raw body is checked against the `Stripe-Signature` header before anything in it is trusted. Unsigned or
/// tampered requests are rejected with a 400 and never touch the ledger. Authentic events that the gateway does not
/// act on are acknowledged with a 204 so that Stripe stops redelivering them. So are authentic events whose session id
/// this gateway could never have issued an order for.
///
/// If no order is bound to the session yet, fulfilment is retried a few times. After that the route answers 404 and
/// Stripe's own redelivery takes over.
pub async fn stripe_webhook<B: CheckoutDatabase>(
    req: HttpRequest,
    body: web::Bytes,
    verifier: web::Data<WebhookVerifier>,
    validator: web::Data<RequestValidator>,
    retry: web::Data<RetryPolicy>,
    api: web::Data<CheckoutApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("🔐️ Received Stripe webhook ({} bytes)", body.len());
    let signature = req.headers().get(STRIPE_SIGNATURE_HEADER).and_then(|v| v.to_str().ok()).ok_or_else(|| {
        warn!("🔐️ Stripe webhook rejected. The {STRIPE_SIGNATURE_HEADER} header is missing.");
        ServerError::SignatureError(format!("Missing {STRIPE_SIGNATURE_HEADER} header"))
    })?;
    let event = verifier.verify(&body, signature).map_err(|e| {
        warn!("🔐️ Stripe webhook rejected. {e}");
        e
    })?;
    match event {
        WebhookEvent::CheckoutCompleted { session_id } => {
            // The event is authentic, so a 4xx here would only make Stripe redeliver it forever
            let provider_id = match validator.provider_id(&session_id) {
                Ok(id) => id,
                Err(e) => {
                    error!("🔐️ Stripe reported a paid checkout session '{session_id}' that cannot be processed. {e}");
                    return Ok(HttpResponse::NoContent().finish());
                },
            };
            info!("🔐️ Stripe reports that checkout session {provider_id} was paid");
            let fulfilment = api.fulfil_with_retry(&provider_id, *retry.get_ref()).await?;
            debug!(
                "🔐️ Order {} for session {provider_id} is {}. Newly fulfilled: {}",
                fulfilment.order.order_id, fulfilment.order.status, fulfilment.newly_fulfilled
            );
        },
        WebhookEvent::Ignored { event_type, reason } => {
            debug!("🔐️ Ignoring Stripe event {event_type}. {reason}");
        },
    }
    Ok(HttpResponse::NoContent().finish())
}
