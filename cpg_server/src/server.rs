use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    http::{
        header::{HeaderName, AUTHORIZATION, CONTENT_TYPE},
        KeepAlive,
    },
    middleware::{Condition, Logger},
    web,
    App,
    HttpServer,
};
use cpg_engine::{
    events::{EventHandlers, EventHooks, EventProducers, OrderExpiredEvent, OrderFulfilledEvent},
    AccountApi,
    CartApi,
    CheckoutApi,
    SqliteDatabase,
};
use futures::FutureExt;
use log::*;
use provider_tools::{PaypalApi, StripeApi, WebhookVerifier};

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    integrations::{PaypalProvider, StripeProvider},
    request_id::RequestIdMiddlewareFactory,
    routes::{
        health,
        AddCartItemRoute,
        ClearCartRoute,
        MyCartRoute,
        MyOrdersRoute,
        OwnedCoursesRoute,
        PaypalCaptureRoute,
        PaypalCheckoutRoute,
        RemoveCartItemRoute,
        StripeCheckoutRoute,
        StripeWebhookRoute,
    },
    validation::{RequestValidator, MAX_PROVIDER_ID_LENGTH},
};

const DB_MAX_CONNECTIONS: u32 = 25;
const EVENT_BUFFER_SIZE: usize = 128;
const CORS_MAX_AGE_SECS: usize = 3600;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = if config.database_url.is_empty() {
        SqliteDatabase::new(DB_MAX_CONNECTIONS).await
    } else {
        SqliteDatabase::new_with_url(&config.database_url, DB_MAX_CONNECTIONS).await
    }
    .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.auto_migrate {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    }
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, audit_hooks());
    let producers = handlers.producers();
    handlers.start_handlers();
    let _expiry_worker = start_expiry_worker(db.clone(), producers.clone(), config.pending_order_timeout);
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Writes every fulfilment and expiry to the `cpg::audit` log target.
pub fn audit_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_fulfilled(|ev: OrderFulfilledEvent| {
            async move {
                let o = ev.order;
                info!(
                    target: "cpg::audit",
                    "🧾️ FULFILLED order {} user {} provider {} ({}) total {}",
                    o.order_id, o.user_id, o.provider_id, o.provider, o.total_price
                );
            }
            .boxed()
        })
        .on_order_expired(|ev: OrderExpiredEvent| {
            async move {
                let o = ev.order;
                info!(
                    target: "cpg::audit",
                    "🕰️ EXPIRED order {} user {} provider {} ({}) total {}",
                    o.order_id, o.user_id, o.provider_id, o.provider, o.total_price
                );
            }
            .boxed()
        });
    hooks
}

/// The CORS policy for browser clients served from `origin`. `*` allows any origin.
pub fn cors_policy(origin: &str) -> Cors {
    let request_id = HeaderName::from_static("x-request-id");
    let cors = Cors::default()
        .allowed_methods(["GET", "POST", "DELETE"])
        .allowed_headers([AUTHORIZATION, CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id])
        .max_age(CORS_MAX_AGE_SECS);
    if origin == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(origin)
    }
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let paypal_api = PaypalApi::new(config.paypal.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let stripe_api = StripeApi::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let paypal = web::Data::new(PaypalProvider::new(paypal_api));
    let stripe = web::Data::new(StripeProvider::new(stripe_api));
    let webhook_verifier =
        web::Data::new(WebhookVerifier::new(config.stripe.webhook_secret.clone(), config.stripe.webhook_tolerance));
    let validator = web::Data::new(RequestValidator::new(MAX_PROVIDER_ID_LENGTH)?);
    let token_verifier = web::Data::new(TokenVerifier::new(&config.auth));
    let webhook_retry = web::Data::new(config.webhook_retry);
    let cors_origin = config.cors_origin.clone();
    info!(
        "🪛️ Webhook fulfilment is attempted {} times. Pending orders expire after {} hrs.",
        config.webhook_retry.attempts,
        config.pending_order_timeout.num_hours()
    );
    let srv = HttpServer::new(move || {
        let cart_api = CartApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let checkout_api = CheckoutApi::new(db.clone(), producers.clone());
        let cors = Condition::new(cors_origin.is_some(), cors_policy(cors_origin.as_deref().unwrap_or_default()));
        let app = App::new()
            .wrap(RequestIdMiddlewareFactory)
            .wrap(cors)
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U %{X-Request-Id}o").log_target("cpg::access_log"))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(checkout_api))
            .app_data(paypal.clone())
            .app_data(stripe.clone())
            .app_data(webhook_verifier.clone())
            .app_data(validator.clone())
            .app_data(token_verifier.clone())
            .app_data(webhook_retry.clone());
        // Routes that require authentication
        let api_scope = web::scope("/api")
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(ClearCartRoute::<SqliteDatabase>::new())
            .service(AddCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(OwnedCoursesRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(PaypalCheckoutRoute::<SqliteDatabase, PaypalProvider>::new())
            .service(PaypalCaptureRoute::<SqliteDatabase, PaypalProvider>::new())
            .service(StripeCheckoutRoute::<SqliteDatabase, StripeProvider>::new());
        app.service(health).service(api_scope).service(StripeWebhookRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
