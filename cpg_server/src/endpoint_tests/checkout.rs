use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use cpg_engine::{
    db_types::{CartItem, CourseId, NewOrder, OrderStatusType, ProviderKind, UserId},
    traits::{CaptureOutcome, ChargeInitiation, OrderLedgerError, ProviderError},
};
use serde_json::{json, Value};

use super::{
    helpers::{
        bearer,
        checkout_api,
        course,
        fulfilment,
        order,
        send_request,
        timestamp,
        valid_token,
        COURSE_A,
        COURSE_B,
    },
    mocks::{MockPaypal, MockShopBackend, MockStripe},
};
use crate::routes::{PaypalCaptureRoute, PaypalCheckoutRoute, StripeCheckoutRoute};

fn configure(backend: MockShopBackend, paypal: MockPaypal, stripe: MockStripe) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(checkout_api(backend))
            .app_data(web::Data::new(paypal))
            .app_data(web::Data::new(stripe))
            .service(
                web::scope("/api")
                    .service(PaypalCheckoutRoute::<MockShopBackend, MockPaypal>::new())
                    .service(PaypalCaptureRoute::<MockShopBackend, MockPaypal>::new())
                    .service(StripeCheckoutRoute::<MockShopBackend, MockStripe>::new()),
            );
    }
}

fn paypal() -> MockPaypal {
    let mut paypal = MockPaypal::new();
    paypal.expect_kind().return_const(ProviderKind::SyncCapture);
    paypal
}

fn stripe() -> MockStripe {
    let mut stripe = MockStripe::new();
    stripe.expect_kind().return_const(ProviderKind::AsyncWebhook);
    stripe
}

/// A backend holding a two-course cart ($10 + $15) for `user`.
fn backend_with_cart(user: &'static str) -> MockShopBackend {
    let mut backend = MockShopBackend::new();
    backend.expect_fetch_cart_items().withf(move |u| u.as_str() == user).returning(move |_| {
        Ok([COURSE_A, COURSE_B]
            .into_iter()
            .map(|c| CartItem { user_id: UserId::from(user), course_id: CourseId::from(c), created_at: timestamp() })
            .collect())
    });
    backend.expect_fetch_course().returning(|id| match id.as_str() {
        COURSE_A => Ok(course(COURSE_A, "Rust", 1000)),
        _ => Ok(course(COURSE_B, "Go", 1500)),
    });
    backend
}

fn accept_new_orders(backend: &mut MockShopBackend) {
    backend.expect_insert_order().times(1).returning(|o: NewOrder| {
        Ok(order(o.user_id.as_str(), o.provider_id.as_str(), OrderStatusType::Pending, o.total_price().value()))
    });
}

#[actix_web::test]
async fn paypal_checkout() {
    let _ = env_logger::try_init().ok();
    let mut backend = backend_with_cart("alice");
    accept_new_orders(&mut backend);
    let mut paypal = paypal();
    paypal
        .expect_open_charge()
        .withf(|charge| charge.total.value() == 2500 && charge.lines.len() == 2)
        .times(1)
        .returning(|_| {
            Ok(ChargeInitiation::Approval {
                provider_id: "5O190127TN364715T".into(),
                payload: json!({ "id": "5O190127TN364715T", "status": "CREATED" }),
            })
        });
    let req = TestRequest::post().uri("/api/orders/paypal").insert_header(bearer(&valid_token("alice")));
    let (status, body) = send_request(req, configure(backend, paypal, stripe())).await;
    assert_eq!(status, StatusCode::OK);
    let payload: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(payload, json!({ "id": "5O190127TN364715T", "status": "CREATED" }));
}

#[actix_web::test]
async fn checkout_with_empty_cart() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend.expect_fetch_cart_items().returning(|_| Ok(vec![]));
    backend.expect_insert_order().never();
    let mut paypal = paypal();
    paypal.expect_open_charge().never();
    let req = TestRequest::post().uri("/api/orders/paypal").insert_header(bearer(&valid_token("alice")));
    let (status, body) = send_request(req, configure(backend, paypal, stripe())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, r#"{"error":"The cart is empty. There is nothing to check out."}"#);
}

#[actix_web::test]
async fn checkout_without_token() {
    let _ = env_logger::try_init().ok();
    let mut paypal = paypal();
    paypal.expect_open_charge().never();
    let req = TestRequest::post().uri("/api/orders/paypal");
    let (status, _) = send_request(req, configure(MockShopBackend::new(), paypal, stripe())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn checkout_provider_failure() {
    let _ = env_logger::try_init().ok();
    let mut backend = backend_with_cart("alice");
    backend.expect_insert_order().never();
    let mut paypal = paypal();
    paypal.expect_open_charge().returning(|_| Err(ProviderError::Unreachable("operation timed out".into())));
    let req = TestRequest::post().uri("/api/orders/paypal").insert_header(bearer(&valid_token("alice")));
    let (status, _) = send_request(req, configure(backend, paypal, stripe())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn checkout_refuses_out_of_range_prices() {
    let _ = env_logger::try_init().ok();
    for price in [1_000_001, -100] {
        let mut backend = MockShopBackend::new();
        backend.expect_fetch_cart_items().returning(|_| {
            Ok(vec![CartItem { user_id: "alice".into(), course_id: CourseId::from(COURSE_A), created_at: timestamp() }])
        });
        backend.expect_fetch_course().returning(move |_| Ok(course(COURSE_A, "Rust", price)));
        backend.expect_insert_order().never();
        let mut paypal = paypal();
        paypal.expect_open_charge().never();
        let req = TestRequest::post().uri("/api/orders/paypal").insert_header(bearer(&valid_token("alice")));
        let (status, body) = send_request(req, configure(backend, paypal, stripe())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("invalid price"), "{body}");
    }
}

#[actix_web::test]
async fn checkout_with_duplicate_provider_id() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend.expect_fetch_cart_items().returning(|_| {
        Ok(vec![CartItem { user_id: "alice".into(), course_id: CourseId::from(COURSE_A), created_at: timestamp() }])
    });
    backend.expect_fetch_course().returning(|_| Ok(course(COURSE_A, "Rust", 1000)));
    backend.expect_insert_order().returning(|o| Err(OrderLedgerError::DuplicateProviderId(o.provider_id)));
    let mut paypal = paypal();
    paypal
        .expect_open_charge()
        .returning(|_| Ok(ChargeInitiation::Approval { provider_id: "PP-DUP".into(), payload: json!({}) }));
    let req = TestRequest::post().uri("/api/orders/paypal").insert_header(bearer(&valid_token("alice")));
    let (status, _) = send_request(req, configure(backend, paypal, stripe())).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn paypal_capture_completed() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_fetch_order_by_provider_id()
        .returning(|id| Ok(order("alice", id.as_str(), OrderStatusType::Pending, 2500)));
    backend
        .expect_fulfil_order()
        .withf(|id| id.as_str() == "PP-1")
        .times(1)
        .returning(|id| Ok(fulfilment("alice", id.as_str(), true)));
    let mut paypal = paypal();
    paypal.expect_confirm().times(1).returning(|_| Ok(CaptureOutcome::Completed));
    let req = TestRequest::post().uri("/api/orders/paypal/PP-1/capture").insert_header(bearer(&valid_token("alice")));
    let (status, _) = send_request(req, configure(backend, paypal, stripe())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn paypal_capture_not_completed() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_fetch_order_by_provider_id()
        .returning(|id| Ok(order("alice", id.as_str(), OrderStatusType::Pending, 2500)));
    backend.expect_fulfil_order().never();
    let mut paypal = paypal();
    paypal.expect_confirm().returning(|_| Ok(CaptureOutcome::NotCompleted("PAYER_ACTION_REQUIRED".into())));
    let req = TestRequest::post().uri("/api/orders/paypal/PP-1/capture").insert_header(bearer(&valid_token("alice")));
    let (status, body) = send_request(req, configure(backend, paypal, stripe())).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(body.contains("PAYER_ACTION_REQUIRED"), "{body}");
}

#[actix_web::test]
async fn paypal_capture_of_another_users_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_fetch_order_by_provider_id()
        .returning(|id| Ok(order("alice", id.as_str(), OrderStatusType::Pending, 2500)));
    backend.expect_fulfil_order().never();
    let mut paypal = paypal();
    paypal.expect_confirm().never();
    let req =
        TestRequest::post().uri("/api/orders/paypal/PP-1/capture").insert_header(bearer(&valid_token("mallory")));
    let (status, _) = send_request(req, configure(backend, paypal, stripe())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn paypal_capture_of_unknown_order() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_fetch_order_by_provider_id()
        .returning(|id| Err(OrderLedgerError::ProviderIdNotFound(id.clone())));
    let mut paypal = paypal();
    paypal.expect_confirm().never();
    let req =
        TestRequest::post().uri("/api/orders/paypal/PP-404/capture").insert_header(bearer(&valid_token("alice")));
    let (status, _) = send_request(req, configure(backend, paypal, stripe())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn paypal_capture_with_malformed_id() {
    let _ = env_logger::try_init().ok();
    let mut paypal = paypal();
    paypal.expect_confirm().never();
    let req = TestRequest::post().uri("/api/orders/paypal/PP.1/capture").insert_header(bearer(&valid_token("alice")));
    let (status, body) = send_request(req, configure(MockShopBackend::new(), paypal, stripe())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("providerId"), "{body}");
}

#[actix_web::test]
async fn paypal_capture_provider_failure() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_fetch_order_by_provider_id()
        .returning(|id| Ok(order("alice", id.as_str(), OrderStatusType::Pending, 2500)));
    backend.expect_fulfil_order().never();
    let mut paypal = paypal();
    paypal
        .expect_confirm()
        .returning(|_| Err(ProviderError::Rejected { status: 422, message: "ORDER_NOT_APPROVED".into() }));
    let req = TestRequest::post().uri("/api/orders/paypal/PP-1/capture").insert_header(bearer(&valid_token("alice")));
    let (status, _) = send_request(req, configure(backend, paypal, stripe())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn stripe_checkout() {
    let _ = env_logger::try_init().ok();
    let mut backend = backend_with_cart("bob");
    accept_new_orders(&mut backend);
    let mut stripe = stripe();
    stripe.expect_open_charge().withf(|charge| charge.total.value() == 2500).times(1).returning(|_| {
        Ok(ChargeInitiation::Redirect {
            provider_id: "cs_test_a1".into(),
            redirect_url: "https://checkout.stripe.com/c/pay/cs_test_a1".into(),
        })
    });
    let mut paypal = paypal();
    paypal.expect_open_charge().never();
    let req = TestRequest::post().uri("/api/orders/stripe").insert_header(bearer(&valid_token("bob")));
    let (status, body) = send_request(req, configure(backend, paypal, stripe)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#""https://checkout.stripe.com/c/pay/cs_test_a1""#);
}
