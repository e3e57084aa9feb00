use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use cpg_engine::{
    db_types::{Cents, CourseId, OrderItem, OrderStatusType},
    traits::OrderLedgerError,
};
use serde_json::{json, Value};

use super::{
    helpers::{account_api, bearer, course, issue_token, order, send_request, timestamp, valid_token, COURSE_A},
    mocks::MockShopBackend,
};
use crate::routes::{MyOrdersRoute, OwnedCoursesRoute};

fn configure(backend: MockShopBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(account_api(backend)).service(
            web::scope("/api")
                .service(MyOrdersRoute::<MockShopBackend>::new())
                .service(OwnedCoursesRoute::<MockShopBackend>::new()),
        );
    }
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_fetch_orders_for_user()
        .withf(|user| user.as_str() == "alice")
        .returning(|_| Ok(vec![order("alice", "5O190127TN364715T", OrderStatusType::Success, 1000)]));
    backend.expect_fetch_order_items().returning(|order_id| {
        Ok(vec![OrderItem {
            order_id: order_id.clone(),
            course_id: CourseId::from(COURSE_A),
            price: Cents::from(1000),
            created_at: timestamp(),
        }])
    });
    let req = TestRequest::get().uri("/api/orders").insert_header(bearer(&valid_token("alice")));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["providerId"], json!("5O190127TN364715T"));
    assert_eq!(orders[0]["status"], json!("Success"));
    assert_eq!(orders[0]["items"][0]["courseId"], json!(COURSE_A));
    assert_eq!(orders[0]["items"][0]["price"], json!(1000));
}

#[actix_web::test]
async fn fetch_owned_courses() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_fetch_owned_courses()
        .withf(|user| user.as_str() == "carol")
        .returning(|_| Ok(vec![course(COURSE_A, "Rust", 1000)]));
    let req = TestRequest::get().uri("/api/courses/owned").insert_header(bearer(&valid_token("carol")));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let courses: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(courses[0]["courseId"], json!(COURSE_A));
}

#[actix_web::test]
async fn expired_token_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("alice", Utc::now() - Duration::hours(2));
    let req = TestRequest::get().uri("/api/orders").insert_header(bearer(&token));
    let (status, body) = send_request(req, configure(MockShopBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("expired"), "{body}");
}

#[actix_web::test]
async fn tampered_token_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut token = valid_token("alice");
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let req = TestRequest::get().uri("/api/orders").insert_header(bearer(&token));
    let (status, _) = send_request(req, configure(MockShopBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn history_backend_failure() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_fetch_orders_for_user()
        .returning(|_| Err(OrderLedgerError::DatabaseError("no such table: orders".into())));
    let req = TestRequest::get().uri("/api/orders").insert_header(bearer(&valid_token("alice")));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("no such table"), "{body}");
}
