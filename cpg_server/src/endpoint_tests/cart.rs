use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use cpg_engine::{
    db_types::{CartItem, CourseId, UserId},
    traits::{CartError, CatalogError},
};
use serde_json::{json, Value};

use super::{
    helpers::{bearer, cart_api, course, send_request, timestamp, valid_token, COURSE_A, COURSE_B},
    mocks::MockShopBackend,
};
use crate::routes::{AddCartItemRoute, ClearCartRoute, MyCartRoute, RemoveCartItemRoute};

fn configure(backend: MockShopBackend) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(cart_api(backend)).service(
            web::scope("/api")
                .service(MyCartRoute::<MockShopBackend>::new())
                .service(ClearCartRoute::<MockShopBackend>::new())
                .service(AddCartItemRoute::<MockShopBackend>::new())
                .service(RemoveCartItemRoute::<MockShopBackend>::new()),
        );
    }
}

fn cart_item(user: &str, course_id: &str) -> CartItem {
    CartItem { user_id: UserId::from(user), course_id: CourseId::from(course_id), created_at: timestamp() }
}

#[actix_web::test]
async fn fetch_cart_without_token() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/api/cart");
    let (status, body) = send_request(req, configure(MockShopBackend::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. No bearer token was provided."}"#);
}

#[actix_web::test]
async fn fetch_cart() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_fetch_cart_items()
        .withf(|user| user.as_str() == "alice")
        .returning(|_| Ok(vec![cart_item("alice", COURSE_A), cart_item("alice", COURSE_B)]));
    backend.expect_fetch_course().returning(|id| match id.as_str() {
        COURSE_A => Ok(course(COURSE_A, "Rust", 1000)),
        _ => Ok(course(COURSE_B, "Go", 1500)),
    });
    let req = TestRequest::get().uri("/api/cart").insert_header(bearer(&valid_token("alice")));
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::OK);
    let cart: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(cart["total"], json!(2500));
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart["items"][0]["course"]["name"], json!("Rust"));
}

#[actix_web::test]
async fn add_item() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend.expect_fetch_course().returning(|_| Ok(course(COURSE_A, "Rust", 1000)));
    backend.expect_fetch_owned_courses().returning(|_| Ok(vec![]));
    backend
        .expect_add_cart_item()
        .withf(|user, course_id| user.as_str() == "alice" && course_id.as_str() == COURSE_A)
        .times(1)
        .returning(|_, _| Ok(true));
    let req = TestRequest::put()
        .uri("/api/cart/items")
        .insert_header(bearer(&valid_token("alice")))
        .set_payload(json!({ "courseId": COURSE_A }).to_string());
    let (status, _) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn add_item_with_malformed_course_id() {
    let _ = env_logger::try_init().ok();
    // No expectations: the backend must not be touched
    let backend = MockShopBackend::new();
    let req = TestRequest::put()
        .uri("/api/cart/items")
        .insert_header(bearer(&valid_token("alice")))
        .set_payload(r#"{"courseId": "42"}"#);
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid courseId"), "{body}");
}

#[actix_web::test]
async fn add_item_with_bad_body() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::put()
        .uri("/api/cart/items")
        .insert_header(bearer(&valid_token("alice")))
        .set_payload("course=42");
    let (status, body) = send_request(req, configure(MockShopBackend::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid body"), "{body}");
}

#[actix_web::test]
async fn add_unknown_course() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend.expect_fetch_course().returning(|id| Err(CatalogError::CourseNotFound(id.clone())));
    backend.expect_add_cart_item().never();
    let req = TestRequest::put()
        .uri("/api/cart/items")
        .insert_header(bearer(&valid_token("alice")))
        .set_payload(json!({ "courseId": COURSE_B }).to_string());
    let (status, _) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn add_owned_course() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend.expect_fetch_course().returning(|_| Ok(course(COURSE_A, "Rust", 1000)));
    backend.expect_fetch_owned_courses().returning(|_| Ok(vec![course(COURSE_A, "Rust", 1000)]));
    backend.expect_add_cart_item().never();
    let req = TestRequest::put()
        .uri("/api/cart/items")
        .insert_header(bearer(&valid_token("alice")))
        .set_payload(json!({ "courseId": COURSE_A }).to_string());
    let (status, body) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("already been purchased"), "{body}");
}

#[actix_web::test]
async fn remove_item() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend
        .expect_remove_cart_item()
        .withf(|user, course_id| user.as_str() == "bob" && course_id.as_str() == COURSE_B)
        .times(1)
        .returning(|_, _| Ok(true));
    let req =
        TestRequest::delete().uri(&format!("/api/cart/items/{COURSE_B}")).insert_header(bearer(&valid_token("bob")));
    let (status, _) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn clear_cart() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend.expect_clear_cart().withf(|user| user.as_str() == "bob").times(1).returning(|_| Ok(3));
    let req = TestRequest::delete().uri("/api/cart").insert_header(bearer(&valid_token("bob")));
    let (status, _) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn backend_failure_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockShopBackend::new();
    backend.expect_clear_cart().returning(|_| Err(CartError::DatabaseError("database is locked".into())));
    let req = TestRequest::delete().uri("/api/cart").insert_header(bearer(&valid_token("bob")));
    let (status, _) = send_request(req, configure(backend)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
