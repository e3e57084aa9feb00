use actix_web::{http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::{DateTime, Duration, TimeZone, Utc};
use cpg_engine::{
    db_types::{Cents, Course, CourseId, Order, OrderId, OrderStatusType, ProviderKind, ProviderTxId, UserId},
    events::EventProducers,
    traits::Fulfilment,
    AccountApi,
    CartApi,
    CheckoutApi,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;

use super::mocks::MockShopBackend;
use crate::{
    auth::{JwtClaims, TokenVerifier},
    config::AuthConfig,
    validation::{RequestValidator, MAX_PROVIDER_ID_LENGTH},
};

// DO NOT re-use this secret anywhere.
pub const TEST_JWT_SECRET: &str = "7d0c0f5e2b1a44e8a9b3c6d2e1f0a9b8-endpoint-tests";

pub const COURSE_A: &str = "0b8f6c1e-2d3a-4b5c-8d9e-0f1a2b3c4d5e";
pub const COURSE_B: &str = "7c6d5e4f-3a2b-4c1d-9e8f-7a6b5c4d3e2f";

pub fn issue_token(sub: &str, expiry: DateTime<Utc>) -> String {
    let claims = JwtClaims { sub: sub.to_string(), role: Some("user".to_string()), exp: expiry.timestamp() as usize };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()))
        .expect("Failed to sign token")
}

pub fn valid_token(sub: &str) -> String {
    issue_token(sub, Utc::now() + Duration::days(1))
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Sends the request to an app with the token verifier and validator installed, plus whatever `configure` adds.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new()
        .app_data(web::Data::new(TokenVerifier::new(&AuthConfig::new(TEST_JWT_SECRET))))
        .app_data(web::Data::new(RequestValidator::new(MAX_PROVIDER_ID_LENGTH).expect("validator")))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    (status, body)
}

pub fn cart_api(backend: MockShopBackend) -> web::Data<CartApi<MockShopBackend>> {
    web::Data::new(CartApi::new(backend))
}

pub fn account_api(backend: MockShopBackend) -> web::Data<AccountApi<MockShopBackend>> {
    web::Data::new(AccountApi::new(backend))
}

pub fn checkout_api(backend: MockShopBackend) -> web::Data<CheckoutApi<MockShopBackend>> {
    web::Data::new(CheckoutApi::new(backend, EventProducers::default()))
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn course(id: &str, name: &str, price: i64) -> Course {
    Course {
        course_id: CourseId::from(id),
        name: name.to_string(),
        description: format!("Learn {name}"),
        image_url: format!("https://cdn.example.com/{id}.png"),
        price: Cents::from(price),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn order(user: &str, provider_id: &str, status: OrderStatusType, total: i64) -> Order {
    Order {
        order_id: OrderId::from(format!("order-{provider_id}")),
        user_id: UserId::from(user),
        provider: if provider_id.starts_with("cs_") { ProviderKind::AsyncWebhook } else { ProviderKind::SyncCapture },
        provider_id: ProviderTxId::from(provider_id),
        status,
        total_price: Cents::from(total),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn fulfilment(user: &str, provider_id: &str, newly_fulfilled: bool) -> Fulfilment {
    Fulfilment {
        order: order(user, provider_id, OrderStatusType::Success, 2500),
        newly_fulfilled,
        cart_items_cleared: if newly_fulfilled { 2 } else { 0 },
    }
}
