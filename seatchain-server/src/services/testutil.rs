//! Shared test fixtures for the services layer

use sqlx::SqlitePool;

use crate::core::config::PaymentConfig;
use crate::db::DbService;
use crate::db::repository::{event, user};
use shared::models::{Event, EventCreate, EventStatus, User, UserCreate};

/// Fresh in-memory database with migrations applied
pub async fn pool() -> SqlitePool {
    DbService::in_memory().await.expect("in-memory db").pool
}

pub async fn seed_user(pool: &SqlitePool, email: &str, wallet: Option<&str>) -> User {
    user::create(
        pool,
        UserCreate {
            email: email.to_string(),
            display_name: Some(email.split('@').next().unwrap_or(email).to_string()),
            wallet_address: wallet.map(str::to_string),
            role: "ATTENDEE".to_string(),
        },
    )
    .await
    .expect("seed user")
}

pub async fn seed_event(
    pool: &SqlitePool,
    max_seats: i64,
    price_cents: i64,
    status: EventStatus,
    deadline_offset_ms: i64,
) -> Event {
    let now = shared::util::now_millis();
    event::create(
        pool,
        EventCreate {
            title: "Rust Conf".to_string(),
            description: Some("A conference".to_string()),
            location: Some("Berlin".to_string()),
            event_date: now + 86_400_000,
            price_cents,
            currency: "USD".to_string(),
            max_seats,
            lottery_deadline: now + deadline_offset_ms,
            status,
        },
        None,
    )
    .await
    .expect("seed event")
}

pub fn payment_config() -> PaymentConfig {
    PaymentConfig {
        webhook_secret: "test-secret".to_string(),
        checkout_base_url: "http://checkout.local".to_string(),
        success_url: "http://app.local/payment/success".to_string(),
        cancel_url: "http://app.local/payment/cancel".to_string(),
    }
}

/// OPEN event whose lottery deadline already passed
pub async fn seed_open_event(pool: &SqlitePool, max_seats: i64, price_cents: i64) -> Event {
    seed_event(pool, max_seats, price_cents, EventStatus::Open, -60_000).await
}
