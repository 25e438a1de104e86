//! User Repository

use super::RepoResult;
use shared::models::{User, UserCreate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, email, display_name, wallet_address, role, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM user WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM user WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO user (email, display_name, wallet_address, role, created_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(&data.email)
    .bind(&data.display_name)
    .bind(&data.wallet_address)
    .bind(&data.role)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Mirror an authenticated identity into the local store.
///
/// Token subjects are the authoritative user ids. First sight inserts the
/// row; later sights refresh the identity columns and keep the wallet.
pub async fn upsert_identity(
    pool: &SqlitePool,
    id: i64,
    email: &str,
    display_name: &str,
    role: &str,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO user (id, email, display_name, role, created_at) \
         VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
         email = excluded.email, display_name = excluded.display_name, role = excluded.role \
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(email)
    .bind(display_name)
    .bind(role)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Bind or replace the user's wallet address
pub async fn set_wallet_address(pool: &SqlitePool, id: i64, address: &str) -> RepoResult<()> {
    sqlx::query("UPDATE user SET wallet_address = ? WHERE id = ?")
        .bind(address)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
