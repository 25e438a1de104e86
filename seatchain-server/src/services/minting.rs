//! Ticket minter
//!
//! Turns a COMPLETED payment into an on-chain token and a local ticket row.
//! The payment's `transaction_hash` is the durable idempotency marker:
//! webhook replays and the reconciliation sweep both funnel through
//! [`mint_if_needed`], which is a no-op once the marker (or the ticket row
//! itself) exists, and which back-fills a missing marker from the ticket
//! row so no payment lingers in the sweep's queue. Mint failures are logged
//! and swallowed - the payment stays COMPLETED and unminted, and the sweep
//! retries later.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::repository::{RepoError, application, payment, ticket, user};
use crate::gateway::LedgerGateway;
use crate::utils::{AppError, AppResult};
use shared::models::{Payment, Ticket};

/// Mint recipient for users with no wallet on file
pub const NULL_WALLET_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Mint the ticket for a completed payment unless one already exists.
///
/// Returns the ticket when one exists or was just created, `None` when the
/// mint is skipped (ledger unavailable, prior mint in flight) or failed.
pub async fn mint_if_needed(
    pool: &SqlitePool,
    ledger: &Arc<dyn LedgerGateway>,
    public_base_url: &str,
    payment: &Payment,
) -> AppResult<Option<Ticket>> {
    let app = application::find_by_id(pool, payment.application_id)
        .await?
        .ok_or_else(|| {
            AppError::internal(format!(
                "Payment {} references missing application {}",
                payment.id, payment.application_id
            ))
        })?;

    if let Some(existing) = ticket::find_by_user_and_event(pool, app.user_id, app.event_id).await? {
        // A ticket without the payment stamp means a crash hit between the
        // insert and the stamp; heal it here so the payment leaves the
        // reconciliation queue.
        if payment.transaction_hash.is_none() {
            payment::stamp_transaction_hash(pool, payment.id, &existing.transaction_hash).await?;
        }
        return Ok(Some(existing));
    }

    // A stamped hash with no ticket row means a prior mint confirmed but the
    // local insert was lost; the recovery below re-reads before minting, so
    // reaching here with a stamp set means the ticket insert raced us.
    if payment.transaction_hash.is_some() {
        tracing::debug!(payment_id = payment.id, "Mint already stamped, skipping");
        return Ok(None);
    }

    if !ledger.is_available() {
        tracing::debug!(payment_id = payment.id, "Ledger unavailable, mint deferred");
        return Ok(None);
    }

    let owner = user::find_by_id(pool, app.user_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Missing user {}", app.user_id)))?;

    let recipient = match owner.wallet_address.as_deref() {
        Some(addr) if !addr.trim().is_empty() => addr.to_string(),
        _ => NULL_WALLET_ADDRESS.to_string(),
    };
    let metadata_uri = format!("{public_base_url}/ticket/{}", app.id);

    let receipt = match ledger.mint(&recipient, app.event_id, &metadata_uri).await {
        Ok(receipt) => receipt,
        Err(e) => {
            tracing::warn!(
                payment_id = payment.id,
                application_id = app.id,
                error = %e,
                "Mint failed, left for reconciliation"
            );
            return Ok(None);
        }
    };

    tracing::info!(
        application_id = app.id,
        token_id = receipt.token_id,
        tx = %receipt.transaction_hash,
        "Ticket minted"
    );

    let row = match ticket::create(
        pool,
        app.id,
        app.event_id,
        app.user_id,
        receipt.token_id,
        &receipt.transaction_hash,
    )
    .await
    {
        Ok(row) => row,
        // Concurrent replay won the insert; its row is the ticket.
        Err(RepoError::Duplicate(_)) => {
            ticket::find_by_user_and_event(pool, app.user_id, app.event_id)
                .await?
                .ok_or_else(|| AppError::internal("Ticket vanished after duplicate insert"))?
        }
        Err(e) => return Err(e.into()),
    };

    payment::stamp_transaction_hash(pool, payment.id, &receipt.transaction_hash).await?;

    Ok(Some(row))
}
