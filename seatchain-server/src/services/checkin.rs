//! Check-in coordinator
//!
//! Gate staff scan a (event, token) pair; the local `checked_in` flag is the
//! source of truth and flips exactly once via compare-and-set. On-chain
//! ownership verification and attendance marking are best-effort
//! corroboration: when the ledger is down or the user has no wallet,
//! check-in proceeds on local state alone and the degradation is logged.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::repository::{ticket, user};
use crate::gateway::LedgerGateway;
use crate::message::LiveChannel;
use crate::utils::{AppError, AppResult};
use shared::message::CheckInNotice;
use shared::models::Ticket;

pub async fn check_in(
    pool: &SqlitePool,
    ledger: &Arc<dyn LedgerGateway>,
    live: &LiveChannel,
    event_id: i64,
    token_id: i64,
) -> AppResult<Ticket> {
    let ticket_row = ticket::find_by_event_and_token(pool, event_id, token_id)
        .await?
        .ok_or_else(|| AppError::not_found("Ticket not found"))?;

    if ticket_row.checked_in {
        return Err(AppError::validation("Already checked in"));
    }

    let holder = user::find_by_id(pool, ticket_row.user_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Missing user {}", ticket_row.user_id)))?;

    // On-chain corroboration, never a blocker
    if ledger.is_available()
        && let Some(wallet) = holder.wallet_address.as_deref().filter(|w| !w.trim().is_empty())
    {
        match ledger.verify_ownership(wallet, token_id).await {
            Ok(true) => {
                if let Err(e) = ledger.mark_attendance(token_id).await {
                    tracing::warn!(token_id, error = %e, "On-chain attendance mark failed");
                }
            }
            Ok(false) => {
                tracing::warn!(token_id, wallet, "On-chain owner does not match holder");
            }
            Err(e) => {
                tracing::warn!(token_id, error = %e, "Ownership verification failed");
            }
        }
    }

    if !ticket::set_checked_in(pool, ticket_row.id).await? {
        // Lost the CAS to a concurrent scan of the same ticket
        return Err(AppError::validation("Already checked in"));
    }

    let ticket_row = ticket::find_by_id(pool, ticket_row.id)
        .await?
        .ok_or_else(|| AppError::internal("Ticket vanished after check-in"))?;

    tracing::info!(event_id, token_id, ticket_id = ticket_row.id, "Checked in");

    let notice = CheckInNotice {
        event_id,
        token_id,
        attendee_name: holder.name_or_email().to_string(),
    };
    live.publish(&notice.topic(), &notice);

    Ok(ticket_row)
}
