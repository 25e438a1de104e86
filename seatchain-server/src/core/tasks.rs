//! Background tasks
//!
//! Periodic reconciliation sweep: COMPLETED payments whose mint never got
//! stamped (ledger down during the webhook, crash between commit and mint)
//! are re-driven through the minter until a ticket exists. The sweep is the
//! recovery path promised by the payment handler when it absorbs a mint
//! failure.

use std::time::Duration;

use crate::core::ServerState;
use crate::db::repository::payment;
use crate::services::minting;

/// One sweep pass; returns how many payments were successfully minted
pub async fn reconcile_unminted(state: &ServerState) -> usize {
    let pending = match payment::find_completed_unminted(&state.pool).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "Reconciliation query failed");
            return 0;
        }
    };

    if pending.is_empty() {
        return 0;
    }
    tracing::info!(count = pending.len(), "Reconciling unminted payments");

    let mut minted = 0;
    for pay in &pending {
        match minting::mint_if_needed(
            &state.pool,
            &state.ledger,
            &state.config.public_base_url,
            pay,
        )
        .await
        {
            Ok(Some(_)) => minted += 1,
            Ok(None) => {} // still unmintable, next sweep retries
            Err(e) => {
                tracing::error!(payment_id = pay.id, error = %e, "Reconciliation failed");
            }
        }
    }
    minted
}

/// Spawn the periodic sweep; a zero interval disables it
pub fn start_background_tasks(state: &ServerState) {
    let interval_secs = state.config.reconcile_interval_secs;
    if interval_secs == 0 {
        tracing::info!("Reconciliation sweep disabled");
        return;
    }

    let state = state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick fires immediately, which doubles as a startup recovery pass
        loop {
            ticker.tick().await;
            let minted = reconcile_unminted(&state).await;
            if minted > 0 {
                tracing::info!(minted, "Reconciliation sweep recovered mints");
            }
        }
    });
    tracing::info!(interval_secs, "Reconciliation sweep started");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::application;
    use crate::gateway::mock::InMemoryLedger;
    use crate::services::testutil;
    use shared::models::ApplicationStatus;
    use std::sync::Arc;

    #[tokio::test]
    async fn sweep_recovers_payments_missed_by_the_webhook() {
        let state = ServerState::for_tests().await;
        let pool = &state.pool;

        let user = testutil::seed_user(pool, "r@example.com", None).await;
        let event = testutil::seed_open_event(pool, 5, 0).await;
        let app = application::create(pool, user.id, event.id).await.unwrap();
        application::assign_lottery_result(pool, app.id, ApplicationStatus::Selected, 1, 1)
            .await
            .unwrap();
        payment::upsert_pending(pool, app.id, "cs_sweep", 0, "USD").await.unwrap();
        assert!(payment::complete_if_pending(pool, "cs_sweep").await.unwrap());

        assert_eq!(reconcile_unminted(&state).await, 1);
        // Idempotent: nothing left on the second pass
        assert_eq!(reconcile_unminted(&state).await, 0);
    }

    #[tokio::test]
    async fn sweep_tolerates_a_down_ledger() {
        let mut state = ServerState::for_tests().await;
        let mock = Arc::new(InMemoryLedger::new());
        mock.set_failing(true);
        state.ledger = mock.clone();
        let pool = &state.pool;

        let user = testutil::seed_user(pool, "r@example.com", None).await;
        let event = testutil::seed_open_event(pool, 5, 0).await;
        let app = application::create(pool, user.id, event.id).await.unwrap();
        application::assign_lottery_result(pool, app.id, ApplicationStatus::Selected, 1, 1)
            .await
            .unwrap();
        payment::upsert_pending(pool, app.id, "cs_down", 0, "USD").await.unwrap();
        assert!(payment::complete_if_pending(pool, "cs_down").await.unwrap());

        assert_eq!(reconcile_unminted(&state).await, 0);

        mock.set_failing(false);
        assert_eq!(reconcile_unminted(&state).await, 1);
    }
}
