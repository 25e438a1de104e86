//! Payment reconciler
//!
//! Opens hosted checkout sessions for SELECTED applicants and processes the
//! processor's completion webhooks. Delivery is at-least-once and unordered,
//! so [`handle_notification`] is written to be replayed: signature check,
//! then the PENDING → COMPLETED compare-and-set (exactly one delivery wins),
//! then an unconditional pass through the minter, which is itself a no-op
//! once the ticket exists.

use std::sync::Arc;

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::core::config::PaymentConfig;
use crate::db::repository::{application, event, payment};
use crate::gateway::{CheckoutSession, LedgerGateway, PaymentGateway, SessionRequest};
use crate::services::minting;
use crate::utils::{AppError, AppResult};
use shared::models::{ApplicationStatus, PaymentStatus};

/// Webhook body sent by the payment processor
#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(rename = "type")]
    kind: String,
    session_id: String,
}

/// Open (or re-open) a checkout session for a selected application.
///
/// Re-invocation while the payment is still PENDING repoints the row at the
/// fresh session; a stale pay link can always be replaced until completion.
pub async fn create_checkout_session(
    pool: &SqlitePool,
    gateway: &dyn PaymentGateway,
    config: &PaymentConfig,
    application_id: i64,
) -> AppResult<CheckoutSession> {
    let app = application::find_by_id(pool, application_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Application {application_id} not found")))?;

    if app.status != ApplicationStatus::Selected {
        return Err(AppError::validation("Only selected applicants may pay"));
    }

    if let Some(existing) = payment::find_by_application_id(pool, application_id).await?
        && existing.status == PaymentStatus::Completed
    {
        return Err(AppError::validation("Payment already completed"));
    }

    let event = event::find_by_id(pool, app.event_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Missing event {}", app.event_id)))?;

    let session = gateway
        .create_session(&SessionRequest {
            amount_cents: event.price_cents,
            currency: event.currency.clone(),
            description: format!("Ticket for {}", event.title),
            success_ref: format!("{}?application={application_id}", config.success_url),
            cancel_ref: format!("{}?application={application_id}", config.cancel_url),
        })
        .await
        .map_err(|e| AppError::internal(format!("Failed to create checkout session: {e}")))?;

    payment::upsert_pending(
        pool,
        application_id,
        &session.session_id,
        event.price_cents,
        &event.currency,
    )
    .await?;

    tracing::info!(
        application_id,
        session_id = %session.session_id,
        "Checkout session opened"
    );

    Ok(session)
}

/// Process one webhook delivery.
///
/// Everything after the signature check is tolerant of duplicates and
/// unknown sessions: a replay finds the CAS already done and falls through
/// to the minter, which recovers any mint lost to an earlier crash.
pub async fn handle_notification(
    pool: &SqlitePool,
    gateway: &dyn PaymentGateway,
    ledger: &Arc<dyn LedgerGateway>,
    public_base_url: &str,
    payload: &[u8],
    signature: &str,
) -> AppResult<()> {
    if !gateway.verify_notification(payload, signature) {
        return Err(AppError::authenticity("Webhook signature verification failed"));
    }

    let notice: Notification = serde_json::from_slice(payload)
        .map_err(|e| AppError::validation(format!("Malformed webhook payload: {e}")))?;

    if notice.kind != "checkout.completed" {
        tracing::debug!(kind = %notice.kind, "Ignoring webhook event type");
        return Ok(());
    }

    // Unknown session: acknowledge so the processor stops redelivering
    let Some(pay) = payment::find_by_session_id(pool, &notice.session_id).await? else {
        tracing::warn!(session_id = %notice.session_id, "Webhook for unknown session");
        return Ok(());
    };

    // The CAS also flips the application to PAID in the same transaction,
    // so the two records cannot diverge across a crash.
    if payment::complete_if_pending(pool, &notice.session_id).await? {
        tracing::info!(
            payment_id = pay.id,
            application_id = pay.application_id,
            "Payment completed"
        );
    } else {
        tracing::debug!(session_id = %notice.session_id, "Duplicate webhook delivery");
    }

    // Always attempt the mint: first delivery, replay after a crash between
    // CAS and mint, or a plain duplicate (no-op).
    let pay = payment::find_by_session_id(pool, &notice.session_id)
        .await?
        .ok_or_else(|| AppError::internal("Payment vanished during webhook handling"))?;
    minting::mint_if_needed(pool, ledger, public_base_url, &pay).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{RepoError, ticket};
    use crate::gateway::mock::InMemoryLedger;
    use crate::gateway::payment::HostedCheckoutGateway;
    use crate::gateway::{GatewayError, GatewayResult};
    use crate::services::testutil;

    fn gateway() -> HostedCheckoutGateway {
        HostedCheckoutGateway::new("test-secret", "http://checkout.local")
    }

    async fn selected_application(pool: &SqlitePool) -> i64 {
        let user = testutil::seed_user(pool, "p@example.com", None).await;
        let event = testutil::seed_open_event(pool, 5, 2500).await;
        let app = application::create(pool, user.id, event.id).await.unwrap();
        application::assign_lottery_result(pool, app.id, ApplicationStatus::Selected, 1, 1)
            .await
            .unwrap();
        app.id
    }

    fn completed_payload(session_id: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "type": "checkout.completed",
            "session_id": session_id,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn opens_a_session_for_a_selected_application() {
        let pool = testutil::pool().await;
        let gw = gateway();
        let app_id = selected_application(&pool).await;

        let session = create_checkout_session(&pool, &gw, &testutil::payment_config(), app_id)
            .await
            .unwrap();
        assert!(session.pay_url.contains(&session.session_id));

        let pay = payment::find_by_application_id(&pool, app_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pay.status, PaymentStatus::Pending);
        assert_eq!(pay.amount_cents, 2500);
    }

    #[tokio::test]
    async fn rejects_unselected_applications() {
        let pool = testutil::pool().await;
        let gw = gateway();
        let user = testutil::seed_user(&pool, "p@example.com", None).await;
        let event = testutil::seed_open_event(&pool, 5, 2500).await;
        let app = application::create(&pool, user.id, event.id).await.unwrap();

        let err = create_checkout_session(&pool, &gw, &testutil::payment_config(), app.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn reopening_repoints_the_pending_payment() {
        let pool = testutil::pool().await;
        let gw = gateway();
        let app_id = selected_application(&pool).await;
        let cfg = testutil::payment_config();

        let first = create_checkout_session(&pool, &gw, &cfg, app_id).await.unwrap();
        let second = create_checkout_session(&pool, &gw, &cfg, app_id).await.unwrap();
        assert_ne!(first.session_id, second.session_id);

        let pay = payment::find_by_application_id(&pool, app_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pay.session_id, second.session_id);
    }

    #[tokio::test]
    async fn webhook_completes_the_payment_and_mints() {
        let pool = testutil::pool().await;
        let gw = gateway();
        let ledger: Arc<dyn LedgerGateway> = Arc::new(InMemoryLedger::new());
        let app_id = selected_application(&pool).await;

        let session = create_checkout_session(&pool, &gw, &testutil::payment_config(), app_id)
            .await
            .unwrap();

        let payload = completed_payload(&session.session_id);
        let sig = gw.sign(&payload);
        handle_notification(&pool, &gw, &ledger, "http://host", &payload, &sig)
            .await
            .unwrap();

        let pay = payment::find_by_application_id(&pool, app_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pay.status, PaymentStatus::Completed);
        assert!(pay.transaction_hash.is_some());

        let app = application::find_by_id(&pool, app_id).await.unwrap().unwrap();
        assert_eq!(app.status, ApplicationStatus::Paid);
        assert!(
            ticket::find_by_user_and_event(&pool, app.user_id, app.event_id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn duplicate_deliveries_do_not_double_mint() {
        let pool = testutil::pool().await;
        let gw = gateway();
        let mock = Arc::new(InMemoryLedger::new());
        let ledger: Arc<dyn LedgerGateway> = mock.clone();
        let app_id = selected_application(&pool).await;

        let session = create_checkout_session(&pool, &gw, &testutil::payment_config(), app_id)
            .await
            .unwrap();

        let payload = completed_payload(&session.session_id);
        let sig = gw.sign(&payload);
        for _ in 0..3 {
            handle_notification(&pool, &gw, &ledger, "http://host", &payload, &sig)
                .await
                .unwrap();
        }
        assert_eq!(mock.minted_count(), 1);
    }

    #[tokio::test]
    async fn replay_recovers_a_mint_lost_to_ledger_failure() {
        let pool = testutil::pool().await;
        let gw = gateway();
        let mock = Arc::new(InMemoryLedger::new());
        let ledger: Arc<dyn LedgerGateway> = mock.clone();
        let app_id = selected_application(&pool).await;

        let session = create_checkout_session(&pool, &gw, &testutil::payment_config(), app_id)
            .await
            .unwrap();
        let payload = completed_payload(&session.session_id);
        let sig = gw.sign(&payload);

        // First delivery: payment commits, mint fails and is absorbed
        mock.set_failing(true);
        handle_notification(&pool, &gw, &ledger, "http://host", &payload, &sig)
            .await
            .unwrap();
        let pay = payment::find_by_application_id(&pool, app_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pay.status, PaymentStatus::Completed);
        assert!(pay.transaction_hash.is_none());

        // Redelivery after the ledger recovers completes the mint
        mock.set_failing(false);
        handle_notification(&pool, &gw, &ledger, "http://host", &payload, &sig)
            .await
            .unwrap();
        assert_eq!(mock.minted_count(), 1);
    }

    #[tokio::test]
    async fn bad_signatures_and_unknown_sessions() {
        let pool = testutil::pool().await;
        let gw = gateway();
        let ledger: Arc<dyn LedgerGateway> = Arc::new(InMemoryLedger::new());

        let payload = completed_payload("cs_unknown");
        let err = handle_notification(&pool, &gw, &ledger, "http://host", &payload, "deadbeef")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authenticity(_)));

        // Valid signature, unknown session: acknowledged without error
        let sig = gw.sign(&payload);
        handle_notification(&pool, &gw, &ledger, "http://host", &payload, &sig)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn completion_flips_the_application_in_the_same_transaction() {
        let pool = testutil::pool().await;
        let gw = gateway();
        let ledger: Arc<dyn LedgerGateway> = Arc::new(InMemoryLedger::new());
        let app_id = selected_application(&pool).await;

        let session = create_checkout_session(&pool, &gw, &testutil::payment_config(), app_id)
            .await
            .unwrap();

        // Completion commits, then the process dies before the handler gets
        // any further: the application must already be PAID at this point.
        assert!(
            payment::complete_if_pending(&pool, &session.session_id)
                .await
                .unwrap()
        );
        let app = application::find_by_id(&pool, app_id).await.unwrap().unwrap();
        assert_eq!(app.status, ApplicationStatus::Paid);

        // Redelivery takes the duplicate path and still converges on a ticket
        let payload = completed_payload(&session.session_id);
        let sig = gw.sign(&payload);
        handle_notification(&pool, &gw, &ledger, "http://host", &payload, &sig)
            .await
            .unwrap();
        let app = application::find_by_id(&pool, app_id).await.unwrap().unwrap();
        assert_eq!(app.status, ApplicationStatus::Paid);
        assert!(
            ticket::find_by_user_and_event(&pool, app.user_id, app.event_id)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn checkout_losing_the_completion_race_is_a_validation_error() {
        let pool = testutil::pool().await;
        let gw = gateway();
        let app_id = selected_application(&pool).await;

        let session = create_checkout_session(&pool, &gw, &testutil::payment_config(), app_id)
            .await
            .unwrap();
        payment::complete_if_pending(&pool, &session.session_id)
            .await
            .unwrap();

        // Completion raced in between the service's guard check and the
        // upsert; the store rejects it instead of surfacing a missing row.
        let err = payment::upsert_pending(&pool, app_id, "cs_late", 2500, "USD")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    struct OutageGateway;

    #[async_trait::async_trait]
    impl PaymentGateway for OutageGateway {
        async fn create_session(&self, _request: &SessionRequest) -> GatewayResult<CheckoutSession> {
            Err(GatewayError::Transport("connection refused".to_string()))
        }

        fn verify_notification(&self, _payload: &[u8], _signature: &str) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn processor_outage_is_a_server_error_not_a_rejection() {
        let pool = testutil::pool().await;
        let app_id = selected_application(&pool).await;

        let err = create_checkout_session(&pool, &OutageGateway, &testutil::payment_config(), app_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
