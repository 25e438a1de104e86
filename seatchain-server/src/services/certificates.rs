//! Certificate issuer
//!
//! Produces the attendance certificate for a checked-in ticket: a
//! deterministic text artifact whose SHA-256 is recorded locally and,
//! best-effort, anchored on-chain under the ticket's token. Attendee name
//! and event title are snapshotted onto the certificate row at issue time,
//! so regeneration is byte-identical even after a profile or event rename.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::repository::{RepoError, certificate, event, ticket, user};
use crate::gateway::LedgerGateway;
use crate::utils::{AppError, AppResult};
use shared::models::Certificate;

/// Certificate plus its rendered bytes
#[derive(Debug, Clone)]
pub struct CertificateArtifact {
    pub certificate: Certificate,
    pub bytes: Vec<u8>,
}

fn render(
    attendee_name: &str,
    event_title: &str,
    certificate_id: &str,
    verify_url: &str,
    issue_date: &str,
) -> Vec<u8> {
    format!(
        "CERTIFICATE OF ATTENDANCE\n\
         =========================\n\
         \n\
         This certifies that\n\
         \n\
             {attendee_name}\n\
         \n\
         attended\n\
         \n\
             {event_title}\n\
         \n\
         Certificate ID: {certificate_id}\n\
         Verification:   {verify_url}\n\
         Issued:         {issue_date}\n"
    )
    .into_bytes()
}

fn rebuild(public_base_url: &str, cert: &Certificate) -> Vec<u8> {
    render(
        &cert.attendee_name,
        &cert.event_title,
        &cert.certificate_id,
        &format!("{public_base_url}/verify/{}", cert.certificate_id),
        &shared::util::date_string(cert.created_at),
    )
}

/// Issue (or regenerate) the certificate for a ticket.
///
/// First call creates the row and anchors the hash; later calls re-render
/// the identical artifact from the stored snapshot without touching the
/// ledger.
pub async fn generate_certificate(
    pool: &SqlitePool,
    ledger: &Arc<dyn LedgerGateway>,
    public_base_url: &str,
    ticket_id: i64,
) -> AppResult<CertificateArtifact> {
    let ticket_row = ticket::find_by_id(pool, ticket_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Ticket {ticket_id} not found")))?;

    if !ticket_row.checked_in {
        return Err(AppError::validation(
            "Attendance must be marked before certificate",
        ));
    }

    if let Some(existing) = certificate::find_by_ticket_id(pool, ticket_id).await? {
        let bytes = rebuild(public_base_url, &existing);
        return Ok(CertificateArtifact {
            certificate: existing,
            bytes,
        });
    }

    let holder = user::find_by_id(pool, ticket_row.user_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Missing user {}", ticket_row.user_id)))?;
    let event_row = event::find_by_id(pool, ticket_row.event_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("Missing event {}", ticket_row.event_id)))?;

    let certificate_id = format!(
        "CERT-{}",
        &Uuid::new_v4().simple().to_string().to_uppercase()[..16]
    );
    let verify_url = format!("{public_base_url}/verify/{certificate_id}");
    let issued_at = shared::util::now_millis();

    let bytes = render(
        holder.name_or_email(),
        &event_row.title,
        &certificate_id,
        &verify_url,
        &shared::util::date_string(issued_at),
    );
    let digest: [u8; 32] = Sha256::digest(&bytes).into();
    let file_hash = hex::encode(digest);

    // Anchoring is best-effort; a down ledger leaves transaction_hash NULL
    let anchor_tx = if ledger.is_available() {
        match ledger.anchor_hash(ticket_row.token_id, &digest).await {
            Ok(tx) => Some(tx),
            Err(e) => {
                tracing::warn!(ticket_id, error = %e, "Certificate anchoring failed");
                None
            }
        }
    } else {
        None
    };

    let certificate = match certificate::create(
        pool,
        ticket_id,
        ticket_row.user_id,
        ticket_row.event_id,
        &certificate_id,
        &file_hash,
        anchor_tx.as_deref(),
        holder.name_or_email(),
        &event_row.title,
        issued_at,
    )
    .await
    {
        Ok(row) => row,
        // Concurrent issue raced us; serve its artifact
        Err(RepoError::Duplicate(_)) => {
            let existing = certificate::find_by_ticket_id(pool, ticket_id)
                .await?
                .ok_or_else(|| AppError::internal("Certificate vanished after duplicate insert"))?;
            let bytes = rebuild(public_base_url, &existing);
            return Ok(CertificateArtifact {
                certificate: existing,
                bytes,
            });
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        ticket_id,
        certificate_id = %certificate.certificate_id,
        anchored = certificate.transaction_hash.is_some(),
        "Certificate issued"
    );

    Ok(CertificateArtifact { certificate, bytes })
}

/// Public existence check behind the verification URL
pub async fn verify_certificate(pool: &SqlitePool, certificate_id: &str) -> AppResult<bool> {
    Ok(certificate::find_by_certificate_id(pool, certificate_id)
        .await?
        .is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{application, payment};
    use crate::gateway::mock::InMemoryLedger;
    use crate::message::LiveChannel;
    use crate::services::{checkin, minting, testutil};
    use shared::models::{ApplicationStatus, Ticket};

    async fn checked_in_ticket(pool: &SqlitePool, ledger: &Arc<dyn LedgerGateway>) -> Ticket {
        let user = testutil::seed_user(pool, "g@example.com", None).await;
        let event = testutil::seed_open_event(pool, 5, 0).await;
        let app = application::create(pool, user.id, event.id).await.unwrap();
        application::assign_lottery_result(pool, app.id, ApplicationStatus::Selected, 1, 1)
            .await
            .unwrap();
        payment::upsert_pending(pool, app.id, "cs_cert", 0, "USD").await.unwrap();
        assert!(payment::complete_if_pending(pool, "cs_cert").await.unwrap());
        let pay = payment::find_by_application_id(pool, app.id)
            .await
            .unwrap()
            .unwrap();
        let ticket = minting::mint_if_needed(pool, ledger, "http://host", &pay)
            .await
            .unwrap()
            .unwrap();
        checkin::check_in(pool, ledger, &LiveChannel::new(), ticket.event_id, ticket.token_id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn issues_hashes_and_anchors() {
        let pool = testutil::pool().await;
        let mock = Arc::new(InMemoryLedger::new());
        let ledger: Arc<dyn LedgerGateway> = mock.clone();
        let ticket = checked_in_ticket(&pool, &ledger).await;

        let artifact = generate_certificate(&pool, &ledger, "http://host", ticket.id)
            .await
            .unwrap();
        let cert = &artifact.certificate;

        assert!(cert.certificate_id.starts_with("CERT-"));
        assert_eq!(cert.certificate_id.len(), "CERT-".len() + 16);
        assert_eq!(
            cert.file_hash,
            hex::encode(Sha256::digest(&artifact.bytes))
        );
        assert!(cert.transaction_hash.is_some());

        let anchored = mock.anchored_hash(ticket.token_id).unwrap();
        assert_eq!(hex::encode(anchored), cert.file_hash);

        assert!(verify_certificate(&pool, &cert.certificate_id).await.unwrap());
        assert!(!verify_certificate(&pool, "CERT-DOESNOTEXIST").await.unwrap());
    }

    #[tokio::test]
    async fn regeneration_is_byte_identical() {
        let pool = testutil::pool().await;
        let mock = Arc::new(InMemoryLedger::new());
        let ledger: Arc<dyn LedgerGateway> = mock.clone();
        let ticket = checked_in_ticket(&pool, &ledger).await;

        let first = generate_certificate(&pool, &ledger, "http://host", ticket.id)
            .await
            .unwrap();
        let second = generate_certificate(&pool, &ledger, "http://host", ticket.id)
            .await
            .unwrap();

        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.certificate.id, second.certificate.id);
        // The ledger saw exactly one anchor call
        assert!(mock.anchored_hash(ticket.token_id).is_some());
    }

    #[tokio::test]
    async fn requires_attendance() {
        let pool = testutil::pool().await;
        let ledger: Arc<dyn LedgerGateway> = Arc::new(InMemoryLedger::new());

        let user = testutil::seed_user(&pool, "g@example.com", None).await;
        let event = testutil::seed_open_event(&pool, 5, 0).await;
        let app = application::create(&pool, user.id, event.id).await.unwrap();
        application::assign_lottery_result(&pool, app.id, ApplicationStatus::Selected, 1, 1)
            .await
            .unwrap();
        payment::upsert_pending(&pool, app.id, "cs_na", 0, "USD").await.unwrap();
        assert!(payment::complete_if_pending(&pool, "cs_na").await.unwrap());
        let pay = payment::find_by_application_id(&pool, app.id)
            .await
            .unwrap()
            .unwrap();
        let ticket = minting::mint_if_needed(&pool, &ledger, "http://host", &pay)
            .await
            .unwrap()
            .unwrap();

        let err = generate_certificate(&pool, &ledger, "http://host", ticket.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn anchor_failure_leaves_the_certificate_unanchored() {
        let pool = testutil::pool().await;
        let mock = Arc::new(InMemoryLedger::new());
        let ledger: Arc<dyn LedgerGateway> = mock.clone();
        let ticket = checked_in_ticket(&pool, &ledger).await;

        mock.set_failing(true);
        let artifact = generate_certificate(&pool, &ledger, "http://host", ticket.id)
            .await
            .unwrap();
        assert!(artifact.certificate.transaction_hash.is_none());
        assert!(mock.anchored_hash(ticket.token_id).is_none());
    }
}
