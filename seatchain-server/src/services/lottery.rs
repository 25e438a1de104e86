//! Lottery allocator
//!
//! Consumes the APPLIED applications of an event and produces a seat
//! assignment from a uniformly random permutation: the first `max_seats`
//! entries become SELECTED, the rest WAITLISTED, and every applicant gets a
//! 1-based `application_order` equal to its permutation position.
//!
//! Concurrency: triggers for the same event are serialized by a per-event
//! async mutex; the OPEN status precondition plus the OPEN → LOTTERY_DONE
//! compare-and-set commit reject any re-trigger instead of re-shuffling.
//! All assignments and the event commit land in one transaction, so a
//! failed run leaves the full APPLIED set for the retry. No external calls
//! are made - the whole pass is local state.

use dashmap::DashMap;
use rand::RngCore;
use rand::seq::SliceRandom;
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::repository::{application, event};
use crate::utils::{AppError, AppResult};
use shared::models::{ApplicationStatus, EventStatus};

/// Per-event trigger locks
#[derive(Debug, Default)]
pub struct LotteryLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl LotteryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, event_id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(event_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Allocation summary returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct LotteryOutcome {
    pub event_id: i64,
    pub total_applicants: usize,
    pub selected: usize,
    pub waitlisted: usize,
}

pub async fn trigger_lottery<R: RngCore + Send>(
    pool: &SqlitePool,
    locks: &LotteryLocks,
    event_id: i64,
    rng: &mut R,
) -> AppResult<LotteryOutcome> {
    let lock = locks.lock_for(event_id);
    let _guard = lock.lock().await;

    let event = event::find_by_id(pool, event_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Event {event_id} not found")))?;

    if event.status != EventStatus::Open {
        return Err(AppError::validation(
            "Lottery can only be triggered for OPEN events",
        ));
    }
    if shared::util::now_millis() < event.lottery_deadline {
        return Err(AppError::validation("Lottery deadline has not passed"));
    }

    let mut applicants = application::find_applied_for_event(pool, event_id).await?;
    applicants.shuffle(rng);

    let max_seats = usize::try_from(event.max_seats.max(0)).unwrap_or(0);
    let total = applicants.len();
    let selected = total.min(max_seats);

    let assignments: Vec<(i64, ApplicationStatus, i64)> = applicants
        .iter()
        .enumerate()
        .map(|(position, app)| {
            let status = if position < max_seats {
                ApplicationStatus::Selected
            } else {
                ApplicationStatus::Waitlisted
            };
            (app.id, status, (position + 1) as i64)
        })
        .collect();

    // Single-transaction commit: every assignment plus the event's
    // OPEN → LOTTERY_DONE flip land together or not at all, so no retry
    // ever sees a partially assigned event. Losing the CAS means another
    // process finished first; the per-event lock makes that impossible
    // within one process.
    if !application::commit_lottery_results(pool, event_id, &assignments, 1).await? {
        tracing::warn!(event_id, "Lottery commit lost the status race");
        return Err(AppError::validation("Lottery already completed"));
    }

    tracing::info!(event_id, total, selected, "Lottery completed");

    Ok(LotteryOutcome {
        event_id,
        total_applicants: total,
        selected,
        waitlisted: total - selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    async fn seed_applicants(pool: &SqlitePool, event_id: i64, count: usize) {
        for i in 0..count {
            let user = testutil::seed_user(pool, &format!("u{i}@example.com"), None).await;
            application::create(pool, user.id, event_id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn allocates_min_of_applicants_and_capacity() {
        let pool = testutil::pool().await;
        let event = testutil::seed_open_event(&pool, 2, 0).await;
        seed_applicants(&pool, event.id, 3).await;

        let mut rng = StdRng::seed_from_u64(7);
        let outcome = trigger_lottery(&pool, &LotteryLocks::new(), event.id, &mut rng)
            .await
            .unwrap();

        assert_eq!(outcome.selected, 2);
        assert_eq!(outcome.waitlisted, 1);

        let apps = application::find_by_event(&pool, event.id).await.unwrap();
        let selected = apps
            .iter()
            .filter(|a| a.status == ApplicationStatus::Selected)
            .count();
        let waitlisted = apps
            .iter()
            .filter(|a| a.status == ApplicationStatus::Waitlisted)
            .count();
        assert_eq!((selected, waitlisted), (2, 1));

        // application_order is a permutation of 1..=3
        let orders: HashSet<i64> = apps.iter().filter_map(|a| a.application_order).collect();
        assert_eq!(orders, (1..=3).collect::<HashSet<i64>>());
        assert!(apps.iter().all(|a| a.lottery_round == Some(1)));

        let event = event::find_by_id(&pool, event.id).await.unwrap().unwrap();
        assert_eq!(event.status, EventStatus::LotteryDone);
    }

    #[tokio::test]
    async fn selects_everyone_when_capacity_exceeds_applicants() {
        let pool = testutil::pool().await;
        let event = testutil::seed_open_event(&pool, 10, 0).await;
        seed_applicants(&pool, event.id, 4).await;

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = trigger_lottery(&pool, &LotteryLocks::new(), event.id, &mut rng)
            .await
            .unwrap();
        assert_eq!(outcome.selected, 4);
        assert_eq!(outcome.waitlisted, 0);
    }

    #[tokio::test]
    async fn second_trigger_is_rejected_without_reshuffling() {
        let pool = testutil::pool().await;
        let event = testutil::seed_open_event(&pool, 1, 0).await;
        seed_applicants(&pool, event.id, 3).await;

        let locks = LotteryLocks::new();
        let mut rng = StdRng::seed_from_u64(42);
        trigger_lottery(&pool, &locks, event.id, &mut rng).await.unwrap();

        let before = application::find_by_event(&pool, event.id).await.unwrap();

        let err = trigger_lottery(&pool, &locks, event.id, &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // No further state change
        let after = application::find_by_event(&pool, event.id).await.unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.status, b.status);
            assert_eq!(a.application_order, b.application_order);
        }
    }

    #[tokio::test]
    async fn deadline_must_have_passed() {
        let pool = testutil::pool().await;
        // Deadline one hour in the future
        let event =
            testutil::seed_event(&pool, 5, 0, EventStatus::Open, 3_600_000).await;
        seed_applicants(&pool, event.id, 2).await;

        let mut rng = StdRng::seed_from_u64(3);
        let err = trigger_lottery(&pool, &LotteryLocks::new(), event.id, &mut rng)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Applications untouched
        let apps = application::find_by_event(&pool, event.id).await.unwrap();
        assert!(apps.iter().all(|a| a.status == ApplicationStatus::Applied));
    }

    #[tokio::test]
    async fn failed_commit_rolls_back_every_assignment() {
        let pool = testutil::pool().await;
        let event = testutil::seed_open_event(&pool, 2, 0).await;
        seed_applicants(&pool, event.id, 3).await;
        let apps = application::find_by_event(&pool, event.id).await.unwrap();

        // One id that is not APPLIED aborts the batch mid-loop
        let assignments = vec![
            (apps[0].id, ApplicationStatus::Selected, 1),
            (9999, ApplicationStatus::Selected, 2),
            (apps[2].id, ApplicationStatus::Waitlisted, 3),
        ];
        application::commit_lottery_results(&pool, event.id, &assignments, 1)
            .await
            .unwrap_err();

        // Nothing sticks: applications untouched, event still OPEN
        let apps = application::find_by_event(&pool, event.id).await.unwrap();
        assert!(apps.iter().all(|a| a.status == ApplicationStatus::Applied));
        assert!(apps.iter().all(|a| a.application_order.is_none()));
        let event_row = event::find_by_id(&pool, event.id).await.unwrap().unwrap();
        assert_eq!(event_row.status, EventStatus::Open);

        // The retry therefore starts from the full APPLIED set and yields a
        // dense permutation, not duplicated ranks
        let mut rng = StdRng::seed_from_u64(11);
        trigger_lottery(&pool, &LotteryLocks::new(), event.id, &mut rng)
            .await
            .unwrap();
        let orders: HashSet<i64> = application::find_by_event(&pool, event.id)
            .await
            .unwrap()
            .iter()
            .filter_map(|a| a.application_order)
            .collect();
        assert_eq!(orders, (1..=3).collect::<HashSet<i64>>());
    }

    #[tokio::test]
    async fn same_seed_produces_same_permutation() {
        let pool_a = testutil::pool().await;
        let pool_b = testutil::pool().await;
        let event_a = testutil::seed_open_event(&pool_a, 2, 0).await;
        let event_b = testutil::seed_open_event(&pool_b, 2, 0).await;
        seed_applicants(&pool_a, event_a.id, 5).await;
        seed_applicants(&pool_b, event_b.id, 5).await;

        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);
        trigger_lottery(&pool_a, &LotteryLocks::new(), event_a.id, &mut rng_a)
            .await
            .unwrap();
        trigger_lottery(&pool_b, &LotteryLocks::new(), event_b.id, &mut rng_b)
            .await
            .unwrap();

        let orders_a: Vec<Option<i64>> = application::find_by_event(&pool_a, event_a.id)
            .await
            .unwrap()
            .iter()
            .map(|a| a.application_order)
            .collect();
        let orders_b: Vec<Option<i64>> = application::find_by_event(&pool_b, event_b.id)
            .await
            .unwrap()
            .iter()
            .map(|a| a.application_order)
            .collect();
        assert_eq!(orders_a, orders_b);
    }
}
