//! Run-wide statistics.
//!
//! Every virtual user reports into one shared [`RunStats`]; the lifecycle
//! controller snapshots it into a [`RunSummary`] once all users have stopped.

use crate::types::{PurchaseResult, VerificationResult};
use seatsweep_core::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Status key for failures that never got a response
const NO_RESPONSE: &str = "no-response";

/// Shared counters for one run.
#[derive(Debug, Default)]
pub struct RunStats {
    purchase_attempts: AtomicU64,
    purchases_created: AtomicU64,
    purchases_failed: AtomicU64,
    verifications_issued: AtomicU64,
    verifications_failed: AtomicU64,
    users_stopped: AtomicU64,
    failures_by_status: Mutex<BTreeMap<String, u64>>,
}

impl RunStats {
    /// Fresh counters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A purchase request is about to be sent
    pub fn record_attempt(&self) {
        self.purchase_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// A purchase request completed
    pub fn record_purchase(&self, result: &PurchaseResult) {
        match result {
            PurchaseResult::Success { .. } => {
                self.purchases_created.fetch_add(1, Ordering::Relaxed);
            },
            PurchaseResult::Failure { status_code, .. } => {
                self.purchases_failed.fetch_add(1, Ordering::Relaxed);
                let key = status_code.map_or_else(|| NO_RESPONSE.to_string(), |s| s.to_string());
                // A poisoned map only loses the breakdown, never the totals
                if let Ok(mut by_status) = self.failures_by_status.lock() {
                    *by_status.entry(key).or_insert(0) += 1;
                }
            },
        }
    }

    /// A verification request is about to be sent
    pub fn record_verification_issued(&self) {
        self.verifications_issued.fetch_add(1, Ordering::Relaxed);
    }

    /// A verification request completed
    pub fn record_verification(&self, result: &VerificationResult) {
        if !result.is_confirmed() {
            self.verifications_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A virtual user observed the empty queue
    pub fn record_user_stopped(&self) {
        self.users_stopped.fetch_add(1, Ordering::Relaxed);
    }

    /// Users stopped so far
    #[must_use]
    pub fn users_stopped(&self) -> u64 {
        self.users_stopped.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters
    #[must_use]
    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            purchase_attempts: self.purchase_attempts.load(Ordering::Relaxed),
            purchases_created: self.purchases_created.load(Ordering::Relaxed),
            purchases_failed: self.purchases_failed.load(Ordering::Relaxed),
            failures_by_status: self
                .failures_by_status
                .lock()
                .map(|by_status| by_status.clone())
                .unwrap_or_default(),
            verifications_issued: self.verifications_issued.load(Ordering::Relaxed),
            verifications_failed: self.verifications_failed.load(Ordering::Relaxed),
            users_stopped: self.users_stopped.load(Ordering::Relaxed),
            seats_seeded: 0,
            seats_remaining: 0,
            started_at: DateTime::default(),
            finished_at: DateTime::default(),
        }
    }
}

/// Final numbers of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Purchase requests sent
    pub purchase_attempts: u64,
    /// Purchases answered with "created"
    pub purchases_created: u64,
    /// Purchases not created
    pub purchases_failed: u64,
    /// Failures keyed by HTTP status, or `no-response`
    pub failures_by_status: BTreeMap<String, u64>,
    /// Verification reads sent
    pub verifications_issued: u64,
    /// Verification reads that did not succeed
    pub verifications_failed: u64,
    /// Users that ran until the queue was empty
    pub users_stopped: u64,
    /// Seats placed in the queue
    pub seats_seeded: u64,
    /// Seats never handed out (non-zero only after an interrupt)
    pub seats_remaining: u64,
    /// When the first user was started
    pub started_at: DateTime<Utc>,
    /// When the last user finished
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Whether every seeded seat was attempted exactly once and every attempt
    /// got an answer
    ///
    /// An interrupt can drop a purchase that was already sent; that seat left
    /// the queue but has no outcome, so the run is not exhaustive.
    #[must_use]
    pub const fn is_exhaustive(&self) -> bool {
        self.seats_remaining == 0
            && self.purchase_attempts == self.seats_seeded
            && self.purchases_created + self.purchases_failed == self.purchase_attempts
    }

    /// Wall time between the first user start and the last user finish
    #[must_use]
    pub fn elapsed(&self) -> TimeDelta {
        self.finished_at - self.started_at
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} seats seeded, {} attempted ({} created, {} failed), {} verified ({} failed), {} users stopped, {} seats remaining, {} ms",
            self.seats_seeded,
            self.purchase_attempts,
            self.purchases_created,
            self.purchases_failed,
            self.verifications_issued,
            self.verifications_failed,
            self.users_stopped,
            self.seats_remaining,
            self.elapsed().num_milliseconds(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Seat, TicketId};

    #[test]
    fn failures_are_broken_down_by_status() {
        let stats = RunStats::new();
        let seat = Seat::new(1, 1, 1);

        stats.record_attempt();
        stats.record_purchase(&PurchaseResult::Success {
            seat: seat.clone(),
            ticket_id: Some(TicketId::new("t")),
        });
        for status_code in [Some(409), Some(409), None] {
            stats.record_attempt();
            stats.record_purchase(&PurchaseResult::Failure {
                seat: seat.clone(),
                status_code,
            });
        }

        let summary = stats.snapshot();
        assert_eq!(summary.purchase_attempts, 4);
        assert_eq!(summary.purchases_created, 1);
        assert_eq!(summary.purchases_failed, 3);
        assert_eq!(summary.failures_by_status.get("409"), Some(&2));
        assert_eq!(summary.failures_by_status.get(NO_RESPONSE), Some(&1));
    }

    #[test]
    fn only_unconfirmed_verifications_count_as_failed() {
        let stats = RunStats::new();
        stats.record_verification_issued();
        stats.record_verification(&VerificationResult::Confirmed { status_code: 200 });
        stats.record_verification_issued();
        stats.record_verification(&VerificationResult::Failed {
            status_code: Some(404),
        });

        let summary = stats.snapshot();
        assert_eq!(summary.verifications_issued, 2);
        assert_eq!(summary.verifications_failed, 1);
    }

    #[test]
    fn exhaustive_means_every_seeded_seat_attempted() {
        let summary = RunSummary {
            purchase_attempts: 4,
            purchases_created: 3,
            purchases_failed: 1,
            seats_seeded: 4,
            ..RunSummary::default()
        };
        assert!(summary.is_exhaustive());
        assert!(
            !RunSummary {
                seats_remaining: 1,
                ..summary
            }
            .is_exhaustive()
        );
    }

    #[test]
    fn unanswered_attempt_is_not_exhaustive() {
        // Queue drained but the last purchase was dropped by an interrupt
        let summary = RunSummary {
            purchase_attempts: 1,
            seats_seeded: 1,
            ..RunSummary::default()
        };
        assert!(!summary.is_exhaustive());
    }
}
