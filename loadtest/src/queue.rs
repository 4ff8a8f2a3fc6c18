//! Shared seat queue.
//!
//! Seeded once, drained concurrently. Seats are stored in an immutable slice
//! and handed out by advancing an atomic cursor, so a take is a single
//! compare-and-swap: it never blocks, never hands the same seat out twice and
//! never loses one. Once the cursor reaches the end the queue stays empty.

use crate::error::QueueError;
use crate::metrics;
use crate::types::Seat;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Finite, single-producer / multi-consumer seat queue.
///
/// Share it as `Arc<SeatQueue>`; every virtual user of a run gets the same
/// instance. Independent instances do not interact, so tests can create as
/// many as they like.
#[derive(Debug, Default)]
pub struct SeatQueue {
    seats: OnceLock<Box<[Seat]>>,
    cursor: AtomicUsize,
}

impl SeatQueue {
    /// Create an empty, unpopulated queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the queue with the run's whole inventory.
    ///
    /// Returns the number of seats seeded.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::AlreadyPopulated`] on a second call; the queue is
    /// single-shot and never refilled.
    pub fn populate<I>(&self, seats: I) -> Result<usize, QueueError>
    where
        I: IntoIterator<Item = Seat>,
    {
        let mut fresh = Some(seats);
        let stored = self.seats.get_or_init(|| {
            fresh
                .take()
                .map(|seats| seats.into_iter().collect())
                .unwrap_or_default()
        });

        if fresh.is_some() {
            return Err(QueueError::AlreadyPopulated {
                seeded: stored.len(),
            });
        }

        metrics::record_seats_seeded(stored.len());
        tracing::info!(seeded = stored.len(), "Seat queue populated");
        Ok(stored.len())
    }

    /// Remove one seat, or `None` once the queue is empty.
    ///
    /// Linearizable and non-blocking. An unpopulated queue is empty.
    #[must_use]
    pub fn try_take(&self) -> Option<Seat> {
        let seats = self.seats.get()?;
        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < seats.len()).then_some(n + 1)
            })
            .ok()?;

        metrics::record_seat_taken();
        seats.get(index).cloned()
    }

    /// Whether `populate` has been called
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.seats.get().is_some()
    }

    /// Seats seeded by `populate` (0 before)
    #[must_use]
    pub fn seeded(&self) -> usize {
        self.seats.get().map_or(0, |seats| seats.len())
    }

    /// Seats handed out so far
    #[must_use]
    pub fn taken(&self) -> usize {
        self.cursor.load(Ordering::Acquire).min(self.seeded())
    }

    /// Seats still waiting for a user
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.seeded() - self.taken()
    }

    /// Whether every seeded seat has been handed out
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
