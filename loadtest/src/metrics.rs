//! Business metrics for the seat sweep.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `seatsweep_purchases_total{status}` - Purchase attempts by outcome (`created`, `failed`)
//! - `seatsweep_verifications_total{status}` - Verification reads by outcome (`confirmed`, `failed`)
//! - `seatsweep_users_stopped_total` - Virtual users that observed an empty queue
//!
//! ## Gauges
//! - `seatsweep_seats_seeded` - Seats placed in the queue at start
//! - `seatsweep_seats_remaining` - Seats not yet handed to a user
//!
//! ## Histograms
//! - `seatsweep_purchase_duration_seconds` - Purchase round-trip time

use metrics::{describe_counter, describe_gauge, describe_histogram};

/// Initialize and register all business metrics descriptions.
///
/// Call once at start-up, before any metric is recorded.
pub fn register_loadtest_metrics() {
    describe_counter!(
        "seatsweep_purchases_total",
        "Purchase attempts by outcome (created, failed)"
    );
    describe_histogram!(
        "seatsweep_purchase_duration_seconds",
        "Time taken by one purchase request"
    );
    describe_counter!(
        "seatsweep_verifications_total",
        "Verification reads by outcome (confirmed, failed)"
    );
    describe_counter!(
        "seatsweep_users_stopped_total",
        "Virtual users that found the seat queue empty"
    );
    describe_gauge!("seatsweep_seats_seeded", "Seats seeded into the queue");
    describe_gauge!(
        "seatsweep_seats_remaining",
        "Seats still waiting for a virtual user"
    );

    tracing::info!("Load test metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record the queue being seeded.
#[allow(clippy::cast_precision_loss)] // gauge values
pub fn record_seats_seeded(seeded: usize) {
    metrics::gauge!("seatsweep_seats_seeded").set(seeded as f64);
    metrics::gauge!("seatsweep_seats_remaining").set(seeded as f64);
}

/// Record one seat leaving the queue.
pub fn record_seat_taken() {
    metrics::gauge!("seatsweep_seats_remaining").decrement(1.0);
}

/// Record a purchase answered with "created".
pub fn record_purchase_created(duration_secs: f64) {
    metrics::counter!("seatsweep_purchases_total", "status" => "created").increment(1);
    metrics::histogram!("seatsweep_purchase_duration_seconds").record(duration_secs);
}

/// Record a purchase that was not created.
pub fn record_purchase_failed(duration_secs: f64) {
    metrics::counter!("seatsweep_purchases_total", "status" => "failed").increment(1);
    metrics::histogram!("seatsweep_purchase_duration_seconds").record(duration_secs);
}

/// Record the outcome of a verification read.
pub fn record_verification(confirmed: bool) {
    let status = if confirmed { "confirmed" } else { "failed" };
    metrics::counter!("seatsweep_verifications_total", "status" => status).increment(1);
}

/// Record a virtual user stopping.
pub fn record_user_stopped() {
    metrics::counter!("seatsweep_users_stopped_total").increment(1);
}
