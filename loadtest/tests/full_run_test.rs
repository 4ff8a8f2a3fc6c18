//! Full-run tests against an in-memory ticketing service.
//!
//! These tests verify the run-level guarantees: every seat attempted exactly
//! once however many users race for it, failed seats never re-offered, every
//! user terminating, and fatal layout errors stopping the run before any user
//! starts.
//!
//! Run with: `cargo test --test full_run_test -- --nocapture`

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use seatsweep::{
    Config, LoadTest, MockTicketingClient, RunError, Seat, SeatQueue, VenueLayout,
    YamlVenueLoader, generate_seats,
};
use seatsweep_testing::{ScriptedRandom, SeededRandom};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn config(users: usize) -> Config {
    let mut config = Config::default();
    config.load.users = users;
    config.load.spawn_rate = 0;
    config.load.wait_time_ms = 0;
    config
}

fn venues_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

/// Test: 64 users sweep a 3×12×15 venue.
///
/// Verifies that:
/// - All 540 seats are purchased
/// - No seat is purchased twice
/// - Every user stops
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_users_cover_every_seat_exactly_once() {
    let layout = VenueLayout::new(3, 12, 15);
    let prepared = LoadTest::prepare(&config(64), &layout, Arc::new(SeatQueue::new())).unwrap();
    let client = Arc::new(MockTicketingClient::new().with_latency(Duration::from_millis(1)));

    let summary = prepared
        .run(client.clone(), Arc::new(SeededRandom::new(42)))
        .await
        .unwrap();

    let purchases = client.purchases();
    let mut counts: HashMap<&Seat, usize> = HashMap::new();
    for seat in &purchases {
        *counts.entry(seat).or_insert(0) += 1;
    }
    let expected: HashSet<Seat> = generate_seats(layout).collect();

    assert_eq!(purchases.len(), 540);
    assert!(counts.values().all(|&n| n == 1), "a seat was purchased twice");
    assert_eq!(counts.keys().copied().cloned().collect::<HashSet<_>>(), expected);
    assert_eq!(summary.users_stopped, 64);
    assert_eq!(summary.purchases_created, 540);
    assert!(summary.is_exhaustive());
}

/// Test: more users than seats.
///
/// Verifies that the surplus users stop on their first iteration and the run
/// still terminates.
#[tokio::test]
async fn test_more_users_than_seats_all_terminate() {
    let prepared =
        LoadTest::prepare(&config(20), &VenueLayout::new(1, 2, 2), Arc::new(SeatQueue::new()))
            .unwrap();
    let client = Arc::new(MockTicketingClient::new());

    let summary = tokio::time::timeout(
        Duration::from_secs(10),
        prepared.run(client.clone(), Arc::new(ScriptedRandom::constant(0.9))),
    )
    .await
    .expect("run did not terminate")
    .unwrap();

    assert_eq!(summary.users_stopped, 20);
    assert_eq!(summary.purchase_attempts, 4);
}

/// Test: failing seats are forfeited.
///
/// Verifies that a seat whose purchase failed is never offered again: each
/// failing seat appears exactly once in the service's call log.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_seats_are_never_retried() {
    let failing = [Seat::new(1, 1, 1), Seat::new(2, 3, 4), Seat::new(2, 5, 5)];
    let mut mock = MockTicketingClient::new();
    for seat in &failing {
        mock = mock.with_failure(seat.clone(), 409);
    }
    let client = Arc::new(mock);

    let prepared =
        LoadTest::prepare(&config(8), &VenueLayout::new(2, 5, 5), Arc::new(SeatQueue::new()))
            .unwrap();
    let summary = prepared
        .run(client.clone(), Arc::new(ScriptedRandom::constant(0.9)))
        .await
        .unwrap();

    let purchases = client.purchases();
    for seat in &failing {
        assert_eq!(purchases.iter().filter(|s| *s == seat).count(), 1, "{seat} retried");
    }
    assert_eq!(purchases.len(), 50);
    assert_eq!(summary.purchases_failed, 3);
    assert_eq!(summary.purchases_created, 47);
    assert_eq!(summary.failures_by_status.get("409"), Some(&3));
}

/// Test: the verify draw follows the configured probability.
#[tokio::test]
async fn test_verification_fraction_near_half() {
    let prepared =
        LoadTest::prepare(&config(16), &VenueLayout::new(4, 25, 40), Arc::new(SeatQueue::new()))
            .unwrap();
    let client = Arc::new(MockTicketingClient::new());

    let summary = prepared
        .run(client.clone(), Arc::new(SeededRandom::new(7)))
        .await
        .unwrap();

    let fraction = summary.verifications_issued as f64 / summary.purchases_created as f64;
    assert_eq!(summary.purchases_created, 4000);
    assert!((0.46..=0.54).contains(&fraction), "fraction {fraction}");
    assert_eq!(client.verifications().len() as u64, summary.verifications_issued);
}

/// Test: a zero-zone venue aborts the run.
///
/// Verifies that no seat is seeded and no user (hence no purchase) starts.
#[test]
fn test_zero_zone_document_aborts_before_any_user() {
    let file = venues_file(
        "venues:\n  map:\n    Venue1:\n      zones:\n        zone-count: 0\n        row-count: 26\n        col-count: 30\n",
    );
    let queue = Arc::new(SeatQueue::new());

    let result = LoadTest::prepare(&config(10), &YamlVenueLoader::new(file.path()), queue.clone());

    assert!(matches!(result, Err(RunError::EmptyLayout { .. })));
    assert!(!queue.is_populated());
    assert_eq!(queue.try_take(), None);
}

/// Test: a venue with no counts at all is the same fatal condition.
#[test]
fn test_document_without_counts_aborts() {
    let file = venues_file("venues:\n  map:\n    Venue1:\n      name: Arena\n");

    let result = LoadTest::prepare(
        &config(1),
        &YamlVenueLoader::new(file.path()),
        Arc::new(SeatQueue::new()),
    );

    assert!(matches!(result, Err(RunError::EmptyLayout { venue_id }) if venue_id == "Venue1"));
}

/// Test: a missing document is fatal and names the path.
#[test]
fn test_missing_document_aborts_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("venues.yml");

    let error = LoadTest::prepare(
        &config(1),
        &YamlVenueLoader::new(&path),
        Arc::new(SeatQueue::new()),
    )
    .err()
    .unwrap();

    assert!(matches!(error, RunError::Layout(_)));
    assert!(error.to_string().contains("venues.yml"));
}
