//! Seat queue benchmarks
//!
//! Measures the cost of seeding a venue and of draining it, single-threaded
//! and with several threads racing on the same queue.
//!
//! Run with: `cargo bench --bench seat_queue`

#![allow(missing_docs)] // Benchmarks don't need extensive docs
#![allow(clippy::expect_used, clippy::unwrap_used)] // Benchmarks can use expect for setup

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use seatsweep::{SeatQueue, VenueLayout, generate_seats};
use std::sync::Arc;

/// The purchase service's default venue: 10 zones × 26 rows × 30 columns
const VENUE: VenueLayout = VenueLayout::new(10, 26, 30);

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory");
    group.throughput(Throughput::Elements(VENUE.capacity()));

    group.bench_function("generate_seats", |b| {
        b.iter(|| generate_seats(black_box(VENUE)).count());
    });

    group.bench_function("populate", |b| {
        b.iter(|| {
            let queue = SeatQueue::new();
            queue.populate(generate_seats(black_box(VENUE))).unwrap()
        });
    });

    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain");
    group.throughput(Throughput::Elements(VENUE.capacity()));

    for threads in [1_usize, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            b.iter_batched(
                || {
                    let queue = Arc::new(SeatQueue::new());
                    queue.populate(generate_seats(VENUE)).unwrap();
                    queue
                },
                |queue| {
                    let handles: Vec<_> = (0..threads)
                        .map(|_| {
                            let queue = Arc::clone(&queue);
                            std::thread::spawn(move || {
                                let mut taken = 0_usize;
                                while queue.try_take().is_some() {
                                    taken += 1;
                                }
                                taken
                            })
                        })
                        .collect();
                    let taken: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
                    assert_eq!(taken, queue.seeded());
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate, bench_drain);
criterion_main!(benches);
