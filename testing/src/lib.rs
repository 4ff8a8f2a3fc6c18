//! # Seatsweep Testing
//!
//! Testing utilities and helpers for seatsweep reducers.
//!
//! This crate provides:
//! - Deterministic implementations of the core Environment traits
//! - A Given-When-Then helper for reducers ([`ReducerTest`])
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```
//! use seatsweep_core::environment::{Clock, RandomSource};
//! use seatsweep_testing::{test_clock, ScriptedRandom};
//!
//! // The first draw verifies at p = 0.5, the second does not
//! let random = ScriptedRandom::new([0.1, 0.9]);
//! assert!(random.chance(0.5));
//! assert!(!random.chance(0.5));
//!
//! let clock = test_clock();
//! assert_eq!(clock.now(), clock.now());
//! ```

use chrono::{DateTime, Utc};
use seatsweep_core::environment::{Clock, RandomSource};


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, RandomSource, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use seatsweep_testing::mocks::FixedClock;
    /// use seatsweep_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Seeded pseudo-random source.
    ///
    /// Same seed, same sequence; use it for statistical assertions that must
    /// not flake.
    #[derive(Debug)]
    pub struct SeededRandom {
        rng: Mutex<StdRng>,
    }

    impl SeededRandom {
        /// Create a source from a seed
        #[must_use]
        pub fn new(seed: u64) -> Self {
            Self {
                rng: Mutex::new(StdRng::seed_from_u64(seed)),
            }
        }
    }

    impl RandomSource for SeededRandom {
        fn next_f64(&self) -> f64 {
            // A poisoned lock only means another test thread panicked; the RNG is still usable.
            let mut rng = self
                .rng
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            rng.r#gen::<f64>()
        }
    }

    /// Random source that replays a fixed script of samples.
    ///
    /// Samples are returned in order; once the script is exhausted the last
    /// sample repeats (or `0.0` for an empty script).
    #[derive(Debug)]
    pub struct ScriptedRandom {
        samples: Mutex<VecDeque<f64>>,
        last: Mutex<f64>,
    }

    impl ScriptedRandom {
        /// Create a source replaying `samples`
        #[must_use]
        pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
            Self {
                samples: Mutex::new(samples.into_iter().collect()),
                last: Mutex::new(0.0),
            }
        }

        /// A source that always returns `sample`
        #[must_use]
        pub fn constant(sample: f64) -> Self {
            Self::new([sample])
        }
    }

    impl RandomSource for ScriptedRandom {
        fn next_f64(&self) -> f64 {
            let mut samples = self
                .samples
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let mut last = self
                .last
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(sample) = samples.pop_front() {
                *last = sample;
            }
            *last
        }
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, ScriptedRandom, SeededRandom};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let first: Vec<f64> = (0..16).map(|_| a.next_f64()).collect();
        let second: Vec<f64> = (0..16).map(|_| b.next_f64()).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|s| (0.0..1.0).contains(s)));
    }

    #[test]
    fn test_scripted_random_replays_then_repeats() {
        let random = ScriptedRandom::new([0.1, 0.9]);
        assert!((random.next_f64() - 0.1).abs() < f64::EPSILON);
        assert!((random.next_f64() - 0.9).abs() < f64::EPSILON);
        assert!((random.next_f64() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scripted_random_drives_chance() {
        let random = ScriptedRandom::new([0.49, 0.5, 0.51]);
        assert!(random.chance(0.5));
        assert!(!random.chance(0.5));
        assert!(!random.chance(0.5));
    }
}
