//! # Seatsweep Core
//!
//! Core traits and types shared by every part of the seatsweep load harness.
//!
//! A virtual user is modelled as a reducer: a pure state machine that turns
//! `(State, Action, Environment)` into a new state plus a list of effect
//! descriptions. The runtime executes the effects (HTTP calls, waits) and feeds
//! the resulting actions back in.
//!
//! ## Core Concepts
//!
//! - **State**: What one virtual user currently holds (seat, ticket, counters)
//! - **Action**: Every input to the reducer (scheduler ticks, completed calls)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits (clock, randomness, clients)
//!
//! ## Example
//!
//! ```ignore
//! use seatsweep_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         state.count += 1;
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, TimeDelta, Utc};
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for state machine logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all decision logic and are deterministic given a deterministic
/// environment, which makes them testable without a network.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state machine logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Inspects the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most transitions produce one or two effects, so the return type keeps
        /// up to four inline without allocating.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution), so a reducer test can inspect them.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should
    /// happen, returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Delayed action (inter-iteration pacing)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation (network calls)
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Short label used for logging and metrics
        #[must_use]
        pub const fn kind(&self) -> &'static str {
            match self {
                Effect::None => "none",
                Effect::Delay { .. } => "delay",
                Effect::Future(_) => "future",
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All sources of nondeterminism a reducer needs (time, randomness) are
/// abstracted behind traits and injected via the Environment parameter.
/// Production uses the implementations here; tests use the fixed and seeded
/// versions from `seatsweep-testing`.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock used outside tests.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of uniform random numbers.
    ///
    /// Kept behind a trait so sampling decisions (such as whether a purchase is
    /// followed by a verification read) can be driven by a seeded or scripted
    /// source in tests.
    pub trait RandomSource: Send + Sync {
        /// Next sample, uniformly distributed in `[0, 1)`.
        fn next_f64(&self) -> f64;

        /// Bernoulli trial: `true` with the given probability.
        ///
        /// Probabilities at or below 0 never fire, at or above 1 always fire.
        fn chance(&self, probability: f64) -> bool {
            self.next_f64() < probability
        }
    }

    /// Thread-local `rand` generator.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ThreadRandom;

    impl RandomSource for ThreadRandom {
        fn next_f64(&self) -> f64 {
            rand::random::<f64>()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, RandomSource, SystemClock, ThreadRandom};
    use std::time::Duration;

    #[test]
    fn effect_debug_hides_futures() {
        let effect: Effect<u8> = Effect::Future(Box::pin(async { Some(1) }));
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }

    #[test]
    fn effect_kind_labels() {
        let delay: Effect<u8> = Effect::Delay {
            duration: Duration::from_millis(5),
            action: Box::new(3),
        };
        assert_eq!(delay.kind(), "delay");
        assert_eq!(Effect::<u8>::None.kind(), "none");
    }

    #[test]
    fn thread_random_stays_in_unit_interval() {
        let random = ThreadRandom;
        for _ in 0..1_000 {
            let sample = random.next_f64();
            assert!((0.0..1.0).contains(&sample));
        }
    }

    #[test]
    fn chance_respects_bounds() {
        let random = ThreadRandom;
        assert!((0..100).all(|_| !random.chance(0.0)));
        assert!((0..100).all(|_| random.chance(1.0)));
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn future_effect_resolves() {
        let effect: Effect<u8> = Effect::Future(Box::pin(async { Some(7) }));
        if let Effect::Future(fut) = effect {
            assert_eq!(tokio_test::block_on(fut), Some(7));
        }
    }
}
