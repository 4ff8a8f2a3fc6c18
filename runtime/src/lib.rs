//! # Seatsweep Runtime
//!
//! Runtime implementation for seatsweep reducers.
//!
//! This crate provides the Store that coordinates reducer execution and effect
//! handling for a single virtual user.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, runs the reducer, executes effects
//! - **Feedback Loop**: Actions produced by effects are fed back to the reducer
//!   until no effect is pending
//! - **Shutdown**: A shared signal that stops feedback across many stores
//!
//! ## Example
//!
//! ```ignore
//! use seatsweep_runtime::Store;
//!
//! let store = Store::new(UserState::default(), VirtualUserReducer::new(), env);
//!
//! // Runs the user until its reducer stops producing effects
//! store.send(UserAction::Tick).await?;
//!
//! let attempts = store.state(|s| s.counters.attempts).await;
//! ```

use seatsweep_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Prometheus metrics for observability
pub mod metrics;

pub use store::Store;
pub use shutdown::Shutdown;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown was triggered.
        #[error("Store is shutting down")]
        ShutdownInProgress,
    }
}

/// Shutdown signalling shared between stores
pub mod shutdown {
    use std::sync::Arc;
    use tokio::sync::watch;

    /// One-way shutdown signal.
    ///
    /// Clones observe the same signal, so a single [`Shutdown::trigger`] stops
    /// every store built with [`Store::with_shutdown`](crate::Store::with_shutdown).
    /// Once triggered it stays triggered.
    #[derive(Debug, Clone)]
    pub struct Shutdown {
        tx: Arc<watch::Sender<bool>>,
    }

    impl Shutdown {
        /// Create a new, untriggered signal.
        #[must_use]
        pub fn new() -> Self {
            let (tx, _rx) = watch::channel(false);
            Self { tx: Arc::new(tx) }
        }

        /// Trigger the signal. Idempotent.
        pub fn trigger(&self) {
            let previous = self.tx.send_replace(true);
            if !previous {
                tracing::info!("Shutdown triggered");
            }
        }

        /// Whether the signal has been triggered.
        #[must_use]
        pub fn is_triggered(&self) -> bool {
            *self.tx.borrow()
        }

        /// Resolve once the signal is triggered.
        pub async fn triggered(&self) {
            let mut rx = self.tx.subscribe();
            // The sender lives in `self`, so the channel cannot close while we wait.
            let _ = rx.wait_for(|triggered| *triggered).await;
        }
    }

    impl Default for Shutdown {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Store module - the runtime for one reducer instance
pub mod store {
    use super::{Arc, Effect, Reducer, RwLock};
    use crate::error::StoreError;
    use crate::shutdown::Shutdown;
    use std::collections::VecDeque;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` so observers can read while the loop runs)
    /// 2. Reducer (state machine logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Effects are executed inline by the task that called [`Store::send`].
    /// A virtual user is one task driving one store, so its iterations never
    /// overlap: the next action is only reduced once the effects of the
    /// previous one have produced it.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Shutdown,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync,
        A: Send + std::fmt::Debug,
        S: Send + Sync,
        E: Send + Sync,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The store gets its own shutdown signal; use [`Store::with_shutdown`]
        /// to share one across stores.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Shutdown::new(),
            }
        }

        /// Replace the shutdown signal with a shared one
        #[must_use]
        pub fn with_shutdown(mut self, shutdown: Shutdown) -> Self {
            self.shutdown = shutdown;
            self
        }

        /// Trigger this store's shutdown signal
        ///
        /// Pending delays are cut short and no further actions are reduced.
        /// Effects already awaiting a network call finish, but their resulting
        /// actions are dropped.
        pub fn shutdown(&self) {
            self.shutdown.trigger();
        }

        /// Whether the shutdown signal has been triggered
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.is_triggered()
        }

        /// Send an action and run the feedback loop to completion
        ///
        /// The action is reduced, the returned effects are executed, and every
        /// action they produce is reduced in turn (FIFO) until the reducer
        /// returns no more work or shutdown is triggered.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if shutdown was triggered
        /// before the action was accepted.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            if self.shutdown.is_triggered() {
                return Err(StoreError::ShutdownInProgress);
            }

            let mut pending = VecDeque::from([action]);

            while let Some(action) = pending.pop_front() {
                if self.shutdown.is_triggered() {
                    tracing::debug!(
                        dropped = pending.len() + 1,
                        "Shutdown triggered, dropping pending actions"
                    );
                    break;
                }

                tracing::trace!(?action, "Reducing action");
                let effects = {
                    let mut state = self.state.write().await;
                    self.reducer.reduce(&mut state, action, &self.environment)
                };
                metrics::counter!("store.actions.processed").increment(1);

                for effect in effects {
                    pending.extend(self.execute_effect(effect).await);
                }
            }

            Ok(())
        }

        /// Read state via a closure
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Execute one effect and return the action it produces, if any
        ///
        /// - `None`: No-op
        /// - `Future`: Awaits the computation, yields its action if `Some`
        /// - `Delay`: Sleeps, then yields the action (cut short by shutdown)
        async fn execute_effect(&self, effect: Effect<A>) -> Option<A> {
            metrics::counter!("store.effects.executed", "type" => effect.kind()).increment(1);

            match effect {
                Effect::None => None,
                Effect::Future(fut) => fut.await,
                Effect::Delay { duration, action } => {
                    tracing::trace!(?duration, "Executing Effect::Delay");
                    tokio::select! {
                        () = tokio::time::sleep(duration) => Some(*action),
                        () = self.shutdown.triggered() => None,
                    }
                },
            }
        }
    }
}
