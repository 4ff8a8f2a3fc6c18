//! Reducer for one virtual user.

use crate::metrics;
use crate::types::{PurchaseRequest, PurchaseResult, Seat, TicketId, VerificationResult};
use crate::user::{UserAction, UserEnvironment, UserPhase, UserState};
use seatsweep_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use std::time::Instant;

/// Acquire a seat, buy it, maybe verify it, wait, repeat until the queue is
/// empty.
///
/// A failed purchase is never retried: the seat was taken from the queue
/// once and is forfeited.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualUserReducer;

impl VirtualUserReducer {
    /// Create a new virtual user reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn tick(state: &mut UserState, env: &UserEnvironment) -> SmallVec<[Effect<UserAction>; 4]> {
        if state.phase.is_stopped() {
            return SmallVec::new();
        }
        if state.phase.is_in_flight() {
            tracing::warn!(
                user_id = state.user_id,
                phase = %state.phase,
                "Tick while a request is in flight, ignoring"
            );
            return SmallVec::new();
        }

        state.counters.iterations += 1;

        let Some(seat) = env.queue().try_take() else {
            state.phase = UserPhase::Stopped;
            env.stats().record_user_stopped();
            metrics::record_user_stopped();
            tracing::debug!(
                user_id = state.user_id,
                attempts = state.counters.attempts,
                purchased = state.counters.purchased,
                "Seat queue empty, user stopped"
            );
            return SmallVec::new();
        };

        state.counters.attempts += 1;
        env.stats().record_attempt();
        state.phase = UserPhase::Purchasing { seat: seat.clone() };

        smallvec![Self::purchase_effect(seat, env)]
    }

    fn purchase_completed(
        state: &mut UserState,
        result: PurchaseResult,
        env: &UserEnvironment,
    ) -> SmallVec<[Effect<UserAction>; 4]> {
        if !matches!(state.phase, UserPhase::Purchasing { .. }) {
            tracing::warn!(user_id = state.user_id, phase = %state.phase, "Unexpected purchase result, ignoring");
            return SmallVec::new();
        }

        env.stats().record_purchase(&result);

        match result {
            PurchaseResult::Success { seat, ticket_id } => {
                state.counters.purchased += 1;
                tracing::trace!(user_id = state.user_id, %seat, ?ticket_id, "Purchase created");

                // Without an id there is nothing to read back
                if let Some(ticket_id) = ticket_id {
                    if env.random().chance(env.settings().verify_probability) {
                        state.counters.verifications += 1;
                        env.stats().record_verification_issued();
                        state.phase = UserPhase::Verifying {
                            ticket_id: ticket_id.clone(),
                        };
                        return smallvec![Self::verify_effect(ticket_id, env)];
                    }
                    state.phase = UserPhase::Purchased {
                        seat,
                        ticket_id: Some(ticket_id),
                    };
                } else {
                    state.phase = UserPhase::Purchased {
                        seat,
                        ticket_id: None,
                    };
                }
            },
            PurchaseResult::Failure { seat, status_code } => {
                state.counters.failed += 1;
                tracing::warn!(
                    user_id = state.user_id,
                    %seat,
                    ?status_code,
                    "Purchase failed, seat forfeited"
                );
                state.phase = UserPhase::Failed { seat, status_code };
            },
        }

        smallvec![Self::wait(env)]
    }

    fn verification_completed(
        state: &mut UserState,
        ticket_id: &TicketId,
        result: VerificationResult,
        env: &UserEnvironment,
    ) -> SmallVec<[Effect<UserAction>; 4]> {
        if !matches!(&state.phase, UserPhase::Verifying { ticket_id: pending } if pending == ticket_id)
        {
            tracing::warn!(user_id = state.user_id, %ticket_id, "Unexpected verification result, ignoring");
            return SmallVec::new();
        }

        env.stats().record_verification(&result);
        if !result.is_confirmed() {
            state.counters.verifications_failed += 1;
            tracing::warn!(user_id = state.user_id, %ticket_id, ?result, "Verification failed");
        }

        state.phase = UserPhase::Waiting;
        smallvec![Self::wait(env)]
    }

    fn purchase_effect(seat: Seat, env: &UserEnvironment) -> Effect<UserAction> {
        let client = env.client();
        let settings = env.settings();
        let request = PurchaseRequest::new(settings.event_id.clone(), settings.venue_id.clone(), seat);

        Effect::Future(Box::pin(async move {
            let started = Instant::now();
            let result = client.purchase(request).await;
            let elapsed = started.elapsed().as_secs_f64();

            if result.is_success() {
                metrics::record_purchase_created(elapsed);
            } else {
                metrics::record_purchase_failed(elapsed);
            }
            Some(UserAction::PurchaseCompleted(result))
        }))
    }

    fn verify_effect(ticket_id: TicketId, env: &UserEnvironment) -> Effect<UserAction> {
        let client = env.client();

        Effect::Future(Box::pin(async move {
            let result = client.verify(ticket_id.clone()).await;
            metrics::record_verification(result.is_confirmed());
            Some(UserAction::VerificationCompleted { ticket_id, result })
        }))
    }

    fn wait(env: &UserEnvironment) -> Effect<UserAction> {
        Effect::Delay {
            duration: env.settings().wait_time,
            action: Box::new(UserAction::Tick),
        }
    }
}

impl Reducer for VirtualUserReducer {
    type State = UserState;
    type Action = UserAction;
    type Environment = UserEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            UserAction::Tick => Self::tick(state, env),
            UserAction::PurchaseCompleted(result) => Self::purchase_completed(state, result, env),
            UserAction::VerificationCompleted { ticket_id, result } => {
                Self::verification_completed(state, &ticket_id, result, env)
            },
        }
    }
}
