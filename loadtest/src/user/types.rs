//! State types for one virtual user.

use crate::types::{Seat, TicketId};
use std::fmt;

/// Where a virtual user is in its loop.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserPhase {
    /// Started, first `Tick` not yet processed
    #[default]
    Idle,

    /// Purchase request in flight
    Purchasing {
        /// Seat taken from the queue this iteration
        seat: Seat,
    },

    /// Purchase created and not sampled for verification; waiting for the next tick
    Purchased {
        /// Seat that was bought
        seat: Seat,
        /// Ticket id, if the response carried one
        ticket_id: Option<TicketId>,
    },

    /// Verification read in flight
    Verifying {
        /// Ticket being read back
        ticket_id: TicketId,
    },

    /// Purchase not created; the seat is forfeited. Waiting for the next tick
    Failed {
        /// Seat that could not be bought
        seat: Seat,
        /// HTTP status, `None` when no response arrived
        status_code: Option<u16>,
    },

    /// Verification done; waiting for the next tick
    Waiting,

    /// The seat queue was empty. Terminal
    Stopped,
}

impl UserPhase {
    /// Whether the user has stopped for good
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Whether a network call is outstanding
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Purchasing { .. } | Self::Verifying { .. })
    }

    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Purchasing { .. } => "purchasing",
            Self::Purchased { .. } => "purchased",
            Self::Verifying { .. } => "verifying",
            Self::Failed { .. } => "failed",
            Self::Waiting => "waiting",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for UserPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What one user has done so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserCounters {
    /// Ticks processed while not stopped, including the final one
    pub iterations: u64,
    /// Purchase requests sent
    pub attempts: u64,
    /// Purchases created
    pub purchased: u64,
    /// Purchases not created
    pub failed: u64,
    /// Verification reads sent
    pub verifications: u64,
    /// Verification reads that did not succeed
    pub verifications_failed: u64,
}

/// State of one virtual user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserState {
    /// Index of the user within the run, for logs
    pub user_id: usize,
    /// Current phase
    pub phase: UserPhase,
    /// Running totals
    pub counters: UserCounters,
}

impl UserState {
    /// Fresh user
    #[must_use]
    pub fn new(user_id: usize) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }
}
