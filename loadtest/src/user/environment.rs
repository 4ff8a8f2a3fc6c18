//! Environment for the virtual user reducer.

use crate::client::TicketingClient;
use crate::config::Config;
use crate::queue::SeatQueue;
use crate::stats::RunStats;
use crate::types::{EventId, VenueId};
use seatsweep_core::environment::RandomSource;
use std::sync::Arc;
use std::time::Duration;

/// Per-run constants every user shares.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    /// Event every purchase targets
    pub event_id: EventId,
    /// Venue every purchase targets
    pub venue_id: VenueId,
    /// Fixed wait between iterations
    pub wait_time: Duration,
    /// Probability that a created purchase is verified
    pub verify_probability: f64,
}

impl UserSettings {
    /// Settings taken from the run configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            event_id: config.target.event_id.clone(),
            venue_id: config.target.venue_id.clone(),
            wait_time: config.load.wait_time(),
            verify_probability: config.load.verify_probability,
        }
    }
}

/// Dependencies injected into every virtual user.
///
/// Cloning is cheap: the queue, client, random source and statistics are
/// shared by all users of a run.
#[derive(Clone)]
pub struct UserEnvironment {
    queue: Arc<SeatQueue>,
    client: Arc<dyn TicketingClient>,
    random: Arc<dyn RandomSource>,
    stats: Arc<RunStats>,
    settings: UserSettings,
}

impl UserEnvironment {
    /// Assemble an environment
    #[must_use]
    pub fn new(
        queue: Arc<SeatQueue>,
        client: Arc<dyn TicketingClient>,
        random: Arc<dyn RandomSource>,
        stats: Arc<RunStats>,
        settings: UserSettings,
    ) -> Self {
        Self {
            queue,
            client,
            random,
            stats,
            settings,
        }
    }

    /// Shared seat queue
    #[must_use]
    pub fn queue(&self) -> &SeatQueue {
        &self.queue
    }

    /// Ticketing client, shareable into effects
    #[must_use]
    pub fn client(&self) -> Arc<dyn TicketingClient> {
        Arc::clone(&self.client)
    }

    /// Source for the verification draw
    #[must_use]
    pub fn random(&self) -> &dyn RandomSource {
        self.random.as_ref()
    }

    /// Run-wide statistics
    #[must_use]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Per-run constants
    #[must_use]
    pub const fn settings(&self) -> &UserSettings {
        &self.settings
    }
}
