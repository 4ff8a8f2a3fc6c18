//! Run lifecycle.
//!
//! [`LoadTest::prepare`] does everything that can fail: validate the
//! configuration, load the layout, refuse an empty venue, seed the queue.
//! Only a successful [`PreparedRun`] can start virtual users, so a fatal
//! error can never leave a partial load behind.
//!
//! Completion is emergent: [`PreparedRun::run`] just waits until every user
//! has found the queue empty.

use crate::client::TicketingClient;
use crate::config::Config;
use crate::error::{RunError, RunResult};
use crate::inventory::generate_seats;
use crate::queue::SeatQueue;
use crate::stats::{RunStats, RunSummary};
use crate::types::VenueLayout;
use crate::user::{
    UserAction, UserEnvironment, UserSettings, UserState, UserStore, VirtualUserReducer,
};
use crate::venue::VenueLayoutLoader;
use seatsweep_core::environment::{Clock, RandomSource, SystemClock};
use seatsweep_runtime::Shutdown;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Entry point of a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadTest;

impl LoadTest {
    /// Validate, load, check and seed.
    ///
    /// The queue must be fresh; it is populated exactly once here, before any
    /// user exists.
    ///
    /// # Errors
    ///
    /// - [`RunError::Config`] if the configuration is invalid
    /// - [`RunError::Layout`] if the layout cannot be loaded
    /// - [`RunError::EmptyLayout`] if the venue has zero zones
    /// - [`RunError::Queue`] if the queue was already populated
    pub fn prepare(
        config: &Config,
        loader: &dyn VenueLayoutLoader,
        queue: Arc<SeatQueue>,
    ) -> RunResult<PreparedRun> {
        config.validate()?;

        let venue_id = &config.target.venue_id;
        let layout = loader.load(venue_id)?;

        if layout.zone_count == 0 {
            return Err(RunError::EmptyLayout {
                venue_id: venue_id.to_string(),
            });
        }
        if layout.is_empty() {
            tracing::warn!(
                venue_id = %venue_id,
                %layout,
                "Venue has zones but no seats; every user will stop on its first iteration"
            );
        }

        let seeded = queue.populate(generate_seats(layout))?;
        tracing::info!(
            venue_id = %venue_id,
            event_id = %config.target.event_id,
            %layout,
            seeded,
            "Seat inventory prepared"
        );

        Ok(PreparedRun {
            layout,
            seeded,
            queue,
            settings: UserSettings::from_config(config),
            users: config.load.users,
            spawn_rate: config.load.spawn_rate,
            stats: Arc::new(RunStats::new()),
            shutdown: Shutdown::new(),
            clock: Arc::new(SystemClock),
        })
    }
}

/// A seeded run, ready to start its virtual users.
pub struct PreparedRun {
    layout: VenueLayout,
    seeded: usize,
    queue: Arc<SeatQueue>,
    settings: UserSettings,
    users: usize,
    spawn_rate: u32,
    stats: Arc<RunStats>,
    shutdown: Shutdown,
    clock: Arc<dyn Clock>,
}

impl PreparedRun {
    /// Layout the queue was seeded from
    #[must_use]
    pub const fn layout(&self) -> VenueLayout {
        self.layout
    }

    /// Seats in the queue at start
    #[must_use]
    pub const fn seeded(&self) -> usize {
        self.seeded
    }

    /// Signal that stops every user of this run at its next wait
    #[must_use]
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Override the population size
    #[must_use]
    pub fn with_users(mut self, users: usize) -> Self {
        self.users = users;
        self
    }

    /// Override the spawn rate (users per second, 0 for all at once)
    #[must_use]
    pub fn with_spawn_rate(mut self, spawn_rate: u32) -> Self {
        self.spawn_rate = spawn_rate;
        self
    }

    /// Clock that stamps the start and end of the run
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start the users and wait until all of them have stopped.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Join`] if a user task panics.
    pub async fn run(
        self,
        client: Arc<dyn TicketingClient>,
        random: Arc<dyn RandomSource>,
    ) -> RunResult<RunSummary> {
        let interval = spawn_interval(self.spawn_rate);
        tracing::info!(
            users = self.users,
            spawn_rate = self.spawn_rate,
            wait_time = ?self.settings.wait_time,
            "Starting virtual users"
        );

        let started_at = self.clock.now();
        let env = UserEnvironment::new(
            Arc::clone(&self.queue),
            client,
            random,
            Arc::clone(&self.stats),
            self.settings.clone(),
        );

        let mut users = JoinSet::new();
        for user_id in 0..self.users {
            if user_id > 0 {
                if let Some(interval) = interval {
                    tokio::select! {
                        () = tokio::time::sleep(interval) => {},
                        () = self.shutdown.triggered() => {},
                    }
                }
            }
            if self.shutdown.is_triggered() {
                tracing::info!(started = user_id, "Shutdown before all users started");
                break;
            }

            let store = UserStore::new(UserState::new(user_id), VirtualUserReducer::new(), env.clone())
                .with_shutdown(self.shutdown.clone());
            users.spawn(async move {
                if let Err(error) = store.send(UserAction::Tick).await {
                    tracing::debug!(user_id, %error, "Virtual user not started");
                }
                store.state(|s| (s.user_id, s.counters)).await
            });
        }

        while let Some(joined) = users.join_next().await {
            let (user_id, counters) = joined?;
            tracing::trace!(user_id, ?counters, "Virtual user finished");
        }

        let summary = RunSummary {
            seats_seeded: u64::try_from(self.seeded).unwrap_or(u64::MAX),
            seats_remaining: u64::try_from(self.queue.remaining()).unwrap_or(u64::MAX),
            started_at,
            finished_at: self.clock.now(),
            ..self.stats.snapshot()
        };
        tracing::info!(%summary, "Run complete");
        Ok(summary)
    }
}

/// Gap between two user starts; `None` starts everyone at once
fn spawn_interval(spawn_rate: u32) -> Option<Duration> {
    (spawn_rate > 0).then(|| Duration::from_secs(1) / spawn_rate)
}
