//! Seatsweep - full-inventory ticket purchase load harness
//!
//! Drives many concurrent virtual users against a ticket purchase service so
//! that every seat of one venue is attempted by exactly one user, and a
//! sampled fraction of successful purchases is read back from the query
//! service.
//!
//! # Architecture
//!
//! ```text
//!  venues.yml ──▶ VenueLayoutLoader ──▶ generate_seats ──▶ SeatQueue (seeded once)
//!                                                              │ try_take
//!                        ┌─────────────────────────────────────┼──────────────┐
//!                        ▼                                     ▼              ▼
//!                  UserStore #0                          UserStore #1   ... UserStore #N
//!                  VirtualUserReducer ── TicketingClient ──▶ purchase / query services
//! ```
//!
//! # Key Properties
//!
//! - **Exactly once**: the seat queue hands every seat to exactly one
//!   `try_take`, however many users race for it.
//! - **No retry**: a failed purchase forfeits its seat for the rest of the run.
//! - **Fatal errors first**: configuration and layout problems abort the run
//!   in [`LoadTest::prepare`], before any user exists.
//! - **Self-terminating users**: a user that finds the queue empty stops; the
//!   run ends when all of them have.
//!
//! # Example
//!
//! ```ignore
//! use seatsweep::{Config, LoadTest, SeatQueue, YamlVenueLoader, HttpTicketingClient};
//! use seatsweep_core::environment::ThreadRandom;
//! use std::sync::Arc;
//!
//! let config = Config::from_env();
//! let loader = YamlVenueLoader::new(&config.venues_file);
//! let prepared = LoadTest::prepare(&config, &loader, Arc::new(SeatQueue::new()))?;
//!
//! let client = HttpTicketingClient::new(
//!     &config.target.purchase_host,
//!     &config.target.query_host,
//!     config.load.request_timeout(),
//! )?;
//! let summary = prepared.run(Arc::new(client), Arc::new(ThreadRandom)).await?;
//! println!("{summary}");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod metrics;
pub mod queue;
pub mod stats;
pub mod types;
pub mod user;
pub mod venue;

pub use client::{HttpTicketingClient, MockTicketingClient, TicketingClient};
pub use config::Config;
pub use error::{ConfigError, LayoutError, QueueError, RunError, RunResult};
pub use inventory::{generate_seats, SeatInventory};
pub use lifecycle::{LoadTest, PreparedRun};
pub use queue::SeatQueue;
pub use stats::{RunStats, RunSummary};
pub use types::*;
pub use user::{UserAction, UserPhase, UserState, UserStore, VirtualUserReducer};
pub use venue::{VenueLayoutLoader, YamlVenueLoader};
