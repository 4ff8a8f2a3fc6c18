//! Virtual user state machine.
//!
//! One virtual user is one [`Store`](seatsweep_runtime::Store) driving the
//! [`VirtualUserReducer`]:
//!
//! ```text
//! Idle ──Tick──▶ Purchasing{seat} ──201──▶ Purchased ──p──▶ Verifying ──▶ Waiting
//!   │                 │                       │                              │
//!   │                 └──other──▶ Failed      └──1-p── (wait) ◀──────────────┘
//!   │                               │                   │
//!   └──────── queue empty ◀──Tick───┴───────────────────┘──▶ Stopped
//! ```
//!
//! Every iteration ends in a fixed wait followed by a `Tick`. A `Tick` that
//! finds the seat queue empty stops the user for good; since the store runs
//! effects inline, `store.send(UserAction::Tick)` returns exactly then.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod types;

pub use actions::UserAction;
pub use environment::{UserEnvironment, UserSettings};
pub use reducer::VirtualUserReducer;
pub use types::{UserCounters, UserPhase, UserState};

use seatsweep_runtime::Store;

/// Store running one virtual user
pub type UserStore = Store<UserState, UserAction, UserEnvironment, VirtualUserReducer>;
