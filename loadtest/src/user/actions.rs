//! Actions for the virtual user reducer.

use crate::types::{PurchaseResult, TicketId, VerificationResult};

/// Everything a virtual user reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Start the next iteration
    ///
    /// Sent once to start the user, then scheduled by the reducer itself after
    /// every iteration's wait.
    Tick,

    /// The purchase request of the current iteration returned
    PurchaseCompleted(PurchaseResult),

    /// The verification read of the current iteration returned
    VerificationCompleted {
        /// Ticket that was read
        ticket_id: TicketId,
        /// Observed outcome
        result: VerificationResult,
    },
}
