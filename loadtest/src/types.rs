//! Domain types for the seat sweep.
//!
//! Identifiers are newtypes over the strings the ticketing services use on the
//! wire. Seats serialize in the purchase endpoint's JSON shape.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the event every purchase in a run targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create from the service's event identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the venue whose inventory is swept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    /// Create from the service's venue identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ticket identifier returned by the purchase service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Create from the identifier in a purchase response
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of inventory.
///
/// Zone is numeric; row and column are carried in their decimal string form,
/// which is what the purchase endpoint expects. Identity is the triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    /// Zone number, starting at 1
    pub zone_id: u32,
    /// Row number as a decimal string, starting at "1"
    pub row: String,
    /// Column number as a decimal string, starting at "1"
    pub column: String,
}

impl Seat {
    /// Build a seat from its 1-based coordinates
    #[must_use]
    pub fn new(zone_id: u32, row: u32, column: u32) -> Self {
        Self {
            zone_id,
            row: row.to_string(),
            column: column.to_string(),
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone {} row {} col {}", self.zone_id, self.row, self.column)
    }
}

/// Dimensions of a venue, read once at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VenueLayout {
    /// Number of zones
    pub zone_count: u32,
    /// Rows per zone
    pub row_count: u32,
    /// Seats per row
    pub col_count: u32,
}

impl VenueLayout {
    /// Create a layout
    #[must_use]
    pub const fn new(zone_count: u32, row_count: u32, col_count: u32) -> Self {
        Self {
            zone_count,
            row_count,
            col_count,
        }
    }

    /// Total number of seats, `zone × row × col`
    #[must_use]
    pub fn capacity(&self) -> u64 {
        u64::from(self.zone_count)
            .saturating_mul(u64::from(self.row_count))
            .saturating_mul(u64::from(self.col_count))
    }

    /// Whether the layout has no seats at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capacity() == 0
    }
}

impl fmt::Display for VenueLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} zones x {} rows x {} cols",
            self.zone_count, self.row_count, self.col_count
        )
    }
}

/// Body of one purchase attempt.
///
/// Serializes as `{"eventId","venueId","zoneId","row","column"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Fixed event for the run
    pub event_id: EventId,
    /// Fixed venue for the run
    pub venue_id: VenueId,
    /// Seat being bought
    #[serde(flatten)]
    pub seat: Seat,
}

impl PurchaseRequest {
    /// Build the request for one seat
    #[must_use]
    pub const fn new(event_id: EventId, venue_id: VenueId, seat: Seat) -> Self {
        Self {
            event_id,
            venue_id,
            seat,
        }
    }
}

/// Outcome of one purchase attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseResult {
    /// The service answered "created".
    Success {
        /// Seat that was bought
        seat: Seat,
        /// Ticket id from the response body, if the body carried one
        ticket_id: Option<TicketId>,
    },
    /// Anything else. The seat is forfeited for the rest of the run.
    Failure {
        /// Seat that could not be bought
        seat: Seat,
        /// HTTP status, or `None` when no response arrived (timeout, connection error)
        status_code: Option<u16>,
    },
}

impl PurchaseResult {
    /// Whether the purchase succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The seat this attempt was for
    #[must_use]
    pub const fn seat(&self) -> &Seat {
        match self {
            Self::Success { seat, .. } | Self::Failure { seat, .. } => seat,
        }
    }
}

/// Outcome of a verification read. Observed only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    /// The query service returned a 2xx
    Confirmed {
        /// HTTP status
        status_code: u16,
    },
    /// Non-2xx, or no response at all
    Failed {
        /// HTTP status, `None` when no response arrived
        status_code: Option<u16>,
    },
}

impl VerificationResult {
    /// Whether the read succeeded
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}
