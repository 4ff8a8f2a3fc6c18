//! Ticketing service client.
//!
//! The virtual user reducer only sees the [`TicketingClient`] trait. The
//! production implementation talks HTTP to the purchase and query services;
//! tests inject in-memory implementations.

use crate::types::{PurchaseRequest, PurchaseResult, Seat, TicketId, VerificationResult};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Boxed future returned by client calls
pub type ClientFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Ticketing service trait
///
/// Calls never fail at the type level: every outcome, including transport
/// errors, is folded into the result value so that it can be counted.
pub trait TicketingClient: Send + Sync {
    /// Attempt to buy one seat
    fn purchase(&self, request: PurchaseRequest) -> ClientFuture<PurchaseResult>;

    /// Read back a purchased ticket
    fn verify(&self, ticket_id: TicketId) -> ClientFuture<VerificationResult>;
}

/// HTTP client for the purchase and query services.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTicketingClient {
    http: reqwest::Client,
    purchase_url: String,
    query_base: String,
}

impl HttpTicketingClient {
    /// Purchase endpoint, relative to the purchase service base address
    pub const PURCHASE_PATH: &'static str = "/purchase/api/v1/tickets";

    /// Ticket read endpoint, relative to the query service base address
    pub const QUERY_PATH: &'static str = "/query/api/v1/tickets";

    /// Build a client for the two base addresses.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the HTTP client cannot be constructed
    /// (for example when the TLS backend fails to initialise).
    pub fn new(
        purchase_host: &str,
        query_host: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            purchase_url: format!(
                "{}{}",
                purchase_host.trim_end_matches('/'),
                Self::PURCHASE_PATH
            ),
            query_base: format!("{}{}", query_host.trim_end_matches('/'), Self::QUERY_PATH),
        })
    }

    /// Full purchase URL
    #[must_use]
    pub fn purchase_url(&self) -> &str {
        &self.purchase_url
    }

    /// Full read URL for one ticket
    #[must_use]
    pub fn ticket_url(&self, ticket_id: &TicketId) -> String {
        format!("{}/{}", self.query_base, ticket_id)
    }
}

impl TicketingClient for HttpTicketingClient {
    fn purchase(&self, request: PurchaseRequest) -> ClientFuture<PurchaseResult> {
        let http = self.http.clone();
        let url = self.purchase_url.clone();

        Box::pin(async move {
            let seat = request.seat.clone();
            match http.post(&url).json(&request).send().await {
                Ok(response) if response.status() == StatusCode::CREATED => {
                    let ticket_id = response
                        .json::<PurchaseResponse>()
                        .await
                        .ok()
                        .and_then(PurchaseResponse::into_ticket_id);
                    PurchaseResult::Success { seat, ticket_id }
                },
                Ok(response) => PurchaseResult::Failure {
                    seat,
                    status_code: Some(response.status().as_u16()),
                },
                Err(error) => {
                    tracing::debug!(%seat, %error, "Purchase request failed without a response");
                    PurchaseResult::Failure {
                        seat,
                        status_code: None,
                    }
                },
            }
        })
    }

    fn verify(&self, ticket_id: TicketId) -> ClientFuture<VerificationResult> {
        let http = self.http.clone();
        let url = self.ticket_url(&ticket_id);

        Box::pin(async move {
            match http.get(&url).send().await {
                Ok(response) if response.status().is_success() => VerificationResult::Confirmed {
                    status_code: response.status().as_u16(),
                },
                Ok(response) => VerificationResult::Failed {
                    status_code: Some(response.status().as_u16()),
                },
                Err(error) => {
                    tracing::debug!(%ticket_id, %error, "Verification request failed without a response");
                    VerificationResult::Failed { status_code: None }
                },
            }
        })
    }
}

/// In-memory ticketing service for development and testing.
///
/// Creates every purchase unless the seat was registered as failing, hands
/// out sequential ticket ids, and remembers every call it received.
#[derive(Debug, Default)]
pub struct MockTicketingClient {
    failing: HashMap<Seat, u16>,
    omit_ticket_ids: bool,
    verify_status: Option<u16>,
    latency: Duration,
    next_ticket: AtomicU64,
    purchases: Mutex<Vec<Seat>>,
    verifications: Mutex<Vec<TicketId>>,
}

impl MockTicketingClient {
    /// Mock that creates every purchase and confirms every verification
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer purchases of `seat` with `status` instead of "created"
    #[must_use]
    pub fn with_failure(mut self, seat: Seat, status: u16) -> Self {
        self.failing.insert(seat, status);
        self
    }

    /// Leave the ticket id out of "created" responses
    #[must_use]
    pub fn without_ticket_ids(mut self) -> Self {
        self.omit_ticket_ids = true;
        self
    }

    /// Answer verifications with `status` (200 by default)
    #[must_use]
    pub fn with_verify_status(mut self, status: u16) -> Self {
        self.verify_status = Some(status);
        self
    }

    /// Delay every answer by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Seats purchased so far, in call order
    #[must_use]
    pub fn purchases(&self) -> Vec<Seat> {
        self.purchases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Tickets verified so far, in call order
    #[must_use]
    pub fn verifications(&self) -> Vec<TicketId> {
        self.verifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TicketingClient for MockTicketingClient {
    fn purchase(&self, request: PurchaseRequest) -> ClientFuture<PurchaseResult> {
        let seat = request.seat;
        self.purchases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(seat.clone());

        let result = match self.failing.get(&seat) {
            Some(&status) => PurchaseResult::Failure {
                seat,
                status_code: Some(status),
            },
            None => {
                let n = self.next_ticket.fetch_add(1, Ordering::Relaxed) + 1;
                PurchaseResult::Success {
                    seat,
                    ticket_id: (!self.omit_ticket_ids).then(|| TicketId::new(format!("ticket-{n}"))),
                }
            },
        };

        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        })
    }

    fn verify(&self, ticket_id: TicketId) -> ClientFuture<VerificationResult> {
        self.verifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ticket_id);

        let status = self.verify_status.unwrap_or(200);
        let result = if (200..300).contains(&status) {
            VerificationResult::Confirmed {
                status_code: status,
            }
        } else {
            VerificationResult::Failed {
                status_code: Some(status),
            }
        };

        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            result
        })
    }
}

/// Body of a "created" purchase response. Only the ticket id is read.
#[derive(Debug, Deserialize)]
struct PurchaseResponse {
    #[serde(rename = "ticketId", default)]
    ticket_id: Option<serde_json::Value>,
}

impl PurchaseResponse {
    /// Accept string or numeric ids
    fn into_ticket_id(self) -> Option<TicketId> {
        match self.ticket_id? {
            serde_json::Value::String(id) if !id.is_empty() => Some(TicketId::new(id)),
            serde_json::Value::Number(id) => Some(TicketId::new(id.to_string())),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_without_double_slashes() {
        let client = HttpTicketingClient::new(
            "http://purchase:8081/",
            "http://query:8082",
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            client.purchase_url(),
            "http://purchase:8081/purchase/api/v1/tickets"
        );
        assert_eq!(
            client.ticket_url(&TicketId::new("T-42")),
            "http://query:8082/query/api/v1/tickets/T-42"
        );
    }

    #[tokio::test]
    async fn mock_fails_registered_seats_and_records_calls() {
        let failing = Seat::new(1, 1, 2);
        let mock = MockTicketingClient::new().with_failure(failing.clone(), 409);
        let request = |seat: Seat| {
            PurchaseRequest::new(
                crate::types::EventId::new("Event1"),
                crate::types::VenueId::new("Venue1"),
                seat,
            )
        };

        let first = mock.purchase(request(Seat::new(1, 1, 1))).await;
        let second = mock.purchase(request(failing.clone())).await;

        assert_eq!(
            first,
            PurchaseResult::Success {
                seat: Seat::new(1, 1, 1),
                ticket_id: Some(TicketId::new("ticket-1")),
            }
        );
        assert_eq!(
            second,
            PurchaseResult::Failure {
                seat: failing.clone(),
                status_code: Some(409),
            }
        );
        assert_eq!(mock.purchases(), vec![Seat::new(1, 1, 1), failing]);
    }

    #[tokio::test]
    async fn mock_verification_status_is_configurable() {
        let mock = MockTicketingClient::new().with_verify_status(404);
        let result = mock.verify(TicketId::new("ticket-9")).await;

        assert_eq!(result, VerificationResult::Failed { status_code: Some(404) });
        assert_eq!(mock.verifications(), vec![TicketId::new("ticket-9")]);
    }

    #[test]
    fn ticket_id_accepts_strings_and_numbers() {
        let parse = |body: &str| {
            serde_json::from_str::<PurchaseResponse>(body)
                .unwrap()
                .into_ticket_id()
        };

        assert_eq!(parse(r#"{"ticketId":"abc"}"#), Some(TicketId::new("abc")));
        assert_eq!(parse(r#"{"ticketId":17}"#), Some(TicketId::new("17")));
        assert_eq!(parse(r#"{"ticketId":""}"#), None);
        assert_eq!(parse(r#"{"ticketId":null}"#), None);
        assert_eq!(parse(r#"{"status":"ok"}"#), None);
    }
}
