//! Seatsweep load harness.
//!
//! Sweeps one venue's whole inventory through the purchase service with a
//! population of virtual users, then logs the run summary.

use seatsweep::{
    Config, HttpTicketingClient, LoadTest, RunError, SeatQueue, YamlVenueLoader,
    metrics::register_loadtest_metrics,
};
use seatsweep_core::environment::ThreadRandom;
use seatsweep_runtime::metrics::MetricsServer;
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,seatsweep=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting seatsweep load harness");

    // Load configuration
    let config = Config::from_env();
    info!(
        purchase_host = %config.target.purchase_host,
        query_host = %config.target.query_host,
        event_id = %config.target.event_id,
        venue_id = %config.target.venue_id,
        venues_file = %config.venues_file.display(),
        users = config.load.users,
        "Configuration loaded"
    );

    // Optional Prometheus exporter
    let mut metrics_server = config.metrics_addr.map(MetricsServer::new);
    if let Some(server) = metrics_server.as_mut() {
        server.start()?;
        register_loadtest_metrics();
    }

    // Everything that can abort the run happens before any user starts
    let loader = YamlVenueLoader::new(&config.venues_file);
    let prepared = match LoadTest::prepare(&config, &loader, Arc::new(SeatQueue::new())) {
        Ok(prepared) => prepared,
        Err(fatal) => {
            error!(error = %fatal, "FATAL: run aborted before any virtual user started");
            return Err(fatal.into());
        },
    };

    let client = HttpTicketingClient::new(
        &config.target.purchase_host,
        &config.target.query_host,
        config.load.request_timeout(),
    )
    .map_err(|e| RunError::Client(e.to_string()))?;

    // Operator interrupt drains users at their next wait
    let shutdown = prepared.shutdown();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping virtual users");
            shutdown.trigger();
        }
    });

    let summary = prepared.run(Arc::new(client), Arc::new(ThreadRandom)).await?;

    if summary.is_exhaustive() {
        info!(
            created = summary.purchases_created,
            failed = summary.purchases_failed,
            elapsed_ms = summary.elapsed().num_milliseconds(),
            "Every seat attempted exactly once"
        );
    } else {
        warn!(
            seats_remaining = summary.seats_remaining,
            "Run ended before the inventory was exhausted"
        );
    }
    if let Ok(json) = serde_json::to_string(&summary) {
        info!(summary = %json, "Run summary");
    }
    if let Some(scrape) = metrics_server.as_ref().and_then(MetricsServer::render) {
        debug!(metrics = %scrape, "Final metrics scrape");
    }

    Ok(())
}
