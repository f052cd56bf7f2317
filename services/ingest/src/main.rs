mod dispatch;
mod events;
mod hubspot;
mod orchestrator;
mod sink;
#[cfg(test)]
mod testutil;

use std::sync::Arc;

use relay_config::{init_tracing, AppConfig};
use relay_store::JsonFileStore;

use crate::hubspot::client::{HubspotClient, HubspotClientConfig};
use crate::orchestrator::Orchestrator;
use crate::sink::HttpEventSink;

#[tokio::main]
async fn main() {
    init_tracing("info");
    let _ = dotenvy::dotenv();

    tracing::info!(service = "relay-ingest", "starting");

    let config = AppConfig::from_env().expect("failed to load config");

    let Some(hubspot_config) = HubspotClientConfig::from_env() else {
        tracing::info!("no hubspot credentials found, nothing to sync");
        return;
    };

    tracing::info!(
        base_url = %hubspot_config.base_url,
        max_retries = hubspot_config.max_retries,
        "hubspot connector configured, starting sync"
    );

    let client = HubspotClient::new(hubspot_config).expect("failed to create hubspot client");
    let sink = HttpEventSink::new(config.sink_url.clone()).expect("failed to create event sink");
    let store = JsonFileStore::new(&config.accounts_path);

    let orchestrator = Orchestrator::new(client, store, Arc::new(sink));

    match orchestrator.run().await {
        Ok(reports) => {
            for report in &reports {
                for stage in report.failed_stages() {
                    tracing::warn!(
                        hub_id = %report.hub_id,
                        operation = stage.operation,
                        error = stage.error.as_deref().unwrap_or(""),
                        "stage did not complete"
                    );
                }
            }
            tracing::info!(accounts = reports.len(), "ingest finished");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load accounts");
        }
    }
}
