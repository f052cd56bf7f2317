use std::sync::Arc;

use chrono::Utc;

use relay_common::error::RelayResult;
use relay_store::{Account, AccountStore};

use crate::dispatch::BatchDispatcher;
use crate::hubspot::client::{Credentials, HubspotClient};
use crate::hubspot::{companies, contacts, meetings};
use crate::sink::EventSink;

/// Result of one orchestrator stage. Failures are carried as data; the
/// orchestrator never lets a stage error abort the stages after it.
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub operation: &'static str,
    pub error: Option<String>,
}

impl StageOutcome {
    fn ok(operation: &'static str) -> Self {
        Self {
            operation,
            error: None,
        }
    }

    fn failed(operation: &'static str, error: impl ToString) -> Self {
        Self {
            operation,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug)]
pub struct AccountReport {
    pub hub_id: String,
    pub stages: Vec<StageOutcome>,
}

impl AccountReport {
    pub fn failed_stages(&self) -> impl Iterator<Item = &StageOutcome> + '_ {
        self.stages.iter().filter(|s| !s.is_ok())
    }
}

pub struct Orchestrator<S> {
    client: HubspotClient,
    store: S,
    sink: Arc<dyn EventSink>,
}

impl<S> Orchestrator<S>
where
    S: AccountStore,
{
    pub fn new(client: HubspotClient, store: S, sink: Arc<dyn EventSink>) -> Self {
        Self {
            client,
            store,
            sink,
        }
    }

    /// Process every account, strictly one at a time.
    pub async fn run(&self) -> RelayResult<Vec<AccountReport>> {
        let mut accounts = self.store.load_accounts().await?;
        tracing::info!(count = accounts.len(), "start pulling accounts");

        let mut reports = Vec::with_capacity(accounts.len());
        for account in &mut accounts {
            reports.push(self.sync_account(account).await);
        }
        Ok(reports)
    }

    /// One account's full pass: refresh → contacts → companies → meetings →
    /// drain → persist. Each stage is fault-isolated and logged with
    /// account context.
    pub async fn sync_account(&self, account: &mut Account) -> AccountReport {
        let hub_id = account.hub_id.clone();
        tracing::info!(hub_id = %hub_id, "start processing account");

        let mut stages = Vec::new();

        // Start from the stored token with an already-passed expiry, so a
        // failed refresh here still lets the fetch retry loop re-attempt it.
        let mut creds = Credentials {
            access_token: account.access_token.clone(),
            refresh_token: account.refresh_token.clone(),
            expires_at: Utc::now(),
        };

        match self.client.refresh_credentials(&mut creds).await {
            Ok(()) => stages.push(StageOutcome::ok("refresh_token")),
            Err(e) => {
                tracing::error!(hub_id = %hub_id, operation = "refresh_token", error = %e, "stage failed");
                stages.push(StageOutcome::failed("refresh_token", e));
            }
        }

        let dispatcher = BatchDispatcher::new(Arc::clone(&self.sink));

        match contacts::process_contacts(&self.client, &mut creds, account, &dispatcher).await {
            Ok(_) => stages.push(StageOutcome::ok("process_contacts")),
            Err(e) => {
                tracing::error!(hub_id = %hub_id, operation = "process_contacts", error = %e, "stage failed");
                stages.push(StageOutcome::failed("process_contacts", e));
            }
        }

        match companies::process_companies(&self.client, &mut creds, account, &dispatcher).await {
            Ok(_) => stages.push(StageOutcome::ok("process_companies")),
            Err(e) => {
                tracing::error!(hub_id = %hub_id, operation = "process_companies", error = %e, "stage failed");
                stages.push(StageOutcome::failed("process_companies", e));
            }
        }

        match meetings::process_meetings(&self.client, &mut creds, account, &dispatcher).await {
            Ok(_) => stages.push(StageOutcome::ok("process_meetings")),
            Err(e) => {
                tracing::error!(hub_id = %hub_id, operation = "process_meetings", error = %e, "stage failed");
                stages.push(StageOutcome::failed("process_meetings", e));
            }
        }

        match dispatcher.drain().await {
            Ok(_) => stages.push(StageOutcome::ok("drain_queue")),
            Err(e) => {
                tracing::error!(hub_id = %hub_id, operation = "drain_queue", error = %e, "stage failed");
                stages.push(StageOutcome::failed("drain_queue", e));
            }
        }

        if creds.access_token != account.access_token {
            account.access_token = creds.access_token.clone();
        }
        match self.store.save_account(account).await {
            Ok(()) => stages.push(StageOutcome::ok("save_account")),
            Err(e) => {
                tracing::error!(hub_id = %hub_id, operation = "save_account", error = %e, "stage failed");
                stages.push(StageOutcome::failed("save_account", e));
            }
        }

        tracing::info!(
            hub_id = %hub_id,
            failed = stages.iter().filter(|s| !s.is_ok()).count(),
            "finish processing account"
        );
        AccountReport {
            hub_id,
            stages,
        }
    }
}
