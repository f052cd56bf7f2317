//! Shared fakes for service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use relay_store::{Account, EntityKind};

use crate::dispatch::BatchDispatcher;
use crate::events::CanonicalEvent;
use crate::sink::{EventSink, SinkError};

/// Records every accepted batch for assertions.
#[derive(Clone, Default)]
pub struct CollectingSink {
    pub batches: Arc<Mutex<Vec<Vec<CanonicalEvent>>>>,
}

#[async_trait]
impl EventSink for CollectingSink {
    async fn accept(&self, events: Vec<CanonicalEvent>) -> Result<(), SinkError> {
        self.batches.lock().unwrap().push(events);
        Ok(())
    }
}

pub fn test_dispatcher() -> (BatchDispatcher, CollectingSink) {
    let sink = CollectingSink::default();
    (BatchDispatcher::new(Arc::new(sink.clone())), sink)
}

/// Drain the dispatcher and return every event the sink saw, in order.
pub async fn collected_events(
    dispatcher: &BatchDispatcher,
    sink: &CollectingSink,
) -> Vec<CanonicalEvent> {
    dispatcher.drain().await.unwrap();
    sink.batches.lock().unwrap().iter().flatten().cloned().collect()
}

pub fn test_account(kind: EntityKind, checkpoint: Option<DateTime<Utc>>) -> Account {
    let mut account = Account {
        hub_id: "hub-1".to_string(),
        access_token: "at".to_string(),
        refresh_token: "rt".to_string(),
        last_pulled_dates: Default::default(),
    };
    if let Some(cp) = checkpoint {
        account.last_pulled_dates.set(kind, cp);
    }
    account
}
