use chrono::{DateTime, Utc};

use relay_store::EntityKind;

use super::client::{Credentials, HubspotClient, HubspotClientError};
use super::models::RawRecord;
use super::query::build_search_request;

/// The search API rejects offsets at or beyond this value; pagination must
/// reset and narrow the time window instead.
pub const MAX_SEARCH_OFFSET: u64 = 9900;

/// Transient pagination state for one entity-kind pull.
#[derive(Debug, Clone, Default)]
pub struct PullCursor {
    pub after: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// The modified-since window for one pull: checkpoint lower bound (if any)
/// and a wall-clock upper bound captured once at pull start.
#[derive(Debug, Clone, Copy)]
pub struct PullWindow {
    pub checkpoint: Option<DateTime<Utc>>,
    pub until: DateTime<Utc>,
}

/// Whether a record is new since the checkpoint or a modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordChange {
    Created,
    Updated,
}

/// Created iff there is no checkpoint yet, or the record's creation time is
/// strictly after it.
pub fn classify(record: &RawRecord, checkpoint: Option<DateTime<Utc>>) -> RecordChange {
    match checkpoint {
        None => RecordChange::Created,
        Some(cp) if record.created_at > cp => RecordChange::Created,
        Some(_) => RecordChange::Updated,
    }
}

/// Drives the search-and-page loop for one entity kind.
///
/// Each `next_page` call issues one paged search bounded by
/// `max(cursor.last_modified, checkpoint) ..= until`. When the returned
/// next-page token would reach the API's maximum offset, the cursor resets:
/// `after` clears and `last_modified` advances to the newest `updated_at`
/// in the current page, narrowing the window so pagination never stalls.
pub struct PagePuller<'a> {
    client: &'a HubspotClient,
    kind: EntityKind,
    window: PullWindow,
    cursor: PullCursor,
    done: bool,
}

impl<'a> PagePuller<'a> {
    pub fn new(client: &'a HubspotClient, kind: EntityKind, window: PullWindow) -> Self {
        Self {
            client,
            kind,
            window,
            cursor: PullCursor::default(),
            done: false,
        }
    }

    fn lower_bound(&self) -> Option<DateTime<Utc>> {
        match (self.cursor.last_modified, self.window.checkpoint) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fetch the next page, or `None` once the loop has terminated.
    pub async fn next_page(
        &mut self,
        creds: &mut Credentials,
    ) -> Result<Option<Vec<RawRecord>>, HubspotClientError> {
        if self.done {
            return Ok(None);
        }

        let request = build_search_request(
            self.kind,
            self.lower_bound(),
            self.window.until,
            self.cursor.after,
        );
        let response = self.client.search(self.kind, &request, creds).await?;

        match response.next_after() {
            None => self.done = true,
            Some(after) if after >= MAX_SEARCH_OFFSET => {
                let max_updated = response.results.iter().map(|r| r.updated_at).max();
                tracing::info!(
                    kind = %self.kind,
                    after,
                    last_modified = ?max_updated,
                    "search offset limit reached, resetting cursor"
                );
                self.cursor.after = None;
                self.cursor.last_modified = max_updated;
            }
            Some(after) => self.cursor.after = Some(after),
        }

        Ok(Some(response.results))
    }
}
