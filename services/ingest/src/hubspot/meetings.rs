use std::collections::HashSet;

use chrono::Utc;

use relay_store::{Account, EntityKind};

use super::associations::{contact_emails, resolve_one_to_many};
use super::client::{Credentials, HubspotClient, HubspotClientError};
use super::pull::{PagePuller, PullWindow};
use super::PullStats;
use crate::dispatch::BatchDispatcher;
use crate::events::translate_meeting;

/// Pull recently modified meetings and fan out one event per attendee
/// email. Attendees are resolved in two hops per page: meeting→contact ids,
/// then contact id→email.
pub async fn process_meetings(
    client: &HubspotClient,
    creds: &mut Credentials,
    account: &mut Account,
    dispatcher: &BatchDispatcher,
) -> Result<PullStats, HubspotClientError> {
    let kind = EntityKind::Meetings;
    let now = Utc::now();
    let checkpoint = account.last_pulled_dates.get(kind);
    let mut stats = PullStats::new(kind);

    let mut puller = PagePuller::new(client, kind, PullWindow { checkpoint, until: now });

    while let Some(page) = puller.next_page(creds).await? {
        stats.pages += 1;
        stats.records += page.len();
        tracing::debug!(hub_id = %account.hub_id, batch = page.len(), "fetched meeting batch");

        let meeting_ids: Vec<String> = page.iter().map(|r| r.id.clone()).collect();
        let attendees = resolve_one_to_many(
            client,
            EntityKind::Meetings,
            EntityKind::Contacts,
            &meeting_ids,
            creds,
        )
        .await?;

        let all_contact_ids: Vec<String> = attendees
            .values()
            .flatten()
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let emails = contact_emails(client, &all_contact_ids, creds).await?;

        for record in &page {
            let attendee_emails: Vec<String> = attendees
                .get(&record.id)
                .map(|contact_ids| {
                    contact_ids
                        .iter()
                        .filter_map(|id| emails.get(id).cloned())
                        .collect()
                })
                .unwrap_or_default();

            let events = translate_meeting(record, &attendee_emails, checkpoint);
            if events.is_empty() {
                tracing::debug!(id = %record.id, "meeting with no resolvable attendees");
                stats.skipped += 1;
                continue;
            }
            stats.events += events.len();
            for event in events {
                dispatcher.push(event);
            }
        }
    }

    // Checkpoint invariant: advance to the window start captured at entry.
    account.last_pulled_dates.set(kind, now);

    tracing::info!(
        hub_id = %account.hub_id,
        pages = stats.pages,
        events = stats.events,
        skipped = stats.skipped,
        "meeting pull completed"
    );
    Ok(stats)
}
