use chrono::Utc;

use relay_store::{Account, EntityKind};

use super::associations::resolve_one_to_one;
use super::client::{Credentials, HubspotClient, HubspotClientError};
use super::pull::{PagePuller, PullWindow};
use super::PullStats;
use crate::dispatch::BatchDispatcher;
use crate::events::translate_contact;

/// Pull recently modified contacts, enrich each with its associated
/// company, and push one event per contact with an email.
pub async fn process_contacts(
    client: &HubspotClient,
    creds: &mut Credentials,
    account: &mut Account,
    dispatcher: &BatchDispatcher,
) -> Result<PullStats, HubspotClientError> {
    let kind = EntityKind::Contacts;
    let now = Utc::now();
    let checkpoint = account.last_pulled_dates.get(kind);
    let mut stats = PullStats::new(kind);

    let mut puller = PagePuller::new(client, kind, PullWindow { checkpoint, until: now });

    while let Some(page) = puller.next_page(creds).await? {
        stats.pages += 1;
        stats.records += page.len();
        tracing::debug!(hub_id = %account.hub_id, batch = page.len(), "fetched contact batch");

        let contact_ids: Vec<String> = page.iter().map(|r| r.id.clone()).collect();
        let companies = resolve_one_to_one(
            client,
            EntityKind::Contacts,
            EntityKind::Companies,
            &contact_ids,
            creds,
        )
        .await?;

        for record in &page {
            let company_id = companies.get(&record.id).map(String::as_str);
            match translate_contact(record, company_id, checkpoint) {
                Some(event) => {
                    dispatcher.push(event);
                    stats.events += 1;
                }
                None => {
                    tracing::debug!(id = %record.id, "skipping contact without email");
                    stats.skipped += 1;
                }
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
        "contact pull completed"
    );
    Ok(stats)
}
