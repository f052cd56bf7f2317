use chrono::Utc;

use relay_store::{Account, EntityKind};

use super::client::{Credentials, HubspotClient, HubspotClientError};
use super::pull::{PagePuller, PullWindow};
use super::PullStats;
use crate::dispatch::BatchDispatcher;
use crate::events::translate_company;

/// Pull recently modified companies and push one event per company.
pub async fn process_companies(
    client: &HubspotClient,
    creds: &mut Credentials,
    account: &mut Account,
    dispatcher: &BatchDispatcher,
) -> Result<PullStats, HubspotClientError> {
    let kind = EntityKind::Companies;
    let now = Utc::now();
    let checkpoint = account.last_pulled_dates.get(kind);
    let mut stats = PullStats::new(kind);

    let mut puller = PagePuller::new(client, kind, PullWindow { checkpoint, until: now });

    while let Some(page) = puller.next_page(creds).await? {
        stats.pages += 1;
        stats.records += page.len();
        tracing::debug!(hub_id = %account.hub_id, batch = page.len(), "fetched company batch");

        for record in &page {
            match translate_company(record, checkpoint) {
                Some(event) => {
                    dispatcher.push(event);
                    stats.events += 1;
                }
                None => {
                    tracing::debug!(id = %record.id, "skipping company without properties");
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
        "company pull completed"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hubspot::client::tests::{fresh_creds, test_config};
    use crate::testutil::{collected_events, test_dispatcher};
    use chrono::{DateTime, TimeZone, Utc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_account(checkpoint: Option<DateTime<Utc>>) -> Account {
        crate::testutil::test_account(EntityKind::Companies, checkpoint)
    }

    fn company(id: &str, created: &str, updated: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "createdAt": created,
            "updatedAt": updated,
            "properties": { "domain": format!("{id}.example.com"), "industry": "SaaS" }
        })
    }

    #[tokio::test]
    async fn one_page_emits_created_and_updated() {
        let server = MockServer::start().await;
        let checkpoint = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

        Mock::given(method("POST"))
            .and(path("/crm/v3/objects/companies/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    company("new", "2026-03-02T10:00:00Z", "2026-03-02T10:00:00Z"),
                    company("old", "2026-01-15T10:00:00Z", "2026-03-02T09:00:00Z")
                ]
            })))
            .mount(&server)
            .await;

        let client = HubspotClient::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());
        let mut creds = fresh_creds();
        let mut account = test_account(Some(checkpoint));
        let (dispatcher, sink) = test_dispatcher();

        let stats = process_companies(&client, &mut creds, &mut account, &dispatcher)
            .await
            .unwrap();
        assert_eq!(stats.pages, 1);
        assert_eq!(stats.events, 2);
        assert_eq!(stats.skipped, 0);

        let events = collected_events(&dispatcher, &sink).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action_name, "Company Created");
        assert_eq!(events[1].action_name, "Company Updated");
    }

    #[tokio::test]
    async fn zero_pages_still_advances_checkpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/crm/v3/objects/companies/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
            )
            .mount(&server)
            .await;

        let client = HubspotClient::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());
        let mut creds = fresh_creds();
        let mut account = test_account(None);
        let (dispatcher, sink) = test_dispatcher();

        let before = chrono::Utc::now();
        let stats = process_companies(&client, &mut creds, &mut account, &dispatcher)
            .await
            .unwrap();
        assert_eq!(stats.events, 0);

        let checkpoint = account.last_pulled_dates.get(EntityKind::Companies).unwrap();
        assert!(checkpoint >= before);
        assert!(collected_events(&dispatcher, &sink).await.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_leaves_checkpoint_untouched() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/crm/v3/objects/companies/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let client = HubspotClient::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());
        let mut creds = fresh_creds();
        let checkpoint = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut account = test_account(Some(checkpoint));
        let (dispatcher, _sink) = test_dispatcher();

        let err = process_companies(&client, &mut creds, &mut account, &dispatcher)
            .await
            .unwrap_err();
        assert!(matches!(err, HubspotClientError::FetchExhausted { .. }));
        assert_eq!(
            account.last_pulled_dates.get(EntityKind::Companies),
            Some(checkpoint)
        );
    }

    #[tokio::test]
    async fn records_without_properties_are_counted_skipped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/crm/v3/objects/companies/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    company("ok", "2026-03-02T10:00:00Z", "2026-03-02T10:00:00Z"),
                    {
                        "id": "bare",
                        "createdAt": "2026-03-02T10:00:00Z",
                        "updatedAt": "2026-03-02T10:00:00Z"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = HubspotClient::new(test_config())
            .unwrap()
            .with_base_url(&server.uri());
        let mut creds = fresh_creds();
        let mut account = test_account(None);
        let (dispatcher, sink) = test_dispatcher();

        let stats = process_companies(&client, &mut creds, &mut account, &dispatcher)
            .await
            .unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.events, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(collected_events(&dispatcher, &sink).await.len(), 1);
    }
}
