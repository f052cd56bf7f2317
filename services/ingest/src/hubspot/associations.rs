use std::collections::HashMap;

use relay_store::EntityKind;

use super::client::{Credentials, HubspotClient, HubspotClientError};

/// Resolve a 1:1 relation (e.g. contact→company). First target wins;
/// sources with no association are simply absent from the map.
pub async fn resolve_one_to_one(
    client: &HubspotClient,
    from: EntityKind,
    to: EntityKind,
    ids: &[String],
    creds: &mut Credentials,
) -> Result<HashMap<String, String>, HubspotClientError> {
    let results = client.read_associations(from, to, ids, creds).await?;

    let mut map = HashMap::new();
    for result in results {
        let Some(source) = result.from else { continue };
        if let Some(target) = result.to.first() {
            map.entry(source.id).or_insert_with(|| target.id.clone());
        }
    }
    Ok(map)
}

/// Resolve a 1:many relation (e.g. meeting→contacts).
pub async fn resolve_one_to_many(
    client: &HubspotClient,
    from: EntityKind,
    to: EntityKind,
    ids: &[String],
    creds: &mut Credentials,
) -> Result<HashMap<String, Vec<String>>, HubspotClientError> {
    let results = client.read_associations(from, to, ids, creds).await?;

    let mut map = HashMap::new();
    for result in results {
        let Some(source) = result.from else { continue };
        if result.to.is_empty() {
            continue;
        }
        map.insert(source.id, result.to.into_iter().map(|t| t.id).collect());
    }
    Ok(map)
}

/// Look up contact emails by id via a batch read restricted to `email`.
/// Contacts without a usable email are absent from the map.
pub async fn contact_emails(
    client: &HubspotClient,
    contact_ids: &[String],
    creds: &mut Credentials,
) -> Result<HashMap<String, String>, HubspotClientError> {
    let records = client
        .batch_read(EntityKind::Contacts, contact_ids, &["email"], creds)
        .await?;

    let mut map = HashMap::new();
    for record in records {
        if let Some(email) = record.property("email").filter(|e| !e.is_empty()) {
            map.insert(record.id.clone(), email.to_string());
        }
    }
    Ok(map)
}
