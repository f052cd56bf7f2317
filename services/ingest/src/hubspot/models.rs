use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One record from a CRM object search or batch read.
///
/// `properties` may be absent; such records are skipped everywhere before
/// any field access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub properties: Option<serde_json::Map<String, Value>>,
}

impl RawRecord {
    /// String property lookup, treating JSON null as absent.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.as_ref()?.get(name)?.as_str()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<RawRecord>,
    pub paging: Option<Paging>,
}

impl SearchResponse {
    /// Next-page offset token, parsed from the wire string.
    pub fn next_after(&self) -> Option<u64> {
        self.paging
            .as_ref()?
            .next
            .as_ref()?
            .after
            .parse::<u64>()
            .ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging {
    pub next: Option<PagingNext>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagingNext {
    pub after: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchReadResponse {
    #[serde(default)]
    pub results: Vec<RawRecord>,
}

/// One entry from a batch association read: a source id and its targets.
#[derive(Debug, Clone, Deserialize)]
pub struct AssociationResult {
    pub from: Option<AssociationEnd>,
    #[serde(default)]
    pub to: Vec<AssociationEnd>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssociationEnd {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssociationBatchResponse {
    #[serde(default)]
    pub results: Vec<AssociationResult>,
}

/// OAuth refresh exchange response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}
