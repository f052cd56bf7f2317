use chrono::{DateTime, Utc};
use serde::Serialize;

use relay_store::EntityKind;

/// Page size for object searches.
pub const SEARCH_PAGE_LIMIT: u32 = 100;

/// Fixed property projection requested per entity kind.
pub fn search_properties(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Companies => &[
            "name",
            "domain",
            "country",
            "industry",
            "description",
            "annualrevenue",
            "numberofemployees",
            "hs_lead_status",
        ],
        EntityKind::Contacts => &[
            "firstname",
            "lastname",
            "jobtitle",
            "email",
            "hubspotscore",
            "hs_lead_status",
            "hs_analytics_source",
            "hs_latest_source",
        ],
        EntityKind::Meetings => &[
            "hs_meeting_title",
            "hs_meeting_body",
            "hs_meeting_start_time",
            "hs_meeting_end_time",
            "hs_meeting_outcome",
        ],
    }
}

/// Last-modified property name per entity kind. Contacts use a different
/// name than the other object types.
pub fn modified_property(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Contacts => "lastmodifieddate",
        _ => "hs_lastmodifieddate",
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub filter_groups: Vec<FilterGroup>,
    pub sorts: Vec<Sort>,
    pub properties: Vec<&'static str>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub property_name: &'static str,
    pub operator: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub property_name: &'static str,
    pub direction: &'static str,
}

/// Build one paged search request for `kind`, bounded to records modified
/// within `[since, until]` and sorted ascending by modification time.
///
/// With no lower bound the filter is omitted entirely: fetch everything.
pub fn build_search_request(
    kind: EntityKind,
    since: Option<DateTime<Utc>>,
    until: DateTime<Utc>,
    after: Option<u64>,
) -> SearchRequest {
    let prop = modified_property(kind);

    let filter_groups = match since {
        Some(since) => vec![FilterGroup {
            filters: vec![
                Filter {
                    property_name: prop,
                    operator: "GTE",
                    value: since.timestamp_millis().to_string(),
                },
                Filter {
                    property_name: prop,
                    operator: "LTE",
                    value: until.timestamp_millis().to_string(),
                },
            ],
        }],
        None => Vec::new(),
    };

    SearchRequest {
        filter_groups,
        sorts: vec![Sort {
            property_name: prop,
            direction: "ASCENDING",
        }],
        properties: search_properties(kind).to_vec(),
        limit: SEARCH_PAGE_LIMIT,
        after,
    }
}
