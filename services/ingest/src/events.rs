use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::hubspot::models::RawRecord;
use crate::hubspot::pull::{classify, RecordChange};

/// Company action timestamps are shifted back by this many milliseconds to
/// match the historical analytics feed. Preserved as-is; the upstream
/// rationale is undocumented.
pub const COMPANY_ACTION_SKEW_MS: i64 = 2000;

/// The normalized record pushed to the analytics sink.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    pub action_name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub action_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    pub properties: Map<String, Value>,
    pub include_in_analytics: u8,
}

fn action_name(entity: &str, change: RecordChange) -> String {
    match change {
        RecordChange::Created => format!("{entity} Created"),
        RecordChange::Updated => format!("{entity} Updated"),
    }
}

fn action_date(record: &RawRecord, change: RecordChange) -> DateTime<Utc> {
    match change {
        RecordChange::Created => record.created_at,
        RecordChange::Updated => record.updated_at,
    }
}

/// Drop null-valued entries from a properties bag.
pub fn filter_null_values(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter().filter(|(_, v)| !v.is_null()).collect()
}

fn opt_str(value: Option<&str>) -> Value {
    match value {
        Some(s) => Value::String(s.to_string()),
        None => Value::Null,
    }
}

/// One event per company; no person-level identity.
pub fn translate_company(
    record: &RawRecord,
    checkpoint: Option<DateTime<Utc>>,
) -> Option<CanonicalEvent> {
    record.properties.as_ref()?;

    let mut properties = Map::new();
    properties.insert("company_id".into(), Value::String(record.id.clone()));
    properties.insert("company_domain".into(), opt_str(record.property("domain")));
    properties.insert("company_industry".into(), opt_str(record.property("industry")));

    let change = classify(record, checkpoint);
    Some(CanonicalEvent {
        action_name: action_name("Company", change),
        action_date: action_date(record, change) - Duration::milliseconds(COMPANY_ACTION_SKEW_MS),
        identity: None,
        properties: filter_null_values(properties),
        include_in_analytics: 0,
    })
}

/// One event per contact with a non-empty email; the email is the identity.
pub fn translate_contact(
    record: &RawRecord,
    company_id: Option<&str>,
    checkpoint: Option<DateTime<Utc>>,
) -> Option<CanonicalEvent> {
    record.properties.as_ref()?;
    let email = record.property("email").filter(|e| !e.is_empty())?;

    let name = format!(
        "{} {}",
        record.property("firstname").unwrap_or(""),
        record.property("lastname").unwrap_or("")
    )
    .trim()
    .to_string();

    let score = record
        .property("hubspotscore")
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);

    let mut properties = Map::new();
    properties.insert("company_id".into(), opt_str(company_id));
    properties.insert("contact_name".into(), Value::String(name));
    properties.insert("contact_title".into(), opt_str(record.property("jobtitle")));
    properties.insert(
        "contact_source".into(),
        opt_str(record.property("hs_analytics_source")),
    );
    properties.insert(
        "contact_status".into(),
        opt_str(record.property("hs_lead_status")),
    );
    properties.insert("contact_score".into(), Value::from(score));

    let change = classify(record, checkpoint);
    Some(CanonicalEvent {
        action_name: action_name("Contact", change),
        action_date: action_date(record, change),
        identity: Some(email.to_string()),
        properties: filter_null_values(properties),
        include_in_analytics: 0,
    })
}

/// Fan-out: one event per resolved attendee email, sharing the meeting
/// properties but carrying a distinct identity. Zero emails yield zero
/// events.
pub fn translate_meeting(
    record: &RawRecord,
    attendee_emails: &[String],
    checkpoint: Option<DateTime<Utc>>,
) -> Vec<CanonicalEvent> {
    if record.properties.is_none() {
        return Vec::new();
    }

    let mut properties = Map::new();
    properties.insert("meeting_id".into(), Value::String(record.id.clone()));
    properties.insert(
        "meeting_title".into(),
        opt_str(record.property("hs_meeting_title")),
    );
    properties.insert(
        "meeting_start_time".into(),
        opt_str(record.property("hs_meeting_start_time")),
    );
    properties.insert(
        "meeting_end_time".into(),
        opt_str(record.property("hs_meeting_end_time")),
    );
    properties.insert(
        "meeting_outcome".into(),
        opt_str(record.property("hs_meeting_outcome")),
    );
    let properties = filter_null_values(properties);

    let change = classify(record, checkpoint);
    attendee_emails
        .iter()
        .map(|email| CanonicalEvent {
            action_name: action_name("Meeting", change),
            action_date: action_date(record, change),
            identity: Some(email.clone()),
            properties: properties.clone(),
            include_in_analytics: 0,
        })
        .collect()
}
