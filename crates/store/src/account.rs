use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three CRM record kinds this worker pulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Companies,
    Contacts,
    Meetings,
}

impl EntityKind {
    /// Path segment used in the CRM object APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Companies => "companies",
            EntityKind::Contacts => "contacts",
            EntityKind::Meetings => "meetings",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind "last successfully synced through" checkpoints for one account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPulledDates {
    pub companies: Option<DateTime<Utc>>,
    pub contacts: Option<DateTime<Utc>>,
    pub meetings: Option<DateTime<Utc>>,
}

impl LastPulledDates {
    pub fn get(&self, kind: EntityKind) -> Option<DateTime<Utc>> {
        match kind {
            EntityKind::Companies => self.companies,
            EntityKind::Contacts => self.contacts,
            EntityKind::Meetings => self.meetings,
        }
    }

    pub fn set(&mut self, kind: EntityKind, ts: DateTime<Utc>) {
        match kind {
            EntityKind::Companies => self.companies = Some(ts),
            EntityKind::Contacts => self.contacts = Some(ts),
            EntityKind::Meetings => self.meetings = Some(ts),
        }
    }
}

/// One connected CRM tenant as stored in the external account document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub hub_id: String,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub last_pulled_dates: LastPulledDates,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn entity_kind_path_segments() {
        assert_eq!(EntityKind::Companies.as_str(), "companies");
        assert_eq!(EntityKind::Contacts.as_str(), "contacts");
        assert_eq!(EntityKind::Meetings.as_str(), "meetings");
    }

    #[test]
    fn last_pulled_dates_get_set_roundtrip() {
        let mut dates = LastPulledDates::default();
        assert!(dates.get(EntityKind::Contacts).is_none());

        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        dates.set(EntityKind::Contacts, ts);
        assert_eq!(dates.get(EntityKind::Contacts), Some(ts));
        assert!(dates.get(EntityKind::Companies).is_none());
        assert!(dates.get(EntityKind::Meetings).is_none());
    }

    #[test]
    fn account_deserializes_without_checkpoints() {
        let json = r#"{
            "hubId": "12345",
            "accessToken": "at",
            "refreshToken": "rt"
        }"#;
        let account: Account = serde_json::from_str(json).expect("should deserialize");
        assert_eq!(account.hub_id, "12345");
        assert!(account.last_pulled_dates.contacts.is_none());
    }

    #[test]
    fn account_serializes_camel_case() {
        let account = Account {
            hub_id: "1".to_string(),
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            last_pulled_dates: LastPulledDates::default(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("hubId").is_some());
        assert!(json.get("lastPulledDates").is_some());
    }
}
