pub mod associations;
pub mod client;
pub mod companies;
pub mod contacts;
pub mod meetings;
pub mod models;
pub mod pull;
pub mod query;

use relay_store::EntityKind;

/// Counters for one entity-kind pass, reported by the orchestrator.
#[derive(Debug, Clone)]
pub struct PullStats {
    pub kind: EntityKind,
    pub pages: usize,
    pub records: usize,
    pub events: usize,
    pub skipped: usize,
}

impl PullStats {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            pages: 0,
            records: 0,
            events: 0,
            skipped: 0,
        }
    }
}
