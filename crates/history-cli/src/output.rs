//! Output formatting structures for CLI display

use tabled::Tabled;

/// Table row for one change event of an entity
#[derive(Tabled)]
pub struct EventRow {
    #[tabled(rename = "Commit")]
    pub commit: String,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Age")]
    pub age: String,
    #[tabled(rename = "Fingerprint")]
    pub fingerprint: String,
    #[tabled(rename = "Changed")]
    pub changed: String,
}

/// Table row for a stored entity key
#[derive(Tabled)]
pub struct KeyRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Events")]
    pub events: usize,
    #[tabled(rename = "Last change")]
    pub last_change: String,
}
