use crate::config::SourceKind;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TBD: &str = "TBD";
pub const DEFAULT_GENRE: &str = "Live Music";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub artist: String,
    pub venue: String,
    pub date: NaiveDate,
    pub time: String,
    pub price: String,
    pub genre: String,
    pub is_favorite_venue: bool,
    pub source: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Event {
    pub fn composite_key(&self) -> (String, String, NaiveDate) {
        (
            self.artist.to_lowercase(),
            self.venue.to_lowercase(),
            self.date,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCandidate {
    pub artist: String,
    pub venue: String,
    pub date_text: String,
    pub context: String,
    pub time: Option<String>,
    pub price: Option<String>,
}

#[derive(Debug, Clone)]
pub enum SourceOutcome {
    Succeeded { events: Vec<Event> },
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub struct SourceResult {
    pub source_name: String,
    pub kind: SourceKind,
    pub outcome: SourceOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSuccess {
    pub source: String,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VenueStat {
    pub count: usize,
    pub favorite: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    pub successful: Vec<SourceSuccess>,
    pub failed: Vec<SourceFailure>,
    pub total_events: usize,
    pub favorite_venue_events: usize,
    pub venue_stats: BTreeMap<String, VenueStat>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub events: Vec<Event>,
    pub report: AggregationReport,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConcertsDocument {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_events: usize,
    #[serde(default)]
    pub report: Option<AggregationReport>,
}
