use crate::model::{AggregationReport, ConcertsDocument, Event};
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// JSON file holding the latest scrape plus anything imported since.
#[derive(Debug, Clone)]
pub struct ConcertStore {
    path: PathBuf,
}

impl ConcertStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ConcertsDocument> {
        if !self.path.exists() {
            return Ok(ConcertsDocument::default());
        }

        let raw = std::fs::read(&self.path)
            .with_context(|| format!("failed to read concert store {}", self.path.display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("concert store {} is not valid JSON", self.path.display()))
    }

    pub fn replace(&self, events: Vec<Event>, report: AggregationReport) -> Result<()> {
        self.commit(ConcertsDocument {
            events,
            report: Some(report),
            ..ConcertsDocument::default()
        })
    }

    /// Returns how many events were added.
    pub fn append(&self, events: Vec<Event>) -> Result<usize> {
        let mut document = self.load()?;
        let mut known: HashSet<String> = document.events.iter().map(|e| e.id.clone()).collect();

        let before = document.events.len();
        document
            .events
            .extend(events.into_iter().filter(|event| known.insert(event.id.clone())));
        let added = document.events.len() - before;

        self.commit(document)?;
        Ok(added)
    }

    fn commit(&self, mut document: ConcertsDocument) -> Result<()> {
        document.total_events = document.events.len();
        document.last_updated = Some(Utc::now());

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(&document)?;
        std::fs::write(&self.path, body)
            .with_context(|| format!("failed to write concert store {}", self.path.display()))
    }
}
