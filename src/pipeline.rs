use crate::config::{LoadedSource, load_source_file, load_sources_from_dir};
use crate::fetch::{Fetch, HttpFetcher, fetch_source_document};
use crate::model::{
    AggregationReport, Event, RunOutput, SourceFailure, SourceOutcome, SourceResult,
    SourceSuccess, VenueStat,
};
use crate::parser::{ExtractContext, parse_source_events};
use crate::store::ConcertStore;
use crate::venue::VenueCatalog;
use anyhow::{Context, Result, bail};
use chrono::{Duration as DateDuration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_DELAY_MS: u64 = 3000;
pub const DEFAULT_UPCOMING_DAYS: i64 = 14;

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub config_dir: PathBuf,
    pub store_path: PathBuf,
    pub source: Option<String>,
    pub dry_run: bool,
    pub delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub store_path: PathBuf,
    pub days: i64,
    pub favorites_only: bool,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub store_path: PathBuf,
    pub input: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub config_dir: Option<PathBuf>,
    pub source_file: Option<PathBuf>,
}

pub struct Aggregator<'a> {
    fetcher: &'a dyn Fetch,
    catalog: &'a VenueCatalog,
    delay: Duration,
    sleep: fn(Duration),
}

impl<'a> Aggregator<'a> {
    pub fn new(fetcher: &'a dyn Fetch, delay: Duration) -> Self {
        Self {
            fetcher,
            catalog: VenueCatalog::global(),
            delay,
            sleep: std::thread::sleep,
        }
    }

    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn run(&self, sources: &[LoadedSource]) -> RunOutput {
        let enabled: Vec<&LoadedSource> = sources
            .iter()
            .filter(|source| {
                if !source.config.source.enabled {
                    info!(source = %source.config.source.key, "source disabled; skipping");
                }
                source.config.source.enabled
            })
            .collect();

        let mut results = Vec::with_capacity(enabled.len());
        for (idx, source) in enabled.iter().enumerate() {
            if idx > 0 && !self.delay.is_zero() {
                (self.sleep)(self.delay);
            }
            results.push(self.run_source(source));
        }

        merge_results(results, self.catalog)
    }

    pub fn run_source(&self, source: &LoadedSource) -> SourceResult {
        let meta = &source.config.source;
        info!(source = %meta.key, url = %source.config.display_url(), "scrape start");

        let ctx = ExtractContext::now(meta.timezone.as_deref());
        let outcome = fetch_source_document(source, self.fetcher)
            .and_then(|doc| parse_source_events(source, &doc, &ctx))
            .with_context(|| format!("source {} failed", meta.key));

        let outcome = match outcome {
            Ok(events) => {
                info!(source = %meta.key, events = events.len(), "scrape complete");
                SourceOutcome::Succeeded { events }
            }
            Err(err) => {
                let error = format!("{err:#}");
                warn!(source = %meta.key, error = %error, "scrape failed");
                SourceOutcome::Failed { error }
            }
        };

        SourceResult {
            source_name: meta.name.clone(),
            kind: meta.kind,
            outcome,
        }
    }
}

pub fn merge_results(results: Vec<SourceResult>, catalog: &VenueCatalog) -> RunOutput {
    let mut report = AggregationReport::default();
    let mut candidates = Vec::new();

    for result in results {
        match result.outcome {
            SourceOutcome::Succeeded { events } => {
                report.successful.push(SourceSuccess {
                    source: result.source_name,
                    count: events.len(),
                    kind: result.kind,
                });
                candidates.extend(events);
            }
            SourceOutcome::Failed { error } => {
                report.failed.push(SourceFailure {
                    source: result.source_name,
                    error,
                    kind: result.kind,
                });
            }
        }
    }

    let mut events = dedup_events(candidates);
    sort_events(&mut events);

    report.total_events = events.len();
    report.favorite_venue_events = events.iter().filter(|e| e.is_favorite_venue).count();
    report.venue_stats = venue_stats(&events, catalog);

    RunOutput { events, report }
}

/// Keeps the first event seen for each composite key.
pub fn dedup_events(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(events.len());

    for event in events {
        if seen.insert(event.composite_key()) {
            unique.push(event);
        } else {
            info!(
                artist = %event.artist,
                venue = %event.venue,
                source = %event.source,
                "duplicate removed"
            );
        }
    }

    unique
}

pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.venue.cmp(&b.venue)));
}

pub fn venue_stats(events: &[Event], catalog: &VenueCatalog) -> BTreeMap<String, VenueStat> {
    let mut stats: BTreeMap<String, VenueStat> = BTreeMap::new();
    for event in events {
        stats
            .entry(event.venue.clone())
            .or_insert_with(|| VenueStat {
                count: 0,
                favorite: catalog.is_favorite(&event.venue),
            })
            .count += 1;
    }
    stats
}

pub fn scrape_sources(options: &ScrapeOptions) -> Result<RunOutput> {
    scrape_sources_with(options, &HttpFetcher)
}

pub fn scrape_sources_with(options: &ScrapeOptions, fetcher: &dyn Fetch) -> Result<RunOutput> {
    let mut sources = load_sources_from_dir(&options.config_dir)?;
    if let Some(filter) = &options.source {
        sources.retain(|s| s.config.source.key == *filter);
    }
    if sources.is_empty() {
        bail!("no matching source configurations found");
    }

    let aggregator = Aggregator::new(fetcher, Duration::from_millis(options.delay_ms));
    let output = aggregator.run(&sources);
    log_venue_breakdown(&output.report);

    info!(
        events = output.report.total_events,
        successful = output.report.successful.len(),
        failed = output.report.failed.len(),
        favorites = output.report.favorite_venue_events,
        "scrape run complete"
    );

    if options.dry_run {
        info!("dry run enabled; store not written");
        return Ok(output);
    }

    let store = ConcertStore::new(&options.store_path);
    store.replace(output.events.clone(), output.report.clone())?;
    info!(store = %store.path().display(), "store written");

    Ok(output)
}

fn log_venue_breakdown(report: &AggregationReport) {
    let mut venues: Vec<(&String, &VenueStat)> = report.venue_stats.iter().collect();
    venues.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
    for (venue, stat) in venues {
        info!(venue = %venue, events = stat.count, favorite = stat.favorite, "venue breakdown");
    }
}

pub fn list_upcoming(options: &ListOptions) -> Result<Vec<Event>> {
    let document = ConcertStore::new(&options.store_path).load()?;
    let today = options.today.unwrap_or_else(|| Utc::now().date_naive());
    let until = DateDuration::try_days(options.days.max(0))
        .and_then(|window| today.checked_add_signed(window))
        .unwrap_or(NaiveDate::MAX);

    let mut events: Vec<Event> = document
        .events
        .into_iter()
        .filter(|e| e.date >= today && e.date <= until)
        .filter(|e| !options.favorites_only || e.is_favorite_venue)
        .collect();
    sort_events(&mut events);
    Ok(events)
}

pub fn import_events(options: &ImportOptions) -> Result<usize> {
    let text = std::fs::read_to_string(&options.input)
        .with_context(|| format!("failed to read import file {}", options.input.display()))?;
    let events: Vec<Event> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse events in {}", options.input.display()))?;

    let added = ConcertStore::new(&options.store_path).append(events)?;
    info!(added, store = %options.store_path.display(), "import complete");
    Ok(added)
}

pub fn validate_configs(options: &ValidateOptions) -> Result<Vec<String>> {
    let mut messages = Vec::new();

    if let Some(file) = &options.source_file {
        let source = load_source_file(file)?;
        messages.push(format!(
            "OK: {} ({})",
            source.config.source.key,
            file.display()
        ));
        return Ok(messages);
    }

    if let Some(dir) = &options.config_dir {
        let sources = load_sources_from_dir(dir)?;
        for source in sources {
            messages.push(format!(
                "OK: {} rank={} ({})",
                source.config.source.key,
                source.config.source.rank,
                source.path.display()
            ));
        }
        return Ok(messages);
    }

    bail!("either --config-dir or --source-file must be provided");
}
