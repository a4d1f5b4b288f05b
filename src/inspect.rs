use crate::config::{
    ExtractConfig, FetchConfig, FetchMode, LoadedSource, SourceConfig, SourceKind, SourceMeta,
    load_sources_from_dir, parse_selector,
};
use crate::fetch::{Fetch, fetch_source_document};
use crate::parser::{element_text, extract_candidates};
use anyhow::{Context, Result, bail};
use scraper::Html;
use serde::Serialize;
use std::path::PathBuf;

const SAMPLE_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct InspectOptions {
    pub config_dir: PathBuf,
    pub source: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectorHit {
    pub selector: String,
    pub count: usize,
    pub sample_classes: Option<String>,
    pub sample_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub source: String,
    pub url: String,
    pub content_length: usize,
    pub title: String,
    pub containers: Vec<SelectorHit>,
    pub candidates: usize,
}

pub fn inspect_source(options: &InspectOptions, fetcher: &dyn Fetch) -> Result<InspectReport> {
    if let Some(url) = &options.url {
        return inspect_loaded(&adhoc_source(url)?, fetcher);
    }

    let Some(key) = &options.source else {
        bail!("either --source or --url must be provided");
    };
    let sources = load_sources_from_dir(&options.config_dir)?;
    let source = sources
        .iter()
        .find(|s| s.config.source.key == *key)
        .with_context(|| format!("no source configuration with key {key}"))?;
    inspect_loaded(source, fetcher)
}

fn adhoc_source(url: &str) -> Result<LoadedSource> {
    let config = SourceConfig {
        source: SourceMeta {
            key: "adhoc".to_string(),
            name: url.to_string(),
            kind: SourceKind::Aggregator,
            rank: 0,
            enabled: true,
            timezone: None,
            fixed_venue: None,
        },
        fetch: FetchConfig {
            mode: FetchMode::Http,
            url: Some(url.to_string()),
            ..FetchConfig::default()
        },
        extract: ExtractConfig::default(),
    };
    config.validate()?;

    Ok(LoadedSource {
        path: PathBuf::from("adhoc.toml"),
        config,
    })
}

pub fn inspect_loaded(source: &LoadedSource, fetcher: &dyn Fetch) -> Result<InspectReport> {
    let doc = fetch_source_document(source, fetcher)?;
    let candidates = extract_candidates(&source.config, &doc.body)?.len();

    let parsed = Html::parse_document(&doc.body);
    let title = parsed
        .select(&parse_selector("title")?)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let mut containers = Vec::new();
    for selector_text in &source.config.extract.containers {
        let selector = parse_selector(selector_text)?;
        let matches: Vec<_> = parsed.select(&selector).collect();
        let Some(first) = matches.first() else {
            continue;
        };

        containers.push(SelectorHit {
            selector: selector_text.clone(),
            count: matches.len(),
            sample_classes: first.value().attr("class").map(ToString::to_string),
            sample_text: element_text(*first).chars().take(SAMPLE_CHARS).collect(),
        });
    }

    Ok(InspectReport {
        source: source.config.source.key.clone(),
        url: doc.source_url,
        content_length: doc.body.len(),
        title,
        containers,
        candidates,
    })
}
