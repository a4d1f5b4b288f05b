use anyhow::{Context, Result, anyhow, bail};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub config: SourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub source: SourceMeta,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.source.key.trim().is_empty() {
            bail!("source.key must not be empty");
        }
        if self.source.name.trim().is_empty() {
            bail!("source.name must not be empty");
        }
        if let Some(venue) = &self.source.fixed_venue
            && venue.trim().is_empty()
        {
            bail!("source.fixed_venue must not be blank when set");
        }

        match self.fetch.mode {
            FetchMode::Http => {
                let url = self
                    .fetch
                    .url
                    .as_ref()
                    .context("fetch.url is required for http mode")?;
                Url::parse(url).with_context(|| format!("fetch.url is not a valid url: {url}"))?;
            }
            FetchMode::File => {
                if self.fetch.file_path.is_none() {
                    bail!("fetch.file_path is required for file mode");
                }
            }
            FetchMode::Inline => {
                if self.fetch.inline_data.is_none() {
                    bail!("fetch.inline_data is required for inline mode");
                }
            }
        }

        if let Some(root) = &self.extract.root_selector {
            parse_selector(root).context("invalid extract.root_selector")?;
        }

        if self.extract.strategy == ExtractStrategy::SelectorCascade {
            if self.extract.containers.is_empty() {
                bail!("extract.containers must not be empty for selector_cascade");
            }
            for selector in &self.extract.containers {
                parse_selector(selector).context("invalid extract.containers entry")?;
            }
            for (field, selectors) in self.extract.fields.iter() {
                for selector in selectors {
                    parse_selector(selector)
                        .with_context(|| format!("invalid extract.fields.{field} entry"))?;
                }
            }
            if self.extract.fields.artist.is_empty() {
                bail!("extract.fields.artist must not be empty");
            }
            if self.extract.fields.venue.is_empty() && self.source.fixed_venue.is_none() {
                bail!("extract.fields.venue must not be empty without source.fixed_venue");
            }
        }

        Ok(())
    }

    pub fn display_url(&self) -> String {
        match self.fetch.mode {
            FetchMode::Http => self.fetch.url.clone().unwrap_or_default(),
            FetchMode::File => self
                .fetch
                .file_path
                .as_ref()
                .map(|p| format!("file://{}", p.display()))
                .unwrap_or_default(),
            FetchMode::Inline => format!("inline://{}", self.source.key),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Venue,
    #[default]
    Aggregator,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceMeta {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub kind: SourceKind,
    /// Lower ranks run first and win duplicate listings.
    #[serde(default = "default_rank")]
    pub rank: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub fixed_venue: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    #[default]
    Http,
    File,
    Inline,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub mode: FetchMode,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub inline_data: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Http,
            url: None,
            file_path: None,
            inline_data: None,
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtractStrategy {
    #[default]
    SelectorCascade,
    DateHeaders,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub strategy: ExtractStrategy,
    #[serde(default)]
    pub root_selector: Option<String>,
    #[serde(default = "default_containers")]
    pub containers: Vec<String>,
    #[serde(default)]
    pub fields: FieldSelectors,
    #[serde(default = "default_min_line_len")]
    pub min_line_len: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractStrategy::SelectorCascade,
            root_selector: None,
            containers: default_containers(),
            fields: FieldSelectors::default(),
            min_line_len: default_min_line_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldSelectors {
    #[serde(default = "default_artist_selectors")]
    pub artist: Vec<String>,
    #[serde(default = "default_venue_selectors")]
    pub venue: Vec<String>,
    #[serde(default = "default_date_selectors")]
    pub date: Vec<String>,
    #[serde(default = "default_time_selectors")]
    pub time: Vec<String>,
    #[serde(default = "default_price_selectors")]
    pub price: Vec<String>,
}

impl FieldSelectors {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Vec<String>)> {
        [
            ("artist", &self.artist),
            ("venue", &self.venue),
            ("date", &self.date),
            ("time", &self.time),
            ("price", &self.price),
        ]
        .into_iter()
    }
}

impl Default for FieldSelectors {
    fn default() -> Self {
        Self {
            artist: default_artist_selectors(),
            venue: default_venue_selectors(),
            date: default_date_selectors(),
            time: default_time_selectors(),
            price: default_price_selectors(),
        }
    }
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|err| anyhow!("invalid selector {selector}: {err:?}"))
}

pub fn load_sources_from_dir(config_dir: &Path) -> Result<Vec<LoadedSource>> {
    if !config_dir.exists() {
        bail!("config dir does not exist: {}", config_dir.display());
    }

    let mut loaded = Vec::new();
    for entry in WalkDir::new(config_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("toml") {
            continue;
        }

        loaded.push(load_source_file(path)?);
    }

    let mut seen = BTreeMap::new();
    for source in &loaded {
        if let Some(previous) = seen.insert(source.config.source.key.clone(), &source.path) {
            bail!(
                "duplicate source key {} in {} and {}",
                source.config.source.key,
                previous.display(),
                source.path.display()
            );
        }
    }

    sort_by_rank(&mut loaded);
    Ok(loaded)
}

pub fn load_source_file(config_path: &Path) -> Result<LoadedSource> {
    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read source config: {}", config_path.display()))?;
    let config: SourceConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", config_path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid source config {}", config_path.display()))?;
    Ok(LoadedSource {
        path: config_path.to_path_buf(),
        config,
    })
}

pub fn sort_by_rank(sources: &mut [LoadedSource]) {
    sources.sort_by(|a, b| {
        (a.config.source.rank, &a.config.source.key)
            .cmp(&(b.config.source.rank, &b.config.source.key))
    });
}

pub fn resolve_path(base_config_path: &Path, maybe_relative: &Path) -> Result<PathBuf> {
    if maybe_relative.is_absolute() {
        return Ok(maybe_relative.to_path_buf());
    }

    let parent = base_config_path.parent().ok_or_else(|| {
        anyhow!(
            "source config has no parent directory: {}",
            base_config_path.display()
        )
    })?;

    Ok(parent.join(maybe_relative))
}

fn default_true() -> bool {
    true
}

fn default_rank() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_min_line_len() -> usize {
    15
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn default_containers() -> Vec<String> {
    strings(&[
        ".event-item",
        ".show-item",
        ".concert-item",
        ".listing-item",
        ".event",
        ".show",
        ".concert",
        ".listing",
        "[class*=\"event-\"]",
        "[class*=\"show-\"]",
        "[class*=\"concert-\"]",
        ".calendar-event",
        ".upcoming-show",
        ".event-listing",
        "article",
        ".post",
        ".entry",
    ])
}

fn default_artist_selectors() -> Vec<String> {
    strings(&[
        ".artist-name",
        ".headline",
        ".artist",
        ".performer",
        ".band",
        ".event-title",
        ".title",
        ".name",
        "h1",
        "h2",
        "h3",
        "h4",
        "[class*=\"artist\"]",
        "[class*=\"headline\"]",
        "[class*=\"title\"]",
        "[class*=\"name\"]",
        "[class*=\"performer\"]",
    ])
}

fn default_venue_selectors() -> Vec<String> {
    strings(&[
        ".venue-name",
        ".venue",
        ".location",
        ".place",
        "[class*=\"venue\"]",
        "[class*=\"location\"]",
        "[class*=\"place\"]",
    ])
}

fn default_date_selectors() -> Vec<String> {
    strings(&[
        ".date",
        ".event-date",
        ".show-date",
        ".when",
        "[class*=\"date\"]",
        "[class*=\"when\"]",
        ".datetime",
        ".schedule",
    ])
}

fn default_time_selectors() -> Vec<String> {
    strings(&[
        ".time",
        ".show-time",
        ".start-time",
        ".doors",
        "[class*=\"time\"]",
        ".schedule",
    ])
}

fn default_price_selectors() -> Vec<String> {
    strings(&[
        ".price",
        ".cost",
        ".ticket-price",
        ".admission",
        "[class*=\"price\"]",
        "[class*=\"cost\"]",
        "[class*=\"ticket\"]",
    ])
}
