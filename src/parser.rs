use crate::config::{ExtractStrategy, LoadedSource, SourceConfig, parse_selector};
use crate::date::{normalize_date_on, today_in};
use crate::fetch::FetchedDocument;
use crate::ident::assign_id_at;
use crate::model::{DEFAULT_GENRE, Event, RawCandidate, TBD};
use crate::text::{
    MONTH_NAME, contains_url, find_date_fragment, find_price, find_time, looks_like_date_or_day,
    looks_like_time_marker, looks_like_venue_marker, normalize_whitespace, split_time_and_price,
    strip_venue_marker,
};
use crate::venue::VenueCatalog;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, info};

const MIN_FIELD_LEN: usize = 3;
const HEADER_LOOKBACK: usize = 3;
const SKIPPED_TAGS: [&str; 7] = [
    "script", "style", "noscript", "template", "head", "title", "svg",
];

static DATE_HEADERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday),?\s*(?:{month})\.?\s+\d{1,2}",
        r"(?i)^(?:{month})\.?\s+\d{1,2}(?:st|nd|rd|th)?\b(?:,?\s*\d{4})?",
        r"(?i)^(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)(?:\s*[,.:\-]?\s*\d{1,2}(?:/\d{1,2}(?:/\d{4})?)?)?[.:]?$",
        r"^\d{1,2}[/-]\d{1,2}[/-]\d{4}$",
    ]
    .iter()
    .map(|pattern| {
        Regex::new(&pattern.replace("{month}", MONTH_NAME))
            .expect("date header regex must compile")
    })
    .collect()
});

static EVENT_LINES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^(.+?)\s+@\s+(.+)$", r"^(.+?)\s+at\s+(.+)$", r"^(.+?)\s+-\s+(.+)$"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("event line regex must compile"))
        .collect()
});

#[derive(Debug, Clone, Copy)]
pub struct ExtractContext {
    pub today: NaiveDate,
    pub now_millis: i64,
}

impl ExtractContext {
    pub fn now(timezone: Option<&str>) -> Self {
        Self {
            today: today_in(timezone),
            now_millis: Utc::now().timestamp_millis(),
        }
    }
}

pub fn parse_source_events(
    source: &LoadedSource,
    doc: &FetchedDocument,
    ctx: &ExtractContext,
) -> Result<Vec<Event>> {
    let candidates = extract_candidates(&source.config, &doc.body)?;
    let found = candidates.len();
    let catalog = VenueCatalog::global();

    let events: Vec<Event> = candidates
        .into_iter()
        .filter_map(|candidate| build_event(&source.config, candidate, catalog, ctx))
        .collect();

    info!(
        source = %source.config.source.key,
        url = %doc.source_url,
        candidates = found,
        events = events.len(),
        "extraction complete"
    );

    Ok(events)
}

pub fn extract_candidates(config: &SourceConfig, html: &str) -> Result<Vec<RawCandidate>> {
    let parsed = Html::parse_document(html);

    let roots: Vec<ElementRef<'_>> = match config.extract.root_selector.as_deref() {
        Some(selector) => parsed.select(&parse_selector(selector)?).collect(),
        None => vec![parsed.root_element()],
    };

    if roots.is_empty() {
        debug!(source = %config.source.key, "root selector matched nothing");
        return Ok(Vec::new());
    }

    match config.extract.strategy {
        ExtractStrategy::SelectorCascade => extract_cards(config, &roots),
        ExtractStrategy::DateHeaders => extract_date_scoped(config, &roots),
    }
}

pub fn build_event(
    config: &SourceConfig,
    candidate: RawCandidate,
    catalog: &VenueCatalog,
    ctx: &ExtractContext,
) -> Option<Event> {
    let Some(artist) = accept_name(&candidate.artist) else {
        debug!(source = %config.source.key, artist = %candidate.artist, "dropping candidate artist");
        return None;
    };

    let raw_venue = match &config.source.fixed_venue {
        Some(fixed) => fixed.clone(),
        None => accept_venue(&candidate.venue)?,
    };
    let venue = catalog.canonicalize(&raw_venue);
    let date = normalize_date_on(&candidate.date_text, &candidate.context, ctx.today);
    let id = assign_id_at(&artist, &venue, &candidate.date_text, ctx.now_millis);

    let mut metadata = BTreeMap::new();
    metadata.insert("original_venue".to_string(), raw_venue);
    if !candidate.date_text.is_empty() {
        metadata.insert("original_date_text".to_string(), candidate.date_text);
    }

    Some(Event {
        id,
        is_favorite_venue: catalog.is_favorite(&venue),
        artist,
        venue,
        date,
        time: candidate.time.unwrap_or_else(|| TBD.to_string()),
        price: candidate.price.unwrap_or_else(|| TBD.to_string()),
        genre: DEFAULT_GENRE.to_string(),
        source: config.source.name.clone(),
        metadata,
    })
}

struct FieldRule {
    selectors: Vec<Selector>,
    accept: fn(&str) -> Option<String>,
}

impl FieldRule {
    fn new(selectors: &[String], accept: fn(&str) -> Option<String>) -> Result<Self> {
        let selectors = selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selectors, accept })
    }

    fn first_accepted(&self, container: ElementRef<'_>) -> Option<String> {
        self.selectors.iter().find_map(|selector| {
            let text = container.select(selector).next().map(element_text)?;
            if text.is_empty() {
                return None;
            }
            (self.accept)(&text)
        })
    }
}

struct CardRules {
    artist: FieldRule,
    venue: FieldRule,
    date: FieldRule,
    time: FieldRule,
    price: FieldRule,
}

impl CardRules {
    fn from_config(config: &SourceConfig) -> Result<Self> {
        let fields = &config.extract.fields;
        Ok(Self {
            artist: FieldRule::new(&fields.artist, accept_name)?,
            venue: FieldRule::new(&fields.venue, accept_venue)?,
            date: FieldRule::new(&fields.date, accept_date_text)?,
            time: FieldRule::new(&fields.time, accept_time)?,
            price: FieldRule::new(&fields.price, accept_price)?,
        })
    }
}

fn extract_cards(config: &SourceConfig, roots: &[ElementRef<'_>]) -> Result<Vec<RawCandidate>> {
    let rules = CardRules::from_config(config)?;

    for container_selector in &config.extract.containers {
        let selector = parse_selector(container_selector)?;
        let containers: Vec<ElementRef<'_>> = roots
            .iter()
            .flat_map(|root| root.select(&selector))
            .collect();
        if containers.is_empty() {
            continue;
        }

        let candidates: Vec<RawCandidate> = containers
            .iter()
            .filter_map(|container| read_card(config, &rules, *container))
            .collect();

        debug!(
            source = %config.source.key,
            selector = %container_selector,
            containers = containers.len(),
            candidates = candidates.len(),
            "container selector tried"
        );

        if !candidates.is_empty() {
            return Ok(candidates);
        }
    }

    debug!(source = %config.source.key, "no container selector produced candidates");
    Ok(Vec::new())
}

fn read_card(
    config: &SourceConfig,
    rules: &CardRules,
    container: ElementRef<'_>,
) -> Option<RawCandidate> {
    let full_text = element_text(container);
    let artist = rules.artist.first_accepted(container)?;

    let venue = match &config.source.fixed_venue {
        Some(fixed) => fixed.clone(),
        None => rules.venue.first_accepted(container)?,
    };

    let date_text = rules
        .date
        .first_accepted(container)
        .or_else(|| find_date_fragment(&full_text))
        .or_else(|| preceding_header_date(container))
        .unwrap_or_default();

    let time = rules
        .time
        .first_accepted(container)
        .or_else(|| find_time(&full_text));
    let price = rules
        .price
        .first_accepted(container)
        .or_else(|| find_price(&full_text));

    Some(RawCandidate {
        artist,
        venue,
        date_text,
        context: full_text,
        time,
        price,
    })
}

fn preceding_header_date(container: ElementRef<'_>) -> Option<String> {
    container
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .take(HEADER_LOOKBACK)
        .find_map(|sibling| find_date_fragment(&element_text(sibling)))
}

fn extract_date_scoped(
    config: &SourceConfig,
    roots: &[ElementRef<'_>],
) -> Result<Vec<RawCandidate>> {
    let any_element = parse_selector("*")?;
    let mut candidates = Vec::new();
    let mut current_date: Option<String> = None;

    for node in roots.iter().flat_map(|root| root.select(&any_element)) {
        if SKIPPED_TAGS.contains(&node.value().name()) || !has_direct_text(node) {
            continue;
        }

        let text = element_text(node);
        if text.chars().count() < MIN_FIELD_LEN {
            continue;
        }

        if is_date_header(&text) {
            debug!(source = %config.source.key, header = %text, "date header");
            current_date = Some(text);
            continue;
        }

        let Some(date_text) = current_date.as_ref() else {
            continue;
        };
        if text.chars().count() < config.extract.min_line_len {
            continue;
        }

        if let Some(mut candidate) = match_event_line(&text) {
            candidate.date_text = date_text.clone();
            candidate.context = text;
            candidates.push(candidate);
        }
    }

    Ok(candidates)
}

pub fn is_date_header(text: &str) -> bool {
    let trimmed = text.trim();
    DATE_HEADERS.iter().any(|re| re.is_match(trimmed))
}

/// First pattern whose halves pass the field filters wins.
pub fn match_event_line(text: &str) -> Option<RawCandidate> {
    if contains_url(text) {
        return None;
    }

    EVENT_LINES.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let artist = accept_name(caps.get(1)?.as_str())?;
        let (venue, time, price) = split_time_and_price(caps.get(2)?.as_str());
        let venue = accept_venue(&venue)?;
        Some(RawCandidate {
            artist,
            venue,
            time,
            price,
            ..RawCandidate::default()
        })
    })
}

fn accept_name(text: &str) -> Option<String> {
    let text = normalize_whitespace(text);
    if text.chars().count() < MIN_FIELD_LEN
        || looks_like_date_or_day(&text)
        || looks_like_venue_marker(&text)
        || looks_like_time_marker(&text)
        || contains_url(&text)
    {
        return None;
    }
    Some(text)
}

fn accept_venue(text: &str) -> Option<String> {
    let (rest, _, _) = split_time_and_price(&strip_venue_marker(text));
    let rest = rest.trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace());
    accept_name(rest)
}

fn accept_date_text(text: &str) -> Option<String> {
    let text = normalize_whitespace(text);
    if text.is_empty() {
        return None;
    }
    Some(find_date_fragment(&text).unwrap_or(text))
}

fn accept_time(text: &str) -> Option<String> {
    if !looks_like_time_marker(text) {
        return None;
    }
    Some(find_time(text).unwrap_or_else(|| normalize_whitespace(text)))
}

fn accept_price(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if !lower.contains('$') && !lower.contains("free") {
        return None;
    }
    Some(find_price(text).unwrap_or_else(|| normalize_whitespace(text)))
}

fn has_direct_text(node: ElementRef<'_>) -> bool {
    node.children()
        .any(|child| child.value().as_text().is_some_and(|t| !t.trim().is_empty()))
}

pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}
