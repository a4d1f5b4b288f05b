use crate::config::{FetchMode, LoadedSource, resolve_path};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub source_url: String,
    pub body: String,
}

/// One attempt per call; callers never retry.
pub trait Fetch {
    fn fetch(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<String>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher;

impl Fetch for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<String> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(build_headers(headers)?)
            .build()
            .context("failed to build reqwest client")?;

        let resp = client
            .get(url)
            .send()
            .with_context(|| format!("request to {url} failed"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("request to {url} failed with status {status}");
        }

        resp.text()
            .with_context(|| format!("failed to read body from {url}"))
    }
}

fn build_headers(extra: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
    );

    for (k, v) in extra {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

pub fn fetch_source_document(source: &LoadedSource, fetcher: &dyn Fetch) -> Result<FetchedDocument> {
    match source.config.fetch.mode {
        FetchMode::Http => fetch_http_document(source, fetcher),
        FetchMode::File => fetch_file_document(source),
        FetchMode::Inline => fetch_inline_document(source),
    }
}

fn fetch_http_document(source: &LoadedSource, fetcher: &dyn Fetch) -> Result<FetchedDocument> {
    let url = source
        .config
        .fetch
        .url
        .as_ref()
        .context("fetch.url missing")?;

    let mut headers = source.config.fetch.headers.clone();
    if let Some(user_agent) = &source.config.fetch.user_agent {
        headers.insert(USER_AGENT.as_str().to_string(), user_agent.clone());
    }

    let body = fetcher.fetch(
        url,
        &headers,
        Duration::from_secs(source.config.fetch.timeout_secs),
    )?;

    info!(
        source = %source.config.source.key,
        bytes = body.len(),
        url = %url,
        "fetched page"
    );

    Ok(FetchedDocument {
        source_url: url.clone(),
        body,
    })
}

fn fetch_file_document(source: &LoadedSource) -> Result<FetchedDocument> {
    let file_path = source
        .config
        .fetch
        .file_path
        .as_ref()
        .context("fetch.file_path missing for file mode")?;
    let resolved = resolve_path(&source.path, file_path)?;
    let bytes = std::fs::read(&resolved)
        .with_context(|| format!("failed to read file source {}", resolved.display()))?;

    info!(
        source = %source.config.source.key,
        file = %resolved.display(),
        bytes = bytes.len(),
        "loaded file source"
    );

    Ok(FetchedDocument {
        source_url: format!("file://{}", resolved.display()),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn fetch_inline_document(source: &LoadedSource) -> Result<FetchedDocument> {
    let inline = source
        .config
        .fetch
        .inline_data
        .as_ref()
        .context("fetch.inline_data missing for inline mode")?;

    debug!(
        source = %source.config.source.key,
        bytes = inline.len(),
        "loaded inline source"
    );

    Ok(FetchedDocument {
        source_url: format!("inline://{}", source.config.source.key),
        body: inline.clone(),
    })
}
