use crate::error::{FetchError, Result};
use crate::fetcher::ArticleFetcher;
use crate::result::Article;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use scraper::Html;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_USER_AGENT: &str = "wikifreq/0.1 (https://github.com/trapdoorsec/wikifreq)";

/// Elements whose text never counts as article prose.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "table", "sup"];

static EDIT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*edit\s*\]").expect("edit marker pattern"));
static CITATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*\d+\s*\]").expect("citation marker pattern"));

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub api_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Fetches articles through the MediaWiki `action=parse` API.
pub struct WikipediaFetcher {
    client: Client,
    api_url: Url,
    retry: RetryPolicy,
}

impl WikipediaFetcher {
    pub fn new() -> Result<Self> {
        Self::with_settings(FetchSettings::default())
    }

    pub fn with_settings(settings: FetchSettings) -> Result<Self> {
        let api_url = Url::parse(&settings.api_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", settings.api_url, e)))?;

        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&settings.user_agent)
            .map_err(|e| FetchError::ParseError(format!("Invalid user agent: {}", e)))?;
        headers.insert("Api-User-Agent", agent);

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            api_url,
            retry: settings.retry,
        })
    }

    /// Fetch with retries on transient failures.
    pub async fn fetch_article(&self, title: &str) -> Result<Article> {
        let mut attempt = 0;
        loop {
            match self.request(title).await {
                Ok(article) => return Ok(article),
                Err(e) if self.retry.should_retry(attempt, &e) => {
                    let delay = self.retry.delay_for(attempt, &e);
                    warn!(
                        "Transient error fetching '{}' (attempt {}/{}): {}, retrying in {:?}",
                        title,
                        attempt + 1,
                        self.retry.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request(&self, title: &str) -> Result<Article> {
        debug!("Fetching page: {}", title);

        let response = self
            .client
            .get(self.api_url.clone())
            .query(&[
                ("action", "parse"),
                ("page", title),
                ("format", "json"),
                ("prop", "text|links"),
                ("redirects", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                title: title.to_string(),
                retry_after: parse_retry_after(response.headers()),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                title: title.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let article = parse_article(title, &body)?;
        debug!(
            "Fetched page '{}': {} chars, {} links",
            article.title,
            article.text.len(),
            article.links.len()
        );
        Ok(article)
    }
}

#[async_trait]
impl ArticleFetcher for WikipediaFetcher {
    async fn fetch(&self, title: &str) -> Result<Article> {
        self.fetch_article(title).await
    }
}

#[derive(Deserialize)]
struct ParseResponse {
    parse: Option<ParsePayload>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
}

#[derive(Deserialize)]
struct ParsePayload {
    title: Option<String>,
    #[serde(default)]
    text: Option<ParseText>,
    #[serde(default)]
    links: Vec<ParseLink>,
}

#[derive(Deserialize)]
struct ParseText {
    #[serde(rename = "*", default)]
    html: String,
}

#[derive(Deserialize)]
struct ParseLink {
    ns: i64,
    exists: Option<String>,
    #[serde(rename = "*")]
    title: String,
}

/// Turn a `action=parse` JSON body into an [`Article`].
pub fn parse_article(requested: &str, body: &str) -> Result<Article> {
    let response: ParseResponse = serde_json::from_str(body).map_err(|e| {
        FetchError::ParseError(format!("Invalid JSON response for '{}': {}", requested, e))
    })?;

    if let Some(error) = response.error {
        debug!("API error for '{}': {}", requested, error.code);
        return Err(FetchError::NotFound(requested.to_string()));
    }

    let payload = response.parse.ok_or_else(|| {
        FetchError::ParseError(format!("Missing parse payload for '{}'", requested))
    })?;

    let html = payload.text.map(|t| t.html).unwrap_or_default();
    let links = payload
        .links
        .into_iter()
        .filter(|link| link.ns == 0 && link.exists.is_some())
        .map(|link| link.title)
        .collect();

    Ok(Article {
        title: payload.title.unwrap_or_else(|| requested.to_string()),
        text: html_to_text(&html),
        links,
    })
}

/// Visible prose of an HTML fragment, one space between text nodes.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut pieces = Vec::new();

    for node in fragment.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        let piece = text.trim();
        if !hidden && !piece.is_empty() {
            pieces.push(piece);
        }
    }

    clean_text(&pieces.join(" "))
}

/// Strip `[edit]` and `[12]` markers and collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let text = EDIT_MARKER.replace_all(text, " ");
    let text = CITATION_MARKER.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let parsed = value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
    match parsed {
        Some(delay) => Some(delay),
        None => {
            warn!("Could not parse Retry-After header: {}", value);
            None
        }
    }
}
