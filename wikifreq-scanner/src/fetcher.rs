use crate::error::{FetchError, Result};
use crate::result::Article;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Resolves an article title to its text and outbound links.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, title: &str) -> Result<Article>;
}

/// In-memory article graph. Unknown titles resolve to `FetchError::NotFound`.
///
/// Every call is recorded so tests can assert on what was (not) fetched.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    articles: HashMap<String, Article>,
    redirects: HashMap<String, String>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_article(mut self, title: &str, text: &str, links: &[&str]) -> Self {
        let links = links.iter().map(|l| l.to_string()).collect();
        self.articles
            .insert(title.to_string(), Article::new(title, text, links));
        self
    }

    /// Resolve `from` to the article stored under `to`, like a wiki redirect.
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Make `title` fail with an upstream 503.
    pub fn with_failure(mut self, title: &str) -> Self {
        self.failing.insert(title.to_string());
        self
    }

    /// Delay the response for `title`, for exercising fetch timeouts.
    pub fn with_delay(mut self, title: &str, delay: Duration) -> Self {
        self.delays.insert(title.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self, title: &str) -> usize {
        self.calls().iter().filter(|t| t.as_str() == title).count()
    }
}

#[async_trait]
impl ArticleFetcher for StaticFetcher {
    async fn fetch(&self, title: &str) -> Result<Article> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(title.to_string());

        if let Some(delay) = self.delays.get(title) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(title) {
            return Err(FetchError::Status {
                title: title.to_string(),
                status: 503,
            });
        }

        let target = self.redirects.get(title).map_or(title, String::as_str);
        self.articles
            .get(target)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(title.to_string()))
    }
}
