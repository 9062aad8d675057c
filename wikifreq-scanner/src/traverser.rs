use crate::error::{FetchError, TraversalError};
use crate::fetcher::ArticleFetcher;
use crate::result::{Article, SkippedArticle, TokenStream, TraversalResult};
use crate::tokenizer::Tokenizer;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Called with (level, title) right before each fetch.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

pub const DEFAULT_MAX_CONCURRENCY: usize = 16;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Breadth-first walk over article links, bounded by depth.
///
/// Each level of the walk is fetched concurrently (up to `max_concurrency`
/// requests in flight) and its results are consumed in frontier order, so
/// the visited set is only ever touched between levels and the output order
/// is the plain BFS order.
pub struct Traverser {
    fetcher: Arc<dyn ArticleFetcher>,
    tokenizer: Tokenizer,
    max_concurrency: usize,
    fetch_timeout: Duration,
    progress_callback: Option<ProgressCallback>,
}

impl Traverser {
    pub fn new(fetcher: Arc<dyn ArticleFetcher>) -> Self {
        Self {
            fetcher,
            tokenizer: Tokenizer::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            progress_callback: None,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn traverse(
        &self,
        seed: &str,
        max_depth: usize,
    ) -> Result<TraversalResult, TraversalError> {
        info!("Starting traversal from '{}' with depth {}", seed, max_depth);
        let start = Instant::now();

        let mut result = TraversalResult::default();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(normalize_title(seed));
        result.visited.push(seed.to_string());

        let mut frontier = vec![seed.to_string()];
        let mut remaining = max_depth;
        let mut level = 0;

        while !frontier.is_empty() {
            debug!(
                "Level {}: {} article(s), {} hop(s) left",
                level,
                frontier.len(),
                remaining
            );

            let fetched: Vec<(String, Result<Article, FetchError>)> = stream::iter(frontier)
                .map(|title| async move {
                    let outcome = self.fetch_one(level, &title).await;
                    (title, outcome)
                })
                .buffered(self.max_concurrency)
                .collect()
                .await;

            let mut next = Vec::new();
            for (title, outcome) in fetched {
                let article = match outcome {
                    Ok(article) => article,
                    Err(source) if level == 0 => {
                        return Err(TraversalError::SeedFetch { title, source });
                    }
                    Err(e) => {
                        warn!("Failed to fetch '{}': {}", title, e);
                        result.errors.push(SkippedArticle {
                            title,
                            error: e.to_string(),
                        });
                        continue;
                    }
                };

                // A redirect target reached under another name counts as visited too.
                visited.insert(normalize_title(&article.title));

                if remaining > 0 {
                    for link in &article.links {
                        if visited.insert(normalize_title(link)) {
                            result.visited.push(link.clone());
                            next.push(link.clone());
                        }
                    }
                }

                result.streams.push(TokenStream {
                    tokens: self.tokenizer.tokenize(&article.text),
                    title,
                });
            }

            frontier = next;
            remaining = remaining.saturating_sub(1);
            level += 1;
        }

        info!(
            "Traversal complete: {} articles fetched, {} visited, {} errors in {:?}",
            result.streams.len(),
            result.visited.len(),
            result.errors.len(),
            start.elapsed()
        );
        Ok(result)
    }

    async fn fetch_one(&self, level: usize, title: &str) -> Result<Article, FetchError> {
        if let Some(ref callback) = self.progress_callback {
            callback(level, title.to_string());
        }

        debug!("Fetching '{}' at level {}", title, level);
        match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(title)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
        }
    }
}

/// Visitation key for a title: underscores as spaces, whitespace collapsed,
/// lowercase.
pub fn normalize_title(title: &str) -> String {
    title
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
