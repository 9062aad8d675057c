use crate::error::RequestError;
use crate::filter::{IgnoreList, KeywordFilter, Percentile};
use crate::frequency::{FrequencyTable, aggregate};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;
use wikifreq_scanner::traverser::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENCY};
use wikifreq_scanner::{
    ArticleFetcher, ProgressCallback, SkippedArticle, Tokenizer, TraversalResult, Traverser,
};

/// Entry point A: word frequencies around a seed article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRequest {
    pub article: String,
    pub depth: i64,
}

/// Entry point B: frequencies filtered by an ignore list and a percentile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordsRequest {
    pub article: String,
    pub depth: i64,
    #[serde(default)]
    pub ignore_list: Vec<String>,
    pub percentile: i64,
}

/// Options for configuring how requests traverse
pub struct RunOptions {
    pub tokenizer: Tokenizer,
    pub max_concurrency: usize,
    pub fetch_timeout: Duration,
    pub show_progress_bars: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tokenizer: Tokenizer::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            show_progress_bars: false,
        }
    }
}

/// The final table plus what the traversal went through to build it.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyReport {
    pub seed: String,
    pub depth: usize,
    pub table: FrequencyTable,
    pub articles_fetched: usize,
    pub visited: Vec<String>,
    pub skipped: Vec<SkippedArticle>,
    pub total_tokens: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Runs requests against one fetcher: validate, traverse, aggregate and
/// (for keywords) filter.
pub struct Orchestrator {
    fetcher: Arc<dyn ArticleFetcher>,
    options: RunOptions,
    progress_callback: Option<ProgressCallback>,
}

impl Orchestrator {
    pub fn new(fetcher: Arc<dyn ArticleFetcher>) -> Self {
        Self {
            fetcher,
            options: RunOptions::default(),
            progress_callback: None,
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn frequency(
        &self,
        request: &FrequencyRequest,
    ) -> Result<FrequencyReport, RequestError> {
        let seed = validate_article(&request.article)?;
        let depth = validate_depth(request.depth)?;

        let (traversal, elapsed) = self.traverse(seed, depth).await?;
        let table = aggregate(&traversal.streams);

        Ok(build_report(seed, depth, table, traversal, elapsed))
    }

    pub async fn keywords(
        &self,
        request: &KeywordsRequest,
    ) -> Result<FrequencyReport, RequestError> {
        let seed = validate_article(&request.article)?;
        let depth = validate_depth(request.depth)?;
        let percentile = validate_percentile(request.percentile)?;
        let ignore_list: IgnoreList = request.ignore_list.iter().collect();
        let filter = KeywordFilter::with_percentile(ignore_list, percentile);

        let (traversal, elapsed) = self.traverse(seed, depth).await?;
        let raw = aggregate(&traversal.streams);
        let table = filter.apply(&raw);
        info!(
            "Keyword filter kept {} of {} words (percentile {}, {} ignored)",
            table.len(),
            raw.len(),
            filter.percentile().value(),
            filter.ignore_list().len()
        );

        Ok(build_report(seed, depth, table, traversal, elapsed))
    }

    async fn traverse(
        &self,
        seed: &str,
        depth: usize,
    ) -> Result<(TraversalResult, Duration), RequestError> {
        // Single spinner for overall progress (only if enabled)
        let progress_bar = if self.options.show_progress_bars {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(100));
            pb.set_message(format!("Fetching '{}'...", seed));
            Some(pb)
        } else {
            None
        };

        let fetched_count = Arc::new(AtomicUsize::new(0));
        let user_callback = self.progress_callback.clone();
        let pb_clone = progress_bar.clone();
        let count_clone = fetched_count.clone();
        let callback: ProgressCallback = Arc::new(move |level: usize, title: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Depth {} | {} articles | {}", level, count, title));
            }
            if let Some(ref cb) = user_callback {
                cb(level, title);
            }
        });

        let traverser = Traverser::new(self.fetcher.clone())
            .with_tokenizer(self.options.tokenizer)
            .with_max_concurrency(self.options.max_concurrency)
            .with_fetch_timeout(self.options.fetch_timeout)
            .with_progress_callback(callback);

        let start = Instant::now();
        let outcome = traverser.traverse(seed, depth).await;
        let elapsed = start.elapsed();

        if let Some(pb) = progress_bar {
            match outcome {
                Ok(ref result) => pb.finish_with_message(format!(
                    "Done! {} articles fetched, {} skipped",
                    result.fetched_count(),
                    result.errors.len()
                )),
                Err(_) => pb.finish_and_clear(),
            }
        }

        Ok((outcome?, elapsed))
    }
}

pub fn validate_article(article: &str) -> Result<&str, RequestError> {
    let trimmed = article.trim();
    if trimmed.is_empty() {
        return Err(RequestError::InvalidArticle);
    }
    Ok(trimmed)
}

pub fn validate_depth(depth: i64) -> Result<usize, RequestError> {
    usize::try_from(depth).map_err(|_| RequestError::InvalidDepth(depth))
}

pub fn validate_percentile(percentile: i64) -> Result<Percentile, RequestError> {
    Ok(Percentile::try_from(percentile)?)
}

fn build_report(
    seed: &str,
    depth: usize,
    table: FrequencyTable,
    traversal: TraversalResult,
    elapsed: Duration,
) -> FrequencyReport {
    FrequencyReport {
        seed: seed.to_string(),
        depth,
        articles_fetched: traversal.fetched_count(),
        total_tokens: traversal.token_count(),
        visited: traversal.visited,
        skipped: traversal.errors,
        table,
        elapsed,
    }
}

/// Plain frequency table for a request.
pub async fn execute_frequency(
    fetcher: Arc<dyn ArticleFetcher>,
    request: &FrequencyRequest,
    options: RunOptions,
    progress_callback: Option<ProgressCallback>,
) -> Result<FrequencyReport, RequestError> {
    orchestrator(fetcher, options, progress_callback)
        .frequency(request)
        .await
}

/// Filtered keyword table for a request.
pub async fn execute_keywords(
    fetcher: Arc<dyn ArticleFetcher>,
    request: &KeywordsRequest,
    options: RunOptions,
    progress_callback: Option<ProgressCallback>,
) -> Result<FrequencyReport, RequestError> {
    orchestrator(fetcher, options, progress_callback)
        .keywords(request)
        .await
}

fn orchestrator(
    fetcher: Arc<dyn ArticleFetcher>,
    options: RunOptions,
    progress_callback: Option<ProgressCallback>,
) -> Orchestrator {
    let orchestrator = Orchestrator::new(fetcher).with_options(options);
    match progress_callback {
        Some(callback) => orchestrator.with_progress_callback(callback),
        None => orchestrator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_article_trims() {
        assert_eq!(validate_article("  Rust  ").unwrap(), "Rust");
        assert!(matches!(
            validate_article("   "),
            Err(RequestError::InvalidArticle)
        ));
    }

    #[test]
    fn test_validate_depth() {
        assert_eq!(validate_depth(0).unwrap(), 0);
        assert_eq!(validate_depth(3).unwrap(), 3);
        assert!(matches!(
            validate_depth(-1),
            Err(RequestError::InvalidDepth(-1))
        ));
    }

    #[test]
    fn test_validate_percentile() {
        assert_eq!(validate_percentile(42).unwrap().value(), 42);
        assert!(matches!(
            validate_percentile(150),
            Err(RequestError::InvalidPercentile(150))
        ));
    }

    #[test]
    fn test_keywords_request_deserializes() {
        let json = r#"{"article": "Rust", "depth": 1, "ignore_list": ["the"], "percentile": 50}"#;
        let request: KeywordsRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.article, "Rust");
        assert_eq!(request.ignore_list, vec!["the"]);

        let json = r#"{"article": "Rust", "depth": 1, "percentile": 50}"#;
        let request: KeywordsRequest = serde_json::from_str(json).unwrap();
        assert!(request.ignore_list.is_empty());
    }
}
