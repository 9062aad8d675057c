use serde::{Deserialize, Serialize};

/// A fetched article: its resolved title, plain text and outbound article links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub text: String,
    pub links: Vec<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, text: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            links,
        }
    }
}

/// Tokens extracted from one article, in text order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStream {
    pub title: String,
    pub tokens: Vec<String>,
}

/// A linked article that could not be fetched and was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedArticle {
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraversalResult {
    /// One stream per fetched article, breadth-first.
    pub streams: Vec<TokenStream>,
    /// Every title admitted to the frontier, in discovery order.
    pub visited: Vec<String>,
    pub errors: Vec<SkippedArticle>,
}

impl TraversalResult {
    pub fn fetched_count(&self) -> usize {
        self.streams.len()
    }

    pub fn token_count(&self) -> usize {
        self.streams.iter().map(|s| s.tokens.len()).sum()
    }
}
