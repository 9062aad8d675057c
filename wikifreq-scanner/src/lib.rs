pub mod error;
pub mod fetcher;
pub mod result;
pub mod retry;
pub mod tokenizer;
pub mod traverser;
pub mod wikipedia;

pub use error::{FetchError, TraversalError};
pub use fetcher::{ArticleFetcher, StaticFetcher};
pub use result::{Article, SkippedArticle, TokenStream, TraversalResult};
pub use retry::RetryPolicy;
pub use tokenizer::{Tokenizer, tokenize};
pub use traverser::{ProgressCallback, Traverser, normalize_title};
pub use wikipedia::{FetchSettings, WikipediaFetcher};
