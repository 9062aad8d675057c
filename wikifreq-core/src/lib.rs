pub mod error;
pub mod filter;
pub mod frequency;
pub mod orchestrator;
pub mod report;

pub use error::{FilterError, RequestError};
pub use filter::{IgnoreList, KeywordFilter, Percentile, filter, percentile_threshold};
pub use frequency::{FrequencyTable, aggregate, percentage_of};
pub use orchestrator::{
    FrequencyReport, FrequencyRequest, KeywordsRequest, Orchestrator, RunOptions,
    execute_frequency, execute_keywords,
};
pub use report::{ReportFormat, ReportOptions, render_report, write_report};
