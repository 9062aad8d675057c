use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use wikifreq_core::report::{ReportFormat, ReportOptions, render_report, write_report};
use wikifreq_core::{
    FrequencyReport, FrequencyRequest, KeywordsRequest, RequestError, RunOptions,
    execute_frequency, execute_keywords,
};
use wikifreq_scanner::{FetchSettings, RetryPolicy, Tokenizer, WikipediaFetcher};

/// Exit status for invalid arguments
pub const EXIT_INVALID_INPUT: i32 = 2;
/// Exit status when the seed article could not be fetched
pub const EXIT_SEED_UNAVAILABLE: i32 = 3;
pub const EXIT_FAILURE: i32 = 1;

pub async fn handle_frequency(args: &ArgMatches) -> Result<()> {
    let request = FrequencyRequest {
        article: required_string(args, "article")?,
        depth: required_i64(args, "depth")?,
    };
    info!(
        "Frequency request for '{}' at depth {}",
        request.article, request.depth
    );

    let fetcher = Arc::new(WikipediaFetcher::with_settings(fetch_settings(args))?);
    let report = execute_frequency(fetcher, &request, run_options(args), None).await?;

    emit_report(&report, args)
}

pub async fn handle_keywords(args: &ArgMatches) -> Result<()> {
    let ignore_file = args.get_one::<PathBuf>("ignore-file");
    let ignore_words: Vec<String> = args
        .get_many::<String>("ignore")
        .map(|words| words.cloned().collect())
        .unwrap_or_default();

    let request = KeywordsRequest {
        article: required_string(args, "article")?,
        depth: required_i64(args, "depth")?,
        ignore_list: load_ignore_list(&ignore_words, ignore_file)?,
        percentile: required_i64(args, "percentile")?,
    };
    info!(
        "Keywords request for '{}' at depth {} (percentile {}, {} ignored words)",
        request.article,
        request.depth,
        request.percentile,
        request.ignore_list.len()
    );

    let fetcher = Arc::new(WikipediaFetcher::with_settings(fetch_settings(args))?);
    let report = execute_keywords(fetcher, &request, run_options(args), None).await?;

    emit_report(&report, args)
}

/// Combine `-i` words with the contents of `--ignore-file`
pub fn load_ignore_list(words: &[String], ignore_file: Option<&PathBuf>) -> Result<Vec<String>> {
    let mut ignore_list = words.to_vec();
    if let Some(path) = ignore_file {
        ignore_list.extend(load_words_from_file(path)?);
    }
    Ok(ignore_list)
}

/// Load one word per line, skipping blanks and `#` comments. `~` is expanded.
pub fn load_words_from_file(path: &Path) -> Result<Vec<String>> {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(path_str.as_ref());
    let expanded = Path::new(expanded.as_ref());

    let content = fs::read_to_string(expanded)
        .with_context(|| format!("Failed to read ignore file {}", expanded.display()))?;

    Ok(content.lines().filter_map(parse_word_line).collect())
}

pub fn parse_word_line(line: &str) -> Option<String> {
    let word = line.trim();
    if word.is_empty() || word.starts_with('#') {
        return None;
    }
    Some(word.to_string())
}

pub fn fetch_settings(args: &ArgMatches) -> FetchSettings {
    let defaults = FetchSettings::default();
    let retry = RetryPolicy::new(
        args.get_one::<u32>("retries").copied().unwrap_or(3),
        Duration::from_millis(args.get_one::<u64>("retry-base-delay").copied().unwrap_or(1000)),
        Duration::from_millis(args.get_one::<u64>("retry-max-delay").copied().unwrap_or(30_000)),
    );

    FetchSettings {
        api_url: args
            .get_one::<String>("api-url")
            .cloned()
            .unwrap_or(defaults.api_url),
        user_agent: args
            .get_one::<String>("user-agent")
            .cloned()
            .unwrap_or(defaults.user_agent),
        request_timeout: args
            .get_one::<u64>("timeout")
            .map(|secs| Duration::from_secs(*secs))
            .unwrap_or(defaults.request_timeout),
        connect_timeout: defaults.connect_timeout,
        retry,
    }
}

pub fn run_options(args: &ArgMatches) -> RunOptions {
    let defaults = RunOptions::default();
    RunOptions {
        tokenizer: Tokenizer::new().with_skip_numeric(args.get_flag("skip-numbers")),
        max_concurrency: args
            .get_one::<usize>("concurrency")
            .copied()
            .unwrap_or(defaults.max_concurrency),
        fetch_timeout: args
            .get_one::<u64>("fetch-timeout")
            .map(|secs| Duration::from_secs(*secs))
            .unwrap_or(defaults.fetch_timeout),
        show_progress_bars: !args.get_flag("quiet"),
    }
}

pub fn report_options(args: &ArgMatches) -> ReportOptions {
    ReportOptions {
        format: args
            .get_one::<String>("format")
            .and_then(|f| ReportFormat::from_str(f))
            .unwrap_or(ReportFormat::Text),
        percentages: args.get_flag("percentages"),
        top: args.get_one::<usize>("top").copied(),
    }
}

/// Map a failed run to the process exit status
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RequestError>() {
        Some(RequestError::SeedFetchFailure { .. }) => EXIT_SEED_UNAVAILABLE,
        Some(_) => EXIT_INVALID_INPUT,
        None => EXIT_FAILURE,
    }
}

fn emit_report(report: &FrequencyReport, args: &ArgMatches) -> Result<()> {
    let quiet = args.get_flag("quiet");
    let content = render_report(report, &report_options(args))?;

    if !quiet {
        print_summary(report);
    }

    match args.get_one::<PathBuf>("output") {
        Some(path) => {
            write_report(&content, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                eprintln!(
                    "{} Report saved to: {}",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
        }
        None => println!("{}", content),
    }

    Ok(())
}

fn print_summary(report: &FrequencyReport) {
    eprintln!(
        "{} {} articles fetched, {} words counted in {:.2}s",
        "✓".green().bold(),
        report.articles_fetched.to_string().bright_white(),
        report.table.len().to_string().bright_white(),
        report.elapsed.as_secs_f64()
    );
    for skipped in &report.skipped {
        eprintln!(
            "  {} skipped {}: {}",
            "⚠".yellow(),
            skipped.title.bright_white(),
            skipped.error
        );
    }
}

fn required_string(args: &ArgMatches, name: &str) -> Result<String> {
    match args.get_one::<String>(name) {
        Some(value) => Ok(value.clone()),
        None => bail!("missing required argument --{}", name),
    }
}

fn required_i64(args: &ArgMatches, name: &str) -> Result<i64> {
    match args.get_one::<i64>(name) {
        Some(value) => Ok(*value),
        None => bail!("missing required argument --{}", name),
    }
}
