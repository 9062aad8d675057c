use clap::{Command, arg, command};
use wikifreq_scanner::wikipedia::{DEFAULT_API_URL, DEFAULT_USER_AGENT};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> Command {
    Command::new("wikifreq")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wikifreq")
        .about("Word frequencies across a neighbourhood of Wikipedia articles")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress the progress spinner and summary")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"log-level" <LEVEL>)
                .required(false)
                .help("Log level used when RUST_LOG is not set")
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .default_value("warn")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(with_common_args(
            command!("frequency")
                .about("Count every word in the seed article and the articles it links to")
                .arg(article_arg())
                .arg(depth_arg()),
        ))
        .subcommand(with_common_args(
            command!("keywords")
                .about(
                    "Count words like `frequency`, then drop ignored words and everything below \
                a frequency percentile",
                )
                .arg(article_arg())
                .arg(depth_arg())
                .arg(
                    arg!(-p --"percentile" <PERCENTILE>)
                        .required(true)
                        .help("Keep words whose count is at or above this percentile (0-100)")
                        .value_parser(clap::value_parser!(i64))
                        .allow_negative_numbers(true),
                )
                .arg(
                    arg!(-i --"ignore" <WORD>)
                        .required(false)
                        .help("A word to leave out of the results (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"ignore-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of words to leave out")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        ))
}

fn article_arg() -> clap::Arg {
    arg!(-a --"article" <ARTICLE>)
        .required(true)
        .help("Title of the seed article, e.g. \"Rust (programming language)\"")
}

fn depth_arg() -> clap::Arg {
    arg!(-d --"depth" <DEPTH>)
        .required(true)
        .help("How many link hops to follow from the seed article (0 = seed only)")
        .value_parser(clap::value_parser!(i64))
        .allow_negative_numbers(true)
}

fn with_common_args(cmd: Command) -> Command {
    cmd.arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Report format: text, json, csv")
            .value_parser(["text", "json", "csv"])
            .default_value("text"),
    )
    .arg(
        arg!(--"percentages")
            .required(false)
            .help("Include each word's share of the total")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"top" <N>)
            .required(false)
            .help("Only report the N most frequent words")
            .value_parser(clap::value_parser!(usize)),
    )
    .arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Save report to file (default: display to screen)")
            .value_parser(clap::value_parser!(std::path::PathBuf)),
    )
    .arg(
        arg!(--"skip-numbers")
            .required(false)
            .help("Leave out tokens made only of digits")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(-t --"concurrency" <NUM>)
            .required(false)
            .help("Maximum number of articles fetched at once")
            .value_parser(clap::value_parser!(usize))
            .env("WIKIFREQ_CONCURRENCY")
            .default_value("16"),
    )
    .arg(
        arg!(--"fetch-timeout" <SECONDS>)
            .required(false)
            .help("Give up on a single article after this many seconds, retries included")
            .value_parser(clap::value_parser!(u64))
            .default_value("60"),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("HTTP request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("30"),
    )
    .arg(
        arg!(--"retries" <ATTEMPTS>)
            .required(false)
            .help("Total attempts per article on transient failures")
            .value_parser(clap::value_parser!(u32))
            .env("WIKIFREQ_RETRIES")
            .default_value("3"),
    )
    .arg(
        arg!(--"retry-base-delay" <MILLIS>)
            .required(false)
            .help("Initial retry backoff in milliseconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("1000"),
    )
    .arg(
        arg!(--"retry-max-delay" <MILLIS>)
            .required(false)
            .help("Upper bound on retry backoff in milliseconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("30000"),
    )
    .arg(
        arg!(--"user-agent" <AGENT>)
            .required(false)
            .help("User agent sent to the Wikipedia API")
            .env("WIKIFREQ_USER_AGENT")
            .default_value(DEFAULT_USER_AGENT),
    )
    .arg(
        arg!(--"api-url" <URL>)
            .required(false)
            .help("MediaWiki API endpoint")
            .env("WIKIFREQ_API_URL")
            .default_value(DEFAULT_API_URL),
    )
}
