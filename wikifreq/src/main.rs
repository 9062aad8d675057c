use colored::Colorize;
use tracing_subscriber::EnvFilter;
use wikifreq::commands::command_argument_builder;
use wikifreq::handlers::{exit_code, handle_frequency, handle_keywords};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();

    let log_level = chosen_command
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("warn");
    init_tracing(log_level);

    let outcome = match chosen_command.subcommand() {
        Some(("frequency", primary_command)) => handle_frequency(primary_command).await,
        Some(("keywords", primary_command)) => handle_keywords(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(exit_code(&e));
    }
}

// RUST_LOG wins over --log-level; logs go to stderr so stdout stays the report.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
