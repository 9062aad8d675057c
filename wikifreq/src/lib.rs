pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    exit_code, fetch_settings, handle_frequency, handle_keywords, load_ignore_list,
    load_words_from_file, parse_word_line, report_options, run_options,
};
