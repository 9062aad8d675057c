// Report rendering for frequency results

use crate::frequency::{FrequencyTable, percentage_of};
use crate::orchestrator::FrequencyReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub format: ReportFormat,
    pub percentages: bool,
    /// Keep only the N most frequent words.
    pub top: Option<usize>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            percentages: false,
            top: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct WordEntry {
    count: u64,
    percentage: f64,
}

pub fn render_report(
    report: &FrequencyReport,
    options: &ReportOptions,
) -> Result<String, serde_json::Error> {
    match options.format {
        ReportFormat::Text => Ok(render_text(report, options)),
        ReportFormat::Json => render_json(&report.table, options),
        ReportFormat::Csv => Ok(render_csv(&report.table, options)),
    }
}

fn selected_rows<'a>(table: &'a FrequencyTable, options: &ReportOptions) -> Vec<(&'a str, u64)> {
    let mut rows = table.sorted_rows();
    if let Some(top) = options.top {
        rows.truncate(top);
    }
    rows
}

pub fn render_text(report: &FrequencyReport, options: &ReportOptions) -> String {
    let table = &report.table;
    let mut out = String::new();

    out.push_str(DIVIDER);
    out.push_str("\n\n# Summary:\n");
    out.push_str(&format!("  Seed article: {}\n", report.seed));
    out.push_str(&format!("  Depth: {}\n", report.depth));
    out.push_str(&format!("  Articles fetched: {}\n", report.articles_fetched));
    out.push_str(&format!("  Articles skipped: {}\n", report.skipped.len()));
    out.push_str(&format!("  Unique words: {}\n", table.len()));
    out.push_str(&format!("  Total occurrences: {}\n", table.total()));
    out.push('\n');
    out.push_str(DIVIDER);
    out.push_str("\n\n");

    let rows = selected_rows(table, options);
    if rows.is_empty() {
        out.push_str("  No words found.\n");
        return out;
    }

    let width = rows
        .iter()
        .map(|(_, count)| count.to_string().len())
        .max()
        .unwrap_or(1);

    let total = table.total();
    for (word, count) in rows {
        if options.percentages {
            out.push_str(&format!(
                "  {:>width$}  {:>7.3}%  {}\n",
                count,
                percentage_of(count, total),
                word,
                width = width
            ));
        } else {
            out.push_str(&format!("  {:>width$}  {}\n", count, word, width = width));
        }
    }

    out
}

pub fn render_json(
    table: &FrequencyTable,
    options: &ReportOptions,
) -> Result<String, serde_json::Error> {
    let rows = selected_rows(table, options);

    if options.percentages {
        let total = table.total();
        let entries: BTreeMap<&str, WordEntry> = rows
            .into_iter()
            .map(|(word, count)| {
                let entry = WordEntry {
                    count,
                    percentage: percentage_of(count, total),
                };
                (word, entry)
            })
            .collect();
        serde_json::to_string_pretty(&entries)
    } else {
        let entries: BTreeMap<&str, u64> = rows.into_iter().collect();
        serde_json::to_string_pretty(&entries)
    }
}

// Tokens are alphanumeric, so no field ever needs quoting.
pub fn render_csv(table: &FrequencyTable, options: &ReportOptions) -> String {
    let mut out = String::new();
    if options.percentages {
        out.push_str("word,count,percentage\n");
    } else {
        out.push_str("word,count\n");
    }

    let total = table.total();
    for (word, count) in selected_rows(table, options) {
        if options.percentages {
            out.push_str(&format!(
                "{},{},{:.4}\n",
                word,
                count,
                percentage_of(count, total)
            ));
        } else {
            out.push_str(&format!("{},{}\n", word, count));
        }
    }

    out
}

pub fn write_report(content: &str, output_path: &Path) -> std::io::Result<()> {
    let mut file = File::create(output_path)?;
    file.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    Ok(())
}
