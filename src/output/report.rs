//! Markdown report generation
//!
//! Renders a [`RunResult`] as the human-readable report handed back to the
//! caller: the run summary, then per dork its summary line, failure count and
//! the first few successful pages.

use crate::config::OutputConfig;
use crate::crawler::{CrawlResult, DorkOutcome, RunResult};
use crate::output::traits::{OutputHandler, OutputResult};
use std::path::{Path, PathBuf};

const MAX_HEADINGS: usize = 3;
const MAX_CONTACT_EXCERPTS: usize = 2;
const CONTACT_EXCERPT_CHARS: usize = 200;

/// Cuts `text` to at most `max` characters, marking the cut with "..."
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

/// Formats a run as markdown
///
/// # Arguments
///
/// * `run` - The finished run
/// * `output` - Report limits (results per dork, preview length)
///
/// # Returns
///
/// A formatted markdown string
pub fn format_report(run: &RunResult, output: &OutputConfig) -> String {
    let mut md = String::new();
    let stats = &run.stats;

    md.push_str("# Dorkscan Report\n\n");
    md.push_str(&format!("- **Query**: {}\n", run.query));
    md.push_str(&format!("- **Dorks**: {}\n", stats.dorks_processed));
    md.push_str(&format!("- **Search Results**: {}\n", stats.total_search_results));
    md.push_str(&format!(
        "- **Pages Crawled**: {} ({} ok, {} failed)\n",
        stats.total_crawled, stats.successful_crawls, stats.failed_crawls
    ));
    md.push_str(&format!("- **Unique Domains**: {}\n", stats.unique_domains));
    md.push_str(&format!(
        "- **Batches**: {} (avg {:.2}s)\n\n",
        stats.total_batches,
        stats.average_batch_duration_ms / 1000.0
    ));
    md.push_str(&format!("{}\n\n", run.summary));

    if !stats.zero_result_dorks.is_empty() {
        md.push_str("## Dorks Without Results\n\n");
        md.push_str("No search hits; the engine may have blocked these requests.\n\n");
        for dork in &stats.zero_result_dorks {
            md.push_str(&format!("- `{}`\n", dork));
        }
        md.push('\n');
    }

    for outcome in &run.dork_results {
        format_dork(&mut md, outcome, output);
    }

    md
}

fn format_dork(md: &mut String, outcome: &DorkOutcome, output: &OutputConfig) {
    md.push_str(&format!("## {}\n\n", outcome.dork));
    md.push_str(&format!("{}\n\n", outcome.summary));
    if outcome.failed_crawls > 0 {
        md.push_str(&format!(
            "_{} page(s) could not be crawled._\n\n",
            outcome.failed_crawls
        ));
    }

    for result in outcome.successful().take(output.max_results_per_dork) {
        format_result(md, result, output.preview_chars);
    }
}

fn format_result(md: &mut String, result: &CrawlResult, preview_chars: usize) {
    let title = if result.title.is_empty() {
        result.domain.as_str()
    } else {
        result.title.as_str()
    };
    md.push_str(&format!("### {}\n\n", title));
    md.push_str(&format!("- **Domain**: {}\n", result.domain));
    md.push_str(&format!("- **URL**: {}\n", result.url));
    md.push_str(&format!("- **Batch**: {}\n", result.batch_id));

    let headings: Vec<&str> = result
        .content
        .headings
        .iter()
        .take(MAX_HEADINGS)
        .map(String::as_str)
        .collect();
    if !headings.is_empty() {
        md.push_str(&format!("- **Headings**: {}\n", headings.join(" | ")));
    }
    md.push('\n');

    if !result.content.all_text.is_empty() {
        md.push_str(&format!(
            "> {}\n\n",
            truncate_chars(&result.content.all_text, preview_chars)
        ));
    }

    if !result.content.contact_sections.is_empty() {
        md.push_str("**Contact:**\n\n");
        for excerpt in result
            .content
            .contact_sections
            .iter()
            .take(MAX_CONTACT_EXCERPTS)
        {
            md.push_str(&format!(
                "- {}\n",
                truncate_chars(excerpt, CONTACT_EXCERPT_CHARS)
            ));
        }
        md.push('\n');
    }
}

/// Writes the markdown report to `path`
pub fn write_report(run: &RunResult, output: &OutputConfig, path: &Path) -> OutputResult<()> {
    std::fs::write(path, format_report(run, output))?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

/// Output handler writing the markdown report to a fixed path
pub struct MarkdownReportHandler {
    path: PathBuf,
    limits: OutputConfig,
}

impl MarkdownReportHandler {
    pub fn new(path: impl Into<PathBuf>, limits: OutputConfig) -> Self {
        Self {
            path: path.into(),
            limits,
        }
    }
}

impl OutputHandler for MarkdownReportHandler {
    fn name(&self) -> &str {
        "markdown"
    }

    fn write_run(&self, run: &RunResult) -> OutputResult<()> {
        write_report(run, &self.limits, &self.path)
    }
}
