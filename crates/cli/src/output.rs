//! Output formatting for suite results

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

use smashly_common::{ScenarioResult, SuiteResult};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for ScenarioResult {
    fn headers() -> Vec<&'static str> {
        vec!["#", "Scenario", "Description", "Result", "Time", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.order.to_string(),
            self.name.clone(),
            self.description.clone(),
            if self.success { "PASS".to_string() } else { "FAIL".to_string() },
            format!("{} ms", self.duration_ms),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

/// Build the results table for one suite
pub fn suite_table(result: &SuiteResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(ScenarioResult::headers());
    for scenario in &result.results {
        let color = if scenario.success { Color::Green } else { Color::Red };
        let cells: Vec<Cell> = scenario
            .row()
            .into_iter()
            .enumerate()
            .map(|(i, value)| if i == 3 { Cell::new(value).fg(color) } else { Cell::new(value) })
            .collect();
        table.add_row(cells);
    }
    table
}

/// One-line pass/fail count for a suite
pub fn summary_line(result: &SuiteResult) -> String {
    format!(
        "{}: {} passed, {} failed of {} ({} ms)",
        result.suite, result.passed, result.failed, result.total, result.duration_ms
    )
}

/// Print a suite's results
pub fn print_suite(result: &SuiteResult, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{}", suite_table(result));
            let summary = summary_line(result);
            if result.all_passed() {
                print_success(&summary);
            } else {
                print_error(&summary);
            }
        }
        OutputFormat::Json => print_json(result),
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use smashly_common::SuiteRecorder;
    use std::time::Instant;

    fn sample() -> SuiteResult {
        let mut recorder = SuiteRecorder::new("api");
        recorder.record("health", "Server reports healthy", Instant::now(), Ok::<(), String>(()));
        recorder.record(
            "search",
            "Search finds common brands",
            Instant::now(),
            Err("Assertion failed: no results"),
        );
        recorder.finish()
    }

    #[test]
    fn test_scenario_row() {
        let result = sample();
        let row = result.results[1].row();
        assert_eq!(row.len(), ScenarioResult::headers().len());
        assert_eq!(row[0], "2");
        assert_eq!(row[3], "FAIL");
        assert_eq!(row[5], "Assertion failed: no results");
    }

    #[test]
    fn test_table_lists_every_scenario() {
        let rendered = suite_table(&sample()).to_string();
        assert!(rendered.contains("health"));
        assert!(rendered.contains("search"));
        assert!(rendered.contains("PASS"));
    }

    #[test]
    fn test_summary_line() {
        let summary = summary_line(&sample());
        assert!(summary.starts_with("api: 1 passed, 1 failed of 2"));
    }
}
