//! Scenario and suite results

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

use crate::error::Result;

/// Outcome of a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Position in the declared suite order, starting at 1
    pub order: usize,
    pub name: String,
    pub description: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Outcome of a whole suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub suite: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Write results as pretty JSON to `<dir>/<suite>-results.json`
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join(format!("{}-results.json", self.suite));
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Accumulates scenario outcomes in declared order
pub struct SuiteRecorder {
    suite: String,
    started: Instant,
    started_at: chrono::DateTime<chrono::Utc>,
    results: Vec<ScenarioResult>,
}

impl SuiteRecorder {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            started: Instant::now(),
            started_at: chrono::Utc::now(),
            results: Vec::new(),
        }
    }

    /// Record one scenario outcome and log it
    pub fn record<E: std::fmt::Display>(
        &mut self,
        name: &str,
        description: &str,
        started: Instant,
        outcome: std::result::Result<(), E>,
    ) {
        let duration_ms = started.elapsed().as_millis() as u64;
        let order = self.results.len() + 1;

        let error = match outcome {
            Ok(()) => {
                info!("✓ {} ({} ms)", name, duration_ms);
                None
            }
            Err(e) => {
                error!("✗ {} - {}", name, e);
                Some(e.to_string())
            }
        };

        self.results.push(ScenarioResult {
            order,
            name: name.to_string(),
            description: description.to_string(),
            success: error.is_none(),
            duration_ms,
            error,
        });
    }

    pub fn finish(self) -> SuiteResult {
        let passed = self.results.iter().filter(|r| r.success).count();
        let failed = self.results.len() - passed;
        let duration_ms = self.started.elapsed().as_millis() as u64;

        info!(
            "{} results: {} passed, {} failed ({} ms)",
            self.suite, passed, failed, duration_ms
        );

        SuiteResult {
            suite: self.suite,
            total: self.results.len(),
            passed,
            failed,
            duration_ms,
            started_at: self.started_at,
            results: self.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_counts_and_orders() {
        let mut recorder = SuiteRecorder::new("api");
        recorder.record("health", "server is up", Instant::now(), Ok::<(), String>(()));
        recorder.record("search", "search works", Instant::now(), Err("no results".to_string()));

        let suite = recorder.finish();
        assert_eq!(suite.total, 2);
        assert_eq!(suite.passed, 1);
        assert_eq!(suite.failed, 1);
        assert!(!suite.all_passed());
        assert_eq!(suite.results[1].order, 2);
        assert_eq!(suite.results[1].error.as_deref(), Some("no results"));
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let suite = SuiteRecorder::new("e2e").finish();

        let path = suite.write_to(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "e2e-results.json");

        let back: SuiteResult = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back.suite, "e2e");
        assert!(back.all_passed());
    }
}
