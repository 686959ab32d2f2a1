//! Suite commands and the flags shared by all of them

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::Args;

use smashly_common::{HarnessConfig, SuiteResult};

use crate::output::{self, OutputFormat};

pub mod api;
pub mod e2e;

/// Every scenario passed
pub const EXIT_OK: u8 = 0;
/// At least one scenario failed
pub const EXIT_FAILURES: u8 = 1;
/// The run could not happen (configuration or environment)
pub const EXIT_FATAL: u8 = 2;

/// Configuration flags, applied on top of file and environment values
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long, global = true, env = "SMASHLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, without the /api prefix
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Frontend base URL, without the /catalog route
    #[arg(long, global = true)]
    pub frontend_url: Option<String>,

    /// Browser to try first: chrome, firefox, edge or safari
    #[arg(long, global = true)]
    pub browser: Option<String>,

    /// Run the browser headless (true/false)
    #[arg(long, global = true)]
    pub headless: Option<bool>,

    /// Implicit element wait in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Explicit Chrome binary
    #[arg(long, global = true)]
    pub chrome_binary: Option<PathBuf>,

    /// Explicit Firefox binary
    #[arg(long, global = true)]
    pub firefox_binary: Option<PathBuf>,

    /// Remote WebDriver endpoint; skips local driver processes
    #[arg(long, global = true)]
    pub webdriver_url: Option<String>,

    /// Directory for <suite>-results.json files
    #[arg(short, long, global = true, env = "SMASHLY_OUTPUT")]
    pub output: Option<PathBuf>,
}

impl ConfigArgs {
    /// Resolve defaults, file and environment, then overlay these flags
    pub fn resolve(&self) -> anyhow::Result<HarnessConfig> {
        let mut config = HarnessConfig::resolve(self.config.as_deref())
            .context("failed to resolve configuration")?;
        self.apply(&mut config);
        Ok(config)
    }

    /// Overlay the flags that were given
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(url) = &self.frontend_url {
            config.frontend_url = url.clone();
        }
        if let Some(name) = &self.browser {
            config.browser.name = Some(name.clone());
        }
        if let Some(headless) = self.headless {
            config.browser.headless = headless;
        }
        if let Some(timeout) = self.timeout {
            config.browser.timeout_secs = timeout;
        }
        if let Some(path) = &self.chrome_binary {
            config.browser.chrome_binary = Some(path.clone());
        }
        if let Some(path) = &self.firefox_binary {
            config.browser.firefox_binary = Some(path.clone());
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = Some(url.clone());
        }
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
    }
}

/// Map requested scenario names through `lookup`, keeping declared order
/// when none are requested
pub fn select<S: Copy>(names: &[String], all: &[S], lookup: impl Fn(&str) -> Option<S>) -> anyhow::Result<Vec<S>> {
    if names.is_empty() {
        return Ok(all.to_vec());
    }
    names
        .iter()
        .map(|name| lookup(name).ok_or_else(|| anyhow!("unknown scenario '{}'", name)))
        .collect()
}

/// Print a suite result and write it under `output_dir`
pub fn report(result: &SuiteResult, format: OutputFormat, output_dir: &Path) -> anyhow::Result<()> {
    output::print_suite(result, format);
    result
        .write_to(output_dir)
        .with_context(|| format!("failed to write results to {}", output_dir.display()))?;
    Ok(())
}

/// Exit code for a set of completed suites
pub fn exit_code(results: &[SuiteResult]) -> u8 {
    if results.iter().all(SuiteResult::all_passed) {
        EXIT_OK
    } else {
        EXIT_FAILURES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use smashly_common::SuiteRecorder;
    use std::time::Instant;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    #[test]
    fn test_flags_override_config() {
        let cli = TestCli::try_parse_from([
            "smashly-check",
            "--api-url",
            "http://api.test:8080",
            "--browser",
            "firefox",
            "--headless",
            "false",
            "--timeout",
            "5",
            "--output",
            "out",
        ])
        .unwrap();

        let mut config = HarnessConfig::default();
        cli.config.apply(&mut config);

        assert_eq!(config.api_base(), "http://api.test:8080/api");
        assert_eq!(config.browser.name.as_deref(), Some("firefox"));
        assert!(!config.browser.headless);
        assert_eq!(config.browser.timeout_secs, 5);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.frontend_url, smashly_common::config::DEFAULT_FRONTEND_URL);
    }

    #[test]
    fn test_no_flags_leave_config_alone() {
        let mut config = HarnessConfig::default();
        ConfigArgs::default().apply(&mut config);
        assert_eq!(config.api_url, smashly_common::config::DEFAULT_API_URL);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_select_scenarios() {
        let all = [1, 2, 3];
        let lookup = |name: &str| name.parse::<i32>().ok().filter(|n| all.contains(n));

        assert_eq!(select(&[], &all, lookup).unwrap(), vec![1, 2, 3]);
        assert_eq!(select(&["3".to_string(), "1".to_string()], &all, lookup).unwrap(), vec![3, 1]);
        assert!(select(&["9".to_string()], &all, lookup).is_err());
    }

    #[test]
    fn test_exit_code() {
        let mut passing = SuiteRecorder::new("api");
        passing.record("health", "", Instant::now(), Ok::<(), String>(()));
        let passing = passing.finish();

        let mut failing = SuiteRecorder::new("e2e");
        failing.record("loads_catalog", "", Instant::now(), Err("boom"));
        let failing = failing.finish();

        assert_eq!(exit_code(&[passing.clone()]), EXIT_OK);
        assert_eq!(exit_code(&[passing, failing]), EXIT_FAILURES);
    }

    #[test]
    fn test_report_writes_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = SuiteRecorder::new("api");
        recorder.record("health", "", Instant::now(), Ok::<(), String>(()));

        report(&recorder.finish(), OutputFormat::Json, dir.path()).unwrap();
        assert!(dir.path().join("api-results.json").exists());
    }
}
