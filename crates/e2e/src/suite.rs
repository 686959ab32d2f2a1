//! Runs catalog scenarios against one browser session and records outcomes

use std::time::{Duration, Instant};
use tracing::{error, info};

use smashly_common::{HarnessConfig, SuiteRecorder, SuiteResult};

use crate::browser::Browser;
use crate::error::E2eResult;
use crate::page::CatalogPage;
use crate::resolver::DriverResolver;
use crate::scenarios::CatalogScenario;

pub const SUITE_NAME: &str = "e2e";

/// Sequential runner for the catalog scenarios over any [`Browser`]
pub struct CatalogSuite<'a, B: Browser> {
    page: CatalogPage<'a, B>,
    catalog_url: String,
}

impl<'a, B: Browser> CatalogSuite<'a, B> {
    pub fn new(browser: &'a B, catalog_url: impl Into<String>, wait: Duration) -> Self {
        Self {
            page: CatalogPage::new(browser, wait),
            catalog_url: catalog_url.into(),
        }
    }

    pub async fn run_all(&self) -> SuiteResult {
        self.run(&CatalogScenario::ALL).await
    }

    /// Run the given scenarios in the order given. A failing scenario does
    /// not stop the ones after it.
    pub async fn run(&self, scenarios: &[CatalogScenario]) -> SuiteResult {
        info!("Running {} E2E scenario(s) against {}", scenarios.len(), self.catalog_url);

        let mut recorder = SuiteRecorder::new(SUITE_NAME);
        for scenario in scenarios {
            let started = Instant::now();
            let outcome = scenario.run(&self.page, &self.catalog_url).await;
            recorder.record(scenario.name(), scenario.description(), started, outcome);
        }
        recorder.finish()
    }
}

/// Bring up a browser, run `scenarios` and close the browser.
///
/// Fails only when no browser backend can be started. The session is closed
/// exactly once whatever the scenarios do.
pub async fn run_catalog_suite(config: &HarnessConfig, scenarios: &[CatalogScenario]) -> E2eResult<SuiteResult> {
    let catalog_url = config.catalog_url();
    info!("Frontend URL: {}", catalog_url);

    let session = DriverResolver::new(config.browser.clone()).resolve().await.map_err(|e| {
        error!("Cannot run the E2E suite: {}", e);
        e
    })?;

    let result = CatalogSuite::new(&session.driver, catalog_url, config.browser.wait_timeout())
        .run(scenarios)
        .await;

    session.quit().await;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeBrowser, BODY};

    const WAIT: Duration = Duration::from_millis(30);

    #[tokio::test]
    async fn test_suite_records_each_scenario_in_order() {
        let browser = FakeBrowser::catalog(&["Vertex 04 - Bullpadel - 219,95 €"]);
        let result = CatalogSuite::new(&browser, "http://localhost:5173/catalog", WAIT)
            .run_all()
            .await;

        assert_eq!(result.suite, SUITE_NAME);
        assert_eq!(result.total, 6);
        assert!(result.all_passed());
        let orders: Vec<usize> = result.results.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_siblings() {
        let browser = FakeBrowser::catalog(&["Vertex 04 - Bullpadel - 219,95 €"]);
        browser.append(BODY, "div", "Error: timeout");

        let result = CatalogSuite::new(&browser, "http://localhost:5173/catalog", WAIT)
            .run_all()
            .await;

        assert_eq!(result.failed, 1);
        assert_eq!(result.passed, 5);
        let failed = result.results.iter().find(|r| !r.success).unwrap();
        assert_eq!(failed.name, "displays_rackets");
        assert!(failed.error.as_deref().unwrap().contains("Error: timeout"));
    }
}
