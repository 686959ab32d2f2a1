//! Runs API scenarios in declared order and records their outcomes

use std::time::Instant;
use tracing::info;

use smashly_common::{HarnessConfig, Result, SuiteRecorder, SuiteResult};

use crate::client::CatalogClient;
use crate::scenarios::{ApiContext, ApiScenario};

pub const SUITE_NAME: &str = "api";

/// Sequential runner for the API suite
pub struct ApiSuite {
    ctx: ApiContext,
}

impl ApiSuite {
    pub fn new(client: CatalogClient) -> Self {
        Self { ctx: ApiContext::new(client) }
    }

    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        Ok(Self::new(CatalogClient::from_config(config)?))
    }

    /// Run every scenario
    pub async fn run_all(&mut self) -> SuiteResult {
        self.run(&ApiScenario::ALL).await
    }

    /// Run the given scenarios in the order given. A failing scenario does
    /// not stop the ones after it.
    pub async fn run(&mut self, scenarios: &[ApiScenario]) -> SuiteResult {
        info!("Running {} API scenario(s) against {}", scenarios.len(), self.ctx.client.base());

        let mut recorder = SuiteRecorder::new(SUITE_NAME);
        for scenario in scenarios {
            let started = Instant::now();
            let outcome = scenario.run(&mut self.ctx).await;
            recorder.record(scenario.name(), scenario.description(), started, outcome);
        }
        recorder.finish()
    }
}
