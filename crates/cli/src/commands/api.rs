//! `smashly-check api`

use anyhow::Context;
use clap::Args;

use smashly_api::{ApiScenario, ApiSuite};
use smashly_common::{HarnessConfig, SuiteResult};

use crate::commands::{report, select};
use crate::output::{self, OutputFormat};

#[derive(Args, Debug, Clone, Default)]
pub struct ApiArgs {
    /// Run only this scenario (repeatable; default: all, in declared order)
    #[arg(long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// List the scenarios and exit
    #[arg(long)]
    pub list: bool,
}

pub async fn execute(args: &ApiArgs, config: &HarnessConfig, format: OutputFormat) -> anyhow::Result<Option<SuiteResult>> {
    if args.list {
        for scenario in ApiScenario::ALL {
            println!("{:<24} {}", scenario.name(), scenario.description());
        }
        return Ok(None);
    }

    let scenarios = select(&args.scenarios, &ApiScenario::ALL, ApiScenario::from_name)?;

    if format == OutputFormat::Table {
        output::print_info(&format!("API suite against {}", config.api_base()));
    }

    let mut suite = ApiSuite::from_config(config).context("failed to build the API client")?;
    let result = suite.run(&scenarios).await;

    report(&result, format, &config.output_dir)?;
    Ok(Some(result))
}
