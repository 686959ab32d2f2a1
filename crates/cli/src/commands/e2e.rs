//! `smashly-check e2e`

use anyhow::Context;
use clap::Args;

use smashly_common::{HarnessConfig, SuiteResult};
use smashly_e2e::{run_catalog_suite, CatalogScenario, DriverResolver};

use crate::commands::{report, select};
use crate::output::{self, OutputFormat};

#[derive(Args, Debug, Clone, Default)]
pub struct E2eArgs {
    /// Run only this scenario (repeatable; default: all, in declared order)
    #[arg(long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// List the scenarios and the browser plan, then exit
    #[arg(long)]
    pub list: bool,
}

pub async fn execute(args: &E2eArgs, config: &HarnessConfig, format: OutputFormat) -> anyhow::Result<Option<SuiteResult>> {
    if args.list {
        for scenario in CatalogScenario::ALL {
            println!("{:<24} {}", scenario.name(), scenario.description());
        }
        let plan: Vec<String> = DriverResolver::new(config.browser.clone())
            .plan()
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("Browser plan: {}", plan.join(" -> "));
        return Ok(None);
    }

    let scenarios = select(&args.scenarios, &CatalogScenario::ALL, CatalogScenario::from_name)?;

    if format == OutputFormat::Table {
        output::print_info(&format!("E2E suite against {}", config.catalog_url()));
    }

    let result = run_catalog_suite(config, &scenarios)
        .await
        .context("cannot run the E2E suite")?;

    report(&result, format, &config.output_dir)?;
    Ok(Some(result))
}
