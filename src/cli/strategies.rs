use action_locator::{restricted_categories, supported_strategies, LocatorStrategy};
use anyhow::Result;
use droidlocate_core_types::Platform;
use serde::Serialize;

use super::context::CliContext;
use super::output::{print_report, OutputFormat};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StrategyReport {
    pub platform: Platform,
    pub supported: Vec<&'static str>,
    pub denied: Vec<&'static str>,
    pub restricted_categories: Vec<&'static str>,
}

impl StrategyReport {
    pub fn for_platform(platform: Platform) -> Self {
        let supported = supported_strategies(platform);
        let denied = LocatorStrategy::all()
            .into_iter()
            .filter(|strategy| !supported.contains(strategy))
            .map(|strategy| strategy.name())
            .collect();
        Self {
            platform,
            supported: supported.iter().map(LocatorStrategy::name).collect(),
            denied,
            restricted_categories: restricted_categories(platform).to_vec(),
        }
    }
}

pub async fn cmd_strategies(ctx: &CliContext, output: &OutputFormat) -> Result<u32> {
    let report = StrategyReport::for_platform(ctx.config().platform);
    print_report(output, &report)?;
    Ok(action_locator::STATUS_SUCCESS)
}
