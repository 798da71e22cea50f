use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::info;
use wd_bridge::{ExecuteRequest, MOBILE_FIND_SCRIPT};

use super::context::{CliContext, ReelArgs};
use super::output::{print_response, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct MobileFindArgs {
    #[command(flatten)]
    pub reel: ReelArgs,

    /// Script arguments as JSON, e.g. '[["scroll", [[3, "Views"]]]]'
    #[arg(long, value_name = "JSON", allow_hyphen_values = true)]
    pub args: String,

    /// Script name routed through `execute`
    #[arg(long, default_value = MOBILE_FIND_SCRIPT)]
    pub script: String,
}

pub async fn cmd_mobile_find(
    args: MobileFindArgs,
    ctx: &CliContext,
    output: &OutputFormat,
) -> Result<u32> {
    let script_args: Value =
        serde_json::from_str(&args.args).context("Script arguments are not valid JSON")?;
    let bridge = ctx.bridge(&args.reel)?;
    let session = ctx.session();

    let request = ExecuteRequest {
        script: args.script,
        args: script_args,
    };
    let response = bridge.service.execute(session, &request).await;
    info!(
        status = response.status,
        scrolls = bridge.reel.gesture_count(),
        "mobile find finished"
    );

    print_response(output, &response, &bridge.described(session, &response))?;
    Ok(response.status)
}
