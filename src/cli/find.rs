use anyhow::Result;
use clap::Args;
use tracing::debug;
use wd_bridge::FindElementRequest;

use super::context::{CliContext, ReelArgs};
use super::output::{print_response, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct FindArgs {
    #[command(flatten)]
    pub reel: ReelArgs,

    /// Strategy name, e.g. "id", "xpath", "accessibility id"
    #[arg(long, allow_hyphen_values = true)]
    pub using: String,

    /// Selector passed to the strategy
    #[arg(long, allow_hyphen_values = true)]
    pub value: String,

    /// Return every match instead of the first
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Clone, Debug)]
pub struct FindFromArgs {
    #[command(flatten)]
    pub reel: ReelArgs,

    /// Strategy locating the parent element
    #[arg(long, allow_hyphen_values = true)]
    pub parent_using: String,

    /// Selector locating the parent element
    #[arg(long, allow_hyphen_values = true)]
    pub parent_value: String,

    /// Strategy applied inside the parent
    #[arg(long, allow_hyphen_values = true)]
    pub using: String,

    /// Selector applied inside the parent
    #[arg(long, allow_hyphen_values = true)]
    pub value: String,

    /// Return every match instead of the first
    #[arg(long)]
    pub all: bool,
}

pub async fn cmd_find(args: FindArgs, ctx: &CliContext, output: &OutputFormat) -> Result<u32> {
    let bridge = ctx.bridge(&args.reel)?;
    let session = ctx.session();
    let request = FindElementRequest::new(args.using, args.value);

    let response = if args.all {
        bridge.service.find_elements(session, &request).await
    } else {
        bridge.service.find_element(session, &request).await
    };

    print_response(output, &response, &bridge.described(session, &response))?;
    Ok(response.status)
}

pub async fn cmd_find_from(
    args: FindFromArgs,
    ctx: &CliContext,
    output: &OutputFormat,
) -> Result<u32> {
    let bridge = ctx.bridge(&args.reel)?;
    let session = ctx.session();

    let parent_request = FindElementRequest::new(args.parent_using, args.parent_value);
    let parent = bridge.service.find_element(session, &parent_request).await;
    let Some(parent_id) = parent.element().map(str::to_string) else {
        // The parent lookup failure is the command's answer.
        print_response(output, &parent, &[])?;
        return Ok(parent.status);
    };
    debug!(parent = %parent_id, "parent located");

    let request = FindElementRequest::new(args.using, args.value);
    let response = if args.all {
        bridge
            .service
            .find_elements_from_element(session, &parent_id, &request)
            .await
    } else {
        bridge
            .service
            .find_element_from_element(session, &parent_id, &request)
            .await
    };

    print_response(output, &response, &bridge.described(session, &response))?;
    Ok(response.status)
}
