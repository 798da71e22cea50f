use anyhow::Result;

use super::commands::Commands;
use super::context::CliContext;
use super::env::CliArgs;
use super::find::{cmd_find, cmd_find_from};
use super::mobile::cmd_mobile_find;
use super::strategies::cmd_strategies;

/// Runs the selected subcommand and returns the wire status it produced
pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<u32> {
    match cli.command.clone() {
        Commands::Find(args) => cmd_find(args, ctx, &cli.output).await,
        Commands::FindFrom(args) => cmd_find_from(args, ctx, &cli.output).await,
        Commands::MobileFind(args) => cmd_mobile_find(args, ctx, &cli.output).await,
        Commands::Strategies => cmd_strategies(ctx, &cli.output).await,
    }
}
