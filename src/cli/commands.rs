use clap::Subcommand;

use super::find::{FindArgs, FindFromArgs};
use super::mobile::MobileFindArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Locate elements in a snapshot with one strategy
    Find(FindArgs),

    /// Locate a parent element, then search inside it
    FindFrom(FindFromArgs),

    /// Run a `mobile: find` script, scrolling when the selector asks for it
    MobileFind(MobileFindArgs),

    /// List the strategies and categories the platform accepts
    Strategies,
}
