pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod find;
pub mod mobile;
pub mod output;
pub mod runtime;
pub mod strategies;

pub use app::run;
pub use context::{CliContext, ReelArgs};
pub use env::CliArgs;
