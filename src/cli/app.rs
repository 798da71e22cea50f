use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config, LoadedConfig};
use crate::config::Config;

pub async fn run() -> Result<u32> {
    let cli = CliArgs::parse();

    let loaded = load_config(cli.config.as_ref()).await?;
    let mut config = loaded.config.clone();
    apply_cli_overrides(&mut config, &cli);

    init_logging(&config.log_level, cli.debug, cli.log_json)?;
    loaded.report();
    info!("Starting droidlocate v{}", env!("CARGO_PKG_VERSION"));

    let LoadedConfig { path, .. } = loaded;
    let cli_context = CliContext::new(config, path);

    match dispatch(&cli, &cli_context).await {
        Ok(status) if status == action_locator::STATUS_SUCCESS => {
            info!("Command completed successfully");
            Ok(status)
        }
        Ok(status) => {
            warn!(status, "Command returned a failure status");
            Ok(status)
        }
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}

/// Command-line flags win over the config file
pub fn apply_cli_overrides(config: &mut Config, cli: &CliArgs) {
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(platform) = cli.platform {
        config.platform = platform;
    }
    if let Some(max) = cli.max_scrolls {
        config.scroll.max_attempts = max;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidlocate_core_types::Platform;

    #[test]
    fn flags_override_file_values() {
        let cli = CliArgs::parse_from([
            "droidlocate",
            "--platform",
            "ios",
            "--max-scrolls",
            "2",
            "--log-level",
            "warn",
            "strategies",
        ]);
        let mut config = Config::default();
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.platform, Platform::Ios);
        assert_eq!(config.scroll.max_attempts, 2);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn absent_flags_keep_file_values() {
        let cli = CliArgs::parse_from(["droidlocate", "strategies"]);
        let mut config = Config::default();
        config.scroll.max_attempts = 7;
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.scroll.max_attempts, 7);
        assert_eq!(config.platform, Platform::Android);
    }
}
