use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init_logging(level: &str, debug: bool, json: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    pub found: bool,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    // Logging is not installed yet; the caller reports where the config came from.
    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(LoadedConfig {
            config,
            path: config_path,
            found: true,
        })
    } else {
        Ok(LoadedConfig {
            config: Config::default(),
            path: config_path,
            found: false,
        })
    }
}

impl LoadedConfig {
    pub fn report(&self) {
        if self.found {
            info!("Loaded configuration from: {}", self.path.display());
        } else {
            warn!(
                "Config file not found, using defaults: {}",
                self.path.display()
            );
        }
    }
}

// ./config/droidlocate.yaml wins over the per-user file
fn default_config_path() -> Result<PathBuf> {
    let local_config = PathBuf::from("config/droidlocate.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("droidlocate");
    path.push("config.yaml");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidlocate_core_types::Platform;
    use std::io::Write;

    #[tokio::test]
    async fn explicit_path_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "platform: ios\nlog_level: debug").expect("write");
        let path = file.path().to_path_buf();

        let loaded = load_config(Some(&path)).await.expect("config loads");
        assert_eq!(loaded.config.platform, Platform::Ios);
        assert_eq!(loaded.config.log_level, "debug");
        assert_eq!(loaded.path, path);
        assert!(loaded.found);
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.yaml");
        let loaded = load_config(Some(&path)).await.expect("defaults");
        assert_eq!(loaded.config, Config::default());
        assert!(!loaded.found);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "scroll: [1, 2").expect("write");
        let path = file.path().to_path_buf();
        let err = load_config(Some(&path)).await.err().expect("parse error");
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
