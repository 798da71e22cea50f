use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use droidlocate_core_types::SessionId;
use tracing::info;
use ui_snapshot::SnapshotReel;
use wd_bridge::{BridgePolicyHandle, ElementModel, LocatorService, WireResponse};

use crate::config::Config;

const CLI_SESSION_ID: &str = "cli";

/// Snapshot fixtures replayed as a device
#[derive(Args, Clone, Debug)]
pub struct ReelArgs {
    /// Snapshot JSON file; repeat to add frames, each scroll advances one
    #[arg(long = "fixture", value_name = "FILE", required = true)]
    pub fixtures: Vec<PathBuf>,

    /// Delay before the fixture device acknowledges a scroll
    #[arg(long, value_name = "MS")]
    pub gesture_delay_ms: Option<u64>,
}

pub struct CliContext {
    config: Arc<Config>,
    config_path: PathBuf,
    session: SessionId,
}

/// A bridge wired to a fixture reel for one command
pub struct FixtureBridge {
    pub service: LocatorService,
    pub reel: Arc<SnapshotReel>,
}

impl CliContext {
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            session: SessionId::from(CLI_SESSION_ID),
        }
    }

    pub fn config(&self) -> &Config {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn bridge(&self, reel: &ReelArgs) -> Result<FixtureBridge> {
        let mut device = SnapshotReel::load(&reel.fixtures).context("Failed to load fixtures")?;
        if let Some(ms) = reel.gesture_delay_ms {
            device = device.with_gesture_delay(Duration::from_millis(ms));
        }
        info!(
            frames = device.frame_count(),
            platform = %self.config.platform,
            "fixture device ready"
        );
        let device = Arc::new(device);
        let policy = BridgePolicyHandle::new(self.config.bridge_policy());
        let service = LocatorService::new(device.clone(), device.clone(), policy);
        Ok(FixtureBridge {
            service,
            reel: device,
        })
    }
}

impl FixtureBridge {
    /// Stored models for every handle in a response
    pub fn described(
        &self,
        session: &SessionId,
        response: &WireResponse,
    ) -> Vec<(String, ElementModel)> {
        let handles = match response.element() {
            Some(handle) => vec![handle],
            None => response.elements(),
        };
        handles
            .into_iter()
            .filter_map(|handle| {
                self.service
                    .store()
                    .element_entry(session, handle)
                    .map(|model| (handle.to_string(), model))
            })
            .collect()
    }
}
