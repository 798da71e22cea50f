use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use droidlocate_core_types::{SessionId, SnapshotGeneration};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::debug;

use crate::errors::SnapshotError;
use crate::model::{NodeSpec, UiSnapshot};
use crate::ports::{GestureBridge, ScrollDirection, ScrollGesture, UiTreeSource};

/// Fixture device replaying a fixed sequence of hierarchy frames.
///
/// Every forward scroll advances one frame and every backward scroll rewinds
/// one, clamping at both ends. Frame `i` carries generation `i + 1`, so a
/// clamped scroll returns the same generation and region.
pub struct SnapshotReel {
    frames: Vec<Arc<UiSnapshot>>,
    position: Mutex<usize>,
    gestures: AtomicUsize,
    gesture_delay: Option<Duration>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Frames(Vec<NodeSpec>),
    Single(NodeSpec),
}

impl SnapshotReel {
    pub fn new(frames: Vec<NodeSpec>) -> Result<Self, SnapshotError> {
        if frames.is_empty() {
            return Err(SnapshotError::InvalidSpec(
                "a reel needs at least one frame".to_string(),
            ));
        }
        let frames = frames
            .iter()
            .enumerate()
            .map(|(idx, spec)| {
                UiSnapshot::from_spec(spec, SnapshotGeneration(idx as u64 + 1)).map(Arc::new)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            frames,
            position: Mutex::new(0),
            gestures: AtomicUsize::new(0),
            gesture_delay: None,
        })
    }

    /// Loads frames from JSON files. Each file holds one hierarchy or an
    /// array of consecutive frames.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, SnapshotError> {
        let mut specs = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let fixture_err = |reason: String| SnapshotError::Fixture {
                path: path.display().to_string(),
                reason,
            };
            let raw = std::fs::read_to_string(path).map_err(|err| fixture_err(err.to_string()))?;
            let parsed: FixtureFile =
                serde_json::from_str(&raw).map_err(|err| fixture_err(err.to_string()))?;
            match parsed {
                FixtureFile::Frames(frames) => specs.extend(frames),
                FixtureFile::Single(spec) => specs.push(spec),
            }
        }
        Self::new(specs)
    }

    /// Delay applied before each gesture is acknowledged.
    pub fn with_gesture_delay(mut self, delay: Duration) -> Self {
        self.gesture_delay = Some(delay);
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn position(&self) -> usize {
        *self.position.lock()
    }

    /// Number of scroll gestures received so far.
    pub fn gesture_count(&self) -> usize {
        self.gestures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UiTreeSource for SnapshotReel {
    async fn snapshot(&self, session: &SessionId) -> Result<Arc<UiSnapshot>, SnapshotError> {
        let position = *self.position.lock();
        debug!(session = %session, frame = position, "serving fixture frame");
        self.frames
            .get(position)
            .cloned()
            .ok_or_else(|| SnapshotError::source(format!("frame {position} out of range")))
    }
}

#[async_trait]
impl GestureBridge for SnapshotReel {
    async fn scroll(
        &self,
        session: &SessionId,
        gesture: &ScrollGesture,
    ) -> Result<(), SnapshotError> {
        if let Some(delay) = self.gesture_delay {
            tokio::time::sleep(delay).await;
        }
        self.gestures.fetch_add(1, Ordering::SeqCst);
        let mut position = self.position.lock();
        let last = self.frames.len() - 1;
        *position = match gesture.direction {
            ScrollDirection::Forward => (*position + 1).min(last),
            ScrollDirection::Backward => position.saturating_sub(1),
        };
        let (start, end) = gesture.swipe_points();
        debug!(
            session = %session,
            frame = *position,
            direction = ?gesture.direction,
            ?start,
            ?end,
            "fixture scroll applied"
        );
        Ok(())
    }
}
