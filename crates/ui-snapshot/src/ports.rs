use std::sync::Arc;

use async_trait::async_trait;
use droidlocate_core_types::SessionId;

use crate::errors::SnapshotError;
use crate::model::{Bounds, UiSnapshot};

/// Supplies the current UI hierarchy for a session.
///
/// Always the whole tree; element scopes are applied to the capture with
/// [`UiSnapshot::subtree`]. Must be cheap enough to call once per scroll
/// attempt.
#[async_trait]
pub trait UiTreeSource: Send + Sync {
    async fn snapshot(&self, session: &SessionId) -> Result<Arc<UiSnapshot>, SnapshotError>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ScrollDirection {
    #[default]
    Forward,
    Backward,
}

/// One swipe across a scrollable container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollGesture {
    pub container: Bounds,
    pub direction: ScrollDirection,
}

impl ScrollGesture {
    /// Swipe start and end points, keeping clear of the container edges.
    pub fn swipe_points(&self) -> ((i32, i32), (i32, i32)) {
        let (cx, _) = self.container.center();
        let margin = self.container.height() / 5;
        let upper = self.container.top + margin;
        let lower = self.container.bottom - margin;
        match self.direction {
            ScrollDirection::Forward => ((cx, lower), (cx, upper)),
            ScrollDirection::Backward => ((cx, upper), (cx, lower)),
        }
    }
}

/// Dispatches gestures to the device. Returns once the device acknowledged the
/// gesture; callers bound the wait.
#[async_trait]
pub trait GestureBridge: Send + Sync {
    async fn scroll(&self, session: &SessionId, gesture: &ScrollGesture)
        -> Result<(), SnapshotError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_swipe_moves_upwards() {
        let gesture = ScrollGesture {
            container: Bounds::new(0, 200, 1000, 1200),
            direction: ScrollDirection::Forward,
        };
        let (start, end) = gesture.swipe_points();
        assert_eq!(start, (500, 1000));
        assert_eq!(end, (500, 400));

        let backward = ScrollGesture {
            direction: ScrollDirection::Backward,
            ..gesture
        };
        assert_eq!(backward.swipe_points(), (end, start));
    }
}
