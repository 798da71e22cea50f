//! Scroll-assisted search
//!
//! Resolve, and when nothing matches swipe the scrollable container once,
//! take a fresh snapshot and resolve again. The search ends when the target
//! appears, when a swipe leaves the region unchanged, when the attempt cap is
//! reached, or when the deadline elapses.

use std::sync::Arc;
use std::time::Duration;

use droidlocate_core_types::SessionId;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use ui_snapshot::{
    region_fingerprint, GestureBridge, NodeId, ScrollGesture, UiSnapshot, UiTreeSource,
};

use crate::errors::{ExhaustReason, LocatorError};
use crate::resolver::ElementResolver;
use crate::types::*;

enum SearchState {
    /// Resolve against the current snapshot. `region_unchanged` records what
    /// the preceding swipe did, if there was one.
    Searching { region_unchanged: bool },
    /// A swipe was performed; compare the region against `before`.
    ScrollAttempted { before: Option<u64> },
    Found(ElementRef),
    Exhausted(ExhaustReason),
}

/// Scroll-and-retry finder
pub struct ScrollFinder {
    source: Arc<dyn UiTreeSource>,
    gestures: Arc<dyn GestureBridge>,
    resolver: Arc<dyn ElementResolver>,
    policy: ScrollPolicy,
}

impl ScrollFinder {
    pub fn new(
        source: Arc<dyn UiTreeSource>,
        gestures: Arc<dyn GestureBridge>,
        resolver: Arc<dyn ElementResolver>,
    ) -> Self {
        Self {
            source,
            gestures,
            resolver,
            policy: ScrollPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ScrollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &ScrollPolicy {
        &self.policy
    }

    /// Search for `target`, scrolling the container named by `spec`.
    pub async fn find_with_scroll(
        &self,
        session: &SessionId,
        target: &SearchTarget,
        spec: &ScrollSpec,
    ) -> Result<ScrollOutcome, LocatorError> {
        let started = Instant::now();
        let mut attempts = 0usize;
        let mut snapshot = self.source.snapshot(session).await?;
        let mut state = SearchState::Searching {
            region_unchanged: false,
        };

        info!(
            session = %session,
            direction = ?spec.direction,
            max_attempts = self.policy.max_attempts,
            "starting scroll-assisted search"
        );

        loop {
            state = match state {
                SearchState::Searching { region_unchanged } => {
                    match self.resolver.first_match(&snapshot, target)? {
                        Some(element) => SearchState::Found(element),
                        None if region_unchanged => {
                            SearchState::Exhausted(ExhaustReason::RegionUnchanged)
                        }
                        None if attempts >= self.policy.max_attempts => {
                            SearchState::Exhausted(ExhaustReason::AttemptCap)
                        }
                        None => match self.remaining(started) {
                            None => SearchState::Exhausted(ExhaustReason::Deadline),
                            Some(remaining) => {
                                match self.container(&snapshot, spec)? {
                                    None => SearchState::Exhausted(
                                        ExhaustReason::NoScrollableContainer,
                                    ),
                                    Some(container) => {
                                        let before = region_fingerprint(&snapshot, container);
                                        let gesture = ScrollGesture {
                                            container: snapshot.get(container).bounds,
                                            direction: spec.direction,
                                        };
                                        match self.swipe(session, &gesture, remaining).await {
                                            Err(LocatorError::GestureTimeout(_))
                                                if self.remaining(started).is_none() =>
                                            {
                                                SearchState::Exhausted(ExhaustReason::Deadline)
                                            }
                                            Err(err) => return Err(err),
                                            Ok(()) => {
                                                attempts += 1;
                                                snapshot = self.source.snapshot(session).await?;
                                                SearchState::ScrollAttempted {
                                                    before: Some(before),
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        },
                    }
                }
                SearchState::ScrollAttempted { before } => {
                    let after = self
                        .container(&snapshot, spec)?
                        .map(|container| region_fingerprint(&snapshot, container));
                    let region_unchanged = after.is_some() && after == before;
                    debug!(attempts, region_unchanged, generation = %snapshot.generation(), "scrolled");
                    SearchState::Searching { region_unchanged }
                }
                SearchState::Found(element) => {
                    info!(attempts, node = element.node.0, "scroll search found element");
                    return Ok(ScrollOutcome {
                        element,
                        snapshot,
                        attempts,
                    });
                }
                SearchState::Exhausted(reason) => {
                    warn!(attempts, %reason, "scroll search exhausted");
                    return Err(LocatorError::ScrollExhausted { attempts, reason });
                }
            };
        }
    }

    /// Time left before the deadline. `None` once it has passed.
    fn remaining(&self, started: Instant) -> Option<Duration> {
        match self.policy.deadline {
            None => Some(self.policy.gesture_timeout),
            Some(deadline) => {
                let left = deadline.checked_sub(started.elapsed())?;
                if left.is_zero() {
                    None
                } else {
                    Some(left.min(self.policy.gesture_timeout))
                }
            }
        }
    }

    fn container(
        &self,
        snapshot: &UiSnapshot,
        spec: &ScrollSpec,
    ) -> Result<Option<NodeId>, LocatorError> {
        match &spec.container {
            Some(locator) => Ok(self.resolver.find(snapshot, locator, true)?.nodes.first().copied()),
            None => Ok(snapshot
                .iter()
                .find(|(_, node)| node.scrollable)
                .map(|(id, _)| id)),
        }
    }

    async fn swipe(
        &self,
        session: &SessionId,
        gesture: &ScrollGesture,
        limit: Duration,
    ) -> Result<(), LocatorError> {
        debug!(container = %gesture.container, direction = ?gesture.direction, "dispatching scroll gesture");
        match tokio::time::timeout(limit, self.gestures.scroll(session, gesture)).await {
            Ok(result) => result.map_err(LocatorError::from),
            Err(_) => Err(LocatorError::GestureTimeout(limit)),
        }
    }
}
