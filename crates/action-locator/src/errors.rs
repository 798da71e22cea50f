//! Error types for the locator engine

use std::fmt;
use std::time::Duration;

use droidlocate_core_types::{Platform, SnapshotGeneration};
use thiserror::Error;
use ui_snapshot::SnapshotError;

/// Why a scroll-assisted search gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustReason {
    /// The last gesture left the scrollable region unchanged.
    RegionUnchanged,
    /// The configured attempt cap was reached.
    AttemptCap,
    /// The search deadline elapsed.
    Deadline,
    /// Nothing on screen can be scrolled.
    NoScrollableContainer,
}

impl fmt::Display for ExhaustReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExhaustReason::RegionUnchanged => "end of scrollable region reached",
            ExhaustReason::AttemptCap => "scroll attempt limit reached",
            ExhaustReason::Deadline => "search deadline elapsed",
            ExhaustReason::NoScrollableContainer => "no scrollable container on screen",
        };
        f.write_str(text)
    }
}

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocatorError {
    /// Empty or malformed selector, rejected before traversal
    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    /// Singular resolution matched nothing
    #[error("no element matches {strategy} selector '{selector}'")]
    NotFound { strategy: String, selector: String },

    /// Strategy unknown or not implemented on this platform
    #[error("locator strategy '{strategy}' is not supported on {platform}")]
    UnsupportedStrategy { strategy: String, platform: Platform },

    /// Node category hidden from lookups on this platform
    #[error("finding elements by tag name '{category}' is not supported in {platform}")]
    RestrictedCategory { category: String, platform: Platform },

    /// Scroll-assisted search ended without a match
    #[error("element not found after {attempts} scroll attempt(s): {reason}")]
    ScrollExhausted {
        attempts: usize,
        reason: ExhaustReason,
    },

    /// Scope element belongs to another snapshot generation
    #[error("element reference from {held} is stale; current hierarchy is {current}")]
    StaleElement {
        held: SnapshotGeneration,
        current: SnapshotGeneration,
    },

    /// Scroll gesture was not acknowledged in time
    #[error("scroll gesture did not complete within {0:?}")]
    GestureTimeout(Duration),

    /// Snapshot or gesture port failure
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl LocatorError {
    pub fn invalid_selector(msg: impl Into<String>) -> Self {
        Self::InvalidSelector(msg.into())
    }
}
