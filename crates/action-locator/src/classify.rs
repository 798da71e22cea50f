//! Boundary classification of locator outcomes
//!
//! Every [`LocatorError`] collapses into one [`FindFailure`] carrying the
//! numeric status clients understand.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::LocatorError;

pub const STATUS_SUCCESS: u32 = 0;
pub const STATUS_NO_SUCH_ELEMENT: u32 = 7;
pub const STATUS_UNKNOWN_COMMAND: u32 = 9;
pub const STATUS_STALE_ELEMENT: u32 = 10;
pub const STATUS_UNKNOWN_ERROR: u32 = 13;
pub const STATUS_TIMEOUT: u32 = 21;
pub const STATUS_INVALID_SELECTOR: u32 = 32;

/// Message sent with status 9. Clients match on its wording.
pub const UNKNOWN_COMMAND_MESSAGE: &str = "The requested resource could not be found, or a request was received using an HTTP method that is not supported by the mapped resource.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidSelector,
    NoSuchElement,
    UnsupportedStrategy,
    RestrictedCategory,
    ScrollExhausted,
    StaleElement,
    Timeout,
    Unknown,
}

impl FailureKind {
    pub fn status(&self) -> u32 {
        match self {
            FailureKind::InvalidSelector => STATUS_INVALID_SELECTOR,
            FailureKind::NoSuchElement | FailureKind::ScrollExhausted => STATUS_NO_SUCH_ELEMENT,
            FailureKind::UnsupportedStrategy => STATUS_UNKNOWN_COMMAND,
            FailureKind::RestrictedCategory | FailureKind::Unknown => STATUS_UNKNOWN_ERROR,
            FailureKind::StaleElement => STATUS_STALE_ELEMENT,
            FailureKind::Timeout => STATUS_TIMEOUT,
        }
    }
}

/// Structured failure handed to the command surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindFailure {
    pub kind: FailureKind,
    pub status: u32,
    pub message: String,
}

impl FindFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: kind.status(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FindFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}: {}", self.status, self.message)
    }
}

impl std::error::Error for FindFailure {}

impl From<&LocatorError> for FindFailure {
    fn from(err: &LocatorError) -> Self {
        classify(err)
    }
}

impl From<LocatorError> for FindFailure {
    fn from(err: LocatorError) -> Self {
        classify(&err)
    }
}

pub fn classify(err: &LocatorError) -> FindFailure {
    match err {
        LocatorError::InvalidSelector(_) => {
            FindFailure::new(FailureKind::InvalidSelector, err.to_string())
        }
        LocatorError::NotFound { .. } => FindFailure::new(
            FailureKind::NoSuchElement,
            format!("An element could not be located on the page using the given search parameters. ({err})"),
        ),
        LocatorError::UnsupportedStrategy { .. } => {
            FindFailure::new(FailureKind::UnsupportedStrategy, UNKNOWN_COMMAND_MESSAGE)
        }
        LocatorError::RestrictedCategory { .. } => {
            FindFailure::new(FailureKind::RestrictedCategory, err.to_string())
        }
        LocatorError::ScrollExhausted { .. } => FindFailure::new(
            FailureKind::ScrollExhausted,
            format!("An element could not be located on the page using the given search parameters. ({err})"),
        ),
        LocatorError::StaleElement { .. } => {
            FindFailure::new(FailureKind::StaleElement, err.to_string())
        }
        LocatorError::GestureTimeout(_) => FindFailure::new(FailureKind::Timeout, err.to_string()),
        LocatorError::Snapshot(_) => FindFailure::new(FailureKind::Unknown, err.to_string()),
    }
}
