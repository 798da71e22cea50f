use action_locator::{
    classify, FailureKind, FindFailure, LocatorError, UNKNOWN_COMMAND_MESSAGE,
};
use thiserror::Error;

use crate::model::WireResponse;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    #[error(transparent)]
    Locator(#[from] LocatorError),
    #[error("no element is known by handle '{0}'")]
    UnknownHandle(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    pub fn failure(&self) -> FindFailure {
        match self {
            BridgeError::Locator(err) => classify(err),
            BridgeError::UnknownHandle(_) => {
                FindFailure::new(FailureKind::NoSuchElement, self.to_string())
            }
            BridgeError::UnknownCommand(_) => {
                FindFailure::new(FailureKind::UnsupportedStrategy, UNKNOWN_COMMAND_MESSAGE)
            }
            BridgeError::InvalidArgument(_) => FindFailure::new(FailureKind::Unknown, self.to_string()),
        }
    }

    pub fn status_code(&self) -> u32 {
        self.failure().status
    }

    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Locator(LocatorError::InvalidSelector(_)) => "invalid_selector",
            BridgeError::Locator(LocatorError::NotFound { .. })
            | BridgeError::Locator(LocatorError::ScrollExhausted { .. })
            | BridgeError::UnknownHandle(_) => "no_such_element",
            BridgeError::Locator(LocatorError::UnsupportedStrategy { .. })
            | BridgeError::UnknownCommand(_) => "unknown_command",
            BridgeError::Locator(LocatorError::RestrictedCategory { .. }) => "not_supported",
            BridgeError::Locator(LocatorError::StaleElement { .. }) => "stale_element_reference",
            BridgeError::Locator(LocatorError::GestureTimeout(_)) => "timeout",
            BridgeError::Locator(LocatorError::Snapshot(_)) | BridgeError::InvalidArgument(_) => {
                "unknown_error"
            }
        }
    }

    pub fn into_response(self) -> WireResponse {
        WireResponse::failure(&self.failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droidlocate_core_types::Platform;

    #[test]
    fn unknown_command_uses_status_nine() {
        let err = BridgeError::UnknownCommand("mobile: shake".into());
        assert_eq!(err.status_code(), 9);
        assert_eq!(err.code(), "unknown_command");
        let response = err.into_response();
        assert!(response
            .message()
            .unwrap()
            .starts_with("The requested resource could not be found"));
    }

    #[test]
    fn locator_errors_keep_their_classification() {
        let err = BridgeError::from(LocatorError::RestrictedCategory {
            category: "secure".into(),
            platform: Platform::Android,
        });
        assert_eq!(err.status_code(), 13);
        assert_eq!(err.code(), "not_supported");
        assert_eq!(BridgeError::UnknownHandle("element-9".into()).status_code(), 7);
    }
}
