use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("invalid node spec: {0}")]
    InvalidSpec(String),
    #[error("invalid bounds '{0}'")]
    InvalidBounds(String),
    #[error("snapshot source failed: {0}")]
    Source(String),
    #[error("gesture dispatch failed: {0}")]
    Gesture(String),
    #[error("failed to load fixture {path}: {reason}")]
    Fixture { path: String, reason: String },
}

impl SnapshotError {
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }
}
