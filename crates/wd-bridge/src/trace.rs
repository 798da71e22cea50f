use droidlocate_core_types::SessionId;
use tracing::{span, Level, Span};

#[derive(Clone, Default)]
pub struct BridgeTracer;

impl BridgeTracer {
    pub fn span(&self, command: &str, session: &SessionId) -> Span {
        span!(Level::INFO, "droidlocate.command", command = command, session = %session)
    }
}
