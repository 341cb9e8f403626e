use tracing::{Level, Span, field};

use super::TraceId;
use crate::time::now_ms;

/// Span wrapping one CLI command. Everything logged inside carries the
/// command name, its trace id and the wall-clock start.
pub fn root_span(command: &'static str, trace_id: &TraceId) -> Span {
    tracing::span!(
        Level::INFO,
        "command",
        command,
        trace_id = %trace_id,
        started_ms = now_ms(),
        outcome = field::Empty,
    )
}

/// Nested step under the current command span.
pub fn child_span(step: &'static str) -> Span {
    tracing::span!(Level::DEBUG, "step", step)
}
