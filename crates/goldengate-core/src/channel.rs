//! The two capabilities the bridge requires of its script host.
//!
//! The core is independent of how script execution is hosted (a WebView, an
//! embedded JS runtime, a test double). It only needs fire-and-forget
//! evaluation and a way to expose a native-reachable result sink under a
//! fixed name so the script side can post result envelopes back.

use std::sync::Arc;

/// Inbound entry point the script side posts result envelopes to.
///
/// Implementations must never panic on malformed input: the calling context
/// is shared with all other outstanding calls.
pub trait ResultSink: Send + Sync {
    fn on_result(&self, envelope: &str);
}

/// One-way evaluation channel into the script context.
pub trait ScriptChannel: Send + Sync {
    /// Evaluate `expression` in the script context, fire-and-forget. The
    /// caller never blocks waiting for a script-side return value.
    fn evaluate(&self, expression: &str);

    /// Register `sink` under `name` so script code can reach it as
    /// `<name>.onResult(...)`.
    fn register_result_sink(&self, name: &str, sink: Arc<dyn ResultSink>);
}
