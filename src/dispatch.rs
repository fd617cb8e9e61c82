//! Inbound result decoding and dispatch.
//!
//! [`ResultDispatcher`] is the single entry point the script engine can
//! reach: it parses a result envelope, resolves the receiver id against the
//! registry, and invokes the callback — or silently drops the envelope when
//! the callback is unknown or its owner is gone. A malformed envelope is
//! contained here and reported through diagnostics; it never propagates back
//! into the script engine's calling context.

use std::sync::Arc;

use goldengate_core::{Callback, DecodeError, ResultEnvelope, ResultSink};
use goldengate_registry::CallbackRegistry;

/// Decodes result envelopes and routes them to pending callbacks.
#[derive(Debug)]
pub struct ResultDispatcher {
    registry: Arc<CallbackRegistry>,
}

impl ResultDispatcher {
    pub fn new(registry: Arc<CallbackRegistry>) -> Self {
        Self { registry }
    }

    fn decode(&self, envelope: &str) -> Result<(), DecodeError> {
        let envelope = ResultEnvelope::parse(envelope)?;
        // An unresolved receiver is a normal outcome: the caller abandoned
        // interest, or the id was never ours.
        if let Some(callback) = self.registry.resolve(envelope.receiver) {
            callback.on_result(envelope.result);
        }
        Ok(())
    }
}

impl ResultSink for ResultDispatcher {
    fn on_result(&self, envelope: &str) {
        if let Err(error) = self.decode(envelope) {
            tracing::warn!(target: "goldengate", %error, "dropped result envelope");
        }
    }
}
