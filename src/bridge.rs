//! Proxy base shared by all generated bridges.
//!
//! A generated `<Trait>Bridge` holds a [`Bridge`]: the script channel plus
//! the interface descriptor. Interfaces that need callbacks additionally ask
//! the base to install the result path at construction — the per-instance
//! registry, the dispatcher registered with the channel under the interface
//! name, and the callback-factory bootstrap script.

use std::sync::Arc;

use goldengate_core::{InterfaceDescriptor, ScriptChannel, callback_factory_script};
use goldengate_registry::CallbackRegistry;

use crate::dispatch::ResultDispatcher;

/// Channel and descriptor for one proxy instance.
pub struct Bridge {
    channel: Arc<dyn ScriptChannel>,
    descriptor: &'static InterfaceDescriptor,
}

impl Bridge {
    pub fn new(channel: Arc<dyn ScriptChannel>, descriptor: &'static InterfaceDescriptor) -> Self {
        Self {
            channel,
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &'static InterfaceDescriptor {
        self.descriptor
    }

    /// Install the inbound result path for this proxy instance and hand back
    /// its registry.
    ///
    /// Registers a [`ResultDispatcher`] with the channel under the interface
    /// name and evaluates the callback-factory bootstrap script, so script
    /// code created by later invocations can forward results. Generated
    /// constructors call this exactly once, and only when the descriptor
    /// needs callbacks.
    pub fn install_result_sink(&self) -> Arc<CallbackRegistry> {
        let registry = Arc::new(CallbackRegistry::new());
        let dispatcher = Arc::new(ResultDispatcher::new(Arc::clone(&registry)));
        self.channel
            .register_result_sink(self.descriptor.name(), dispatcher);
        self.channel
            .evaluate(&callback_factory_script(self.descriptor.name()));
        registry
    }

    /// Send a finished call expression for asynchronous, fire-and-forget
    /// evaluation. Returns immediately; results only ever arrive through the
    /// dispatcher path.
    pub fn dispatch(&self, expression: String) {
        if self.descriptor.is_debug() {
            tracing::debug!(
                target: "goldengate",
                interface = self.descriptor.name(),
                %expression,
                "evaluate"
            );
        }
        self.channel.evaluate(&expression);
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("interface", &self.descriptor.name())
            .field("needs_callbacks", &self.descriptor.needs_callbacks())
            .finish_non_exhaustive()
    }
}
