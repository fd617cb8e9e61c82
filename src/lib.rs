//! GoldenGate: typed bridges into an embedded script engine.
//!
//! Native code declares an ordinary Rust trait; the [`bridge`] attribute
//! macro generates a proxy type that forwards each method call to the script
//! side as a one-way evaluated expression. Methods whose result arrives
//! asynchronously take a [`CallbackHandle`]: the proxy assigns the pending
//! callback a correlation id, embeds that id in the outgoing expression, and
//! matches the inbound result envelope back to the right callback — or drops
//! it silently if the caller has lost interest.
//!
//! # Crate Layout
//!
//! - [`goldengate_core`] — descriptor model, callback traits, wire format,
//!   channel seam, errors (re-exported here).
//! - [`goldengate_registry`] — the callback correlation registry.
//! - `goldengate-macros` — the [`bridge`] proc macro.
//! - This crate — the runtime: [`Bridge`], [`Invocation`],
//!   [`ResultDispatcher`].
//!
//! # Example
//!
//! ```
//! use goldengate::{bridge, BridgeResult, CallbackHandle, ResultSink, ScriptChannel};
//! use std::sync::Arc;
//!
//! #[bridge]
//! pub trait Document {
//!     fn highlight(&self, query: String) -> BridgeResult<()>;
//!     fn word_count(&self, result: &CallbackHandle<u64>) -> BridgeResult<()>;
//! }
//!
//! struct NullChannel;
//!
//! impl ScriptChannel for NullChannel {
//!     fn evaluate(&self, _expression: &str) {}
//!     fn register_result_sink(&self, _name: &str, _sink: Arc<dyn ResultSink>) {}
//! }
//!
//! let document = DocumentBridge::new(Arc::new(NullChannel));
//! document.highlight("bridge".to_string()).unwrap();
//!
//! let count = CallbackHandle::new(|count: u64| println!("{count} words"));
//! document.word_count(&count).unwrap();
//! ```

mod bridge;
mod dispatch;
mod encode;

pub use bridge::Bridge;
pub use dispatch::ResultDispatcher;
pub use encode::{Invocation, property_read, property_write, report_dropped_call};

pub use goldengate_core::{
    BridgeError, BridgeResult, CALLBACK_FACTORY, Callback, CallbackDescriptor, CallbackHandle,
    DecodeError, DescriptorError, EncodeError, InterfaceDescriptor, InterfaceDescriptorBuilder,
    MethodDescriptor, ParameterDescriptor, ParameterKind, PropertyAccess, PropertyDescriptor,
    RawParameter, ResultEnvelope, ResultSink, ScriptChannel, callback_factory_script,
    callback_ref_expr,
};
pub use goldengate_macros::bridge;
pub use goldengate_registry::CallbackRegistry;

pub mod prelude {
    pub use crate::{
        Bridge, BridgeError, BridgeResult, Callback, CallbackHandle, CallbackRegistry, Invocation,
        ResultDispatcher, ResultEnvelope, ResultSink, ScriptChannel,
    };
    pub use goldengate_macros::bridge;
}
