//! GoldenGate core types.
//!
//! This crate holds the leaf model of the bridge: the interface descriptor,
//! the callback traits and the typed handle, the wire format, the
//! script-channel seam, and the error taxonomy. The runtime (proxy base,
//! invocation encoder, result dispatcher) lives in the `goldengate` crate;
//! the correlation registry lives in `goldengate-registry`; proxy generation
//! lives in `goldengate-macros`.

mod callback;
mod channel;
mod descriptor;
mod error;
mod wire;

pub use callback::{Callback, CallbackHandle};
pub use channel::{ResultSink, ScriptChannel};
pub use descriptor::{
    CallbackDescriptor, InterfaceDescriptor, InterfaceDescriptorBuilder, MethodDescriptor,
    ParameterDescriptor, ParameterKind, PropertyAccess, PropertyDescriptor, RawParameter,
};
pub use error::{BridgeError, BridgeResult, DecodeError, DescriptorError, EncodeError};
pub use wire::{CALLBACK_FACTORY, ResultEnvelope, callback_factory_script, callback_ref_expr};
