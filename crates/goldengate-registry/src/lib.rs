//! GoldenGate callback registry crate.
//!
//! Holds pending native callbacks keyed by monotonically increasing
//! correlation ids, using non-owning references so an abandoned caller does
//! not keep the registry alive or leak. See [`CallbackRegistry`].

mod registry;

pub use registry::CallbackRegistry;
