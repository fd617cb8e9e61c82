//! GoldenGate proc macros.
//!
//! This crate provides the `#[bridge]` attribute macro that turns a declared
//! Rust trait into a generated script bridge proxy. It is the descriptor
//! input surface: however the runtime core is driven, this is where
//! method/parameter roles are read off the declaration and turned into an
//! `InterfaceDescriptor`.
//!
//! # Example
//!
//! ```ignore
//! use goldengate::{bridge, BridgeResult, CallbackHandle};
//!
//! #[bridge(debug)]
//! pub trait Profiles {
//!     fn refresh(&self);
//!
//!     #[bridge(name = "fetchProfile")]
//!     fn fetch(&self, id: i32, result: &CallbackHandle<Profile>) -> BridgeResult<()>;
//!
//!     fn sync(
//!         &self,
//!         #[callback] progress: &CallbackHandle<f32>,
//!         result: &CallbackHandle<bool>,
//!     ) -> BridgeResult<()>;
//!
//!     #[bridge(property, name = "title")]
//!     fn title(&self, result: &CallbackHandle<String>) -> BridgeResult<()>;
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod bridge;

/// Generate a script bridge proxy from a trait.
///
/// Emits the trait unchanged (helper attributes stripped) plus a
/// `<Trait>Bridge` type implementing it by forwarding every call to the
/// script side over a `ScriptChannel`.
///
/// # Attributes
///
/// - `#[bridge(debug)]` on the trait — emit every generated invocation to
///   the diagnostic sink before sending.
///
/// # Method Attributes
///
/// - `#[bridge(name = "...")]` — override the script-side name.
/// - `#[bridge(property)]` — record the method as a property accessor: a
///   read takes a single `&CallbackHandle<T>`, a write a single value.
///
/// # Parameter Attributes
///
/// - `#[callback]` — mark a non-trailing `&CallbackHandle<T>` parameter as
///   script-invocable: the script side may invoke it zero, one, or many
///   times. The last parameter, when callback-shaped and unmarked, is the
///   trailing result callback and is invoked at most once.
///
/// # Method Shapes
///
/// Bridge methods take `&self` and return either `()` (fire-and-forget;
/// encode failures are reported through diagnostics and the call dropped) or
/// `BridgeResult<()>` (encode failures propagate to the caller). A script
/// return value is never produced: deferred results arrive only through
/// callback parameters.
#[proc_macro_attribute]
pub fn bridge(attr: TokenStream, item: TokenStream) -> TokenStream {
    bridge::bridge_impl(attr, item)
}
