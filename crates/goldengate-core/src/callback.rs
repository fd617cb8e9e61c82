//! Native callbacks and the typed handle registered for deferred results.
//!
//! A script-side result arrives as serialized text. The caller supplies an
//! ordinary typed [`Callback`]; wrapping it in a [`CallbackHandle`] installs
//! the deserialization step so the raw payload is decoded into the declared
//! payload type before it is forwarded. The handle is the owner-side anchor:
//! the registry only ever holds a [`Weak`] reference to the handle's inner
//! wrapper, so dropping the last clone of a handle silently cancels delivery.
//!
//! # Examples
//!
//! ```
//! use goldengate_core::{Callback, CallbackHandle};
//! use std::sync::{Arc, Mutex};
//!
//! let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let handle = CallbackHandle::new(move |value: String| {
//!     sink.lock().unwrap().push(value);
//! });
//!
//! // Dispatch hands the handle's raw view the serialized payload.
//! let raw = handle.raw_weak().upgrade().unwrap();
//! raw.on_result("\"done\"".to_string());
//!
//! assert_eq!(seen.lock().unwrap().as_slice(), ["done"]);
//! ```

use std::sync::{Arc, Weak};

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// A native callback receiving the eventual result of a bridged call.
///
/// Implemented for any `Fn(T)` closure. `Callback<String>` is the raw form
/// stored in the registry: it receives the still-serialized payload text.
pub trait Callback<T>: Send + Sync {
    fn on_result(&self, result: T);
}

impl<T, F> Callback<T> for F
where
    F: Fn(T) + Send + Sync,
{
    fn on_result(&self, result: T) {
        self(result)
    }
}

/// Deserializing wrapper around the caller's typed callback.
///
/// This is the object the registry weakly references: its raw
/// `Callback<String>` implementation decodes the payload into `T` and
/// forwards it. A payload that fails to decode is a [`DecodeError`], reported
/// through diagnostics and confined to that single delivery.
struct TypedCallback<T> {
    callback: Box<dyn Callback<T>>,
    payload_type: &'static str,
}

impl<T> Callback<String> for TypedCallback<T>
where
    T: DeserializeOwned,
{
    fn on_result(&self, raw: String) {
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => self.callback.on_result(value),
            Err(source) => {
                let error = DecodeError::Payload {
                    expected: self.payload_type,
                    source,
                };
                tracing::warn!(target: "goldengate", %error, "dropped result payload");
            }
        }
    }
}

/// Caller-owned handle to a pending typed callback.
///
/// Cloning is cheap (shared inner wrapper). The caller must keep at least one
/// clone alive for as long as it is interested in results; dropping the last
/// clone makes future deliveries a silent no-op. There is no explicit cancel
/// operation.
pub struct CallbackHandle<T> {
    inner: Arc<TypedCallback<T>>,
}

impl<T> CallbackHandle<T> {
    /// Wrap a typed native callback.
    pub fn new(callback: impl Callback<T> + 'static) -> Self {
        Self {
            inner: Arc::new(TypedCallback {
                callback: Box::new(callback),
                payload_type: std::any::type_name::<T>(),
            }),
        }
    }

    /// Non-owning raw view of this callback for registration.
    ///
    /// The returned weak reference resolves to `None` once every clone of the
    /// handle has been dropped.
    pub fn raw_weak(&self) -> Weak<dyn Callback<String>>
    where
        T: DeserializeOwned + 'static,
    {
        let inner: Arc<dyn Callback<String>> = self.inner.clone();
        Arc::downgrade(&inner)
    }
}

impl<T> Clone for CallbackHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for CallbackHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackHandle")
            .field("payload_type", &self.inner.payload_type)
            .finish_non_exhaustive()
    }
}
