//! Callback correlation registry.
//!
//! This module provides [`CallbackRegistry`], the per-proxy store of pending
//! native callbacks keyed by correlation id. Ids come from a monotonic
//! counter and are never reused, so stale or duplicate inbound results cannot
//! be misattributed to a later call.
//!
//! # Storage Model
//!
//! Slots hold **non-owning** `Weak` references: a pending registration never
//! keeps the caller's callback alive, and a callback whose owner dropped it
//! is never invoked. A dead weak observed during [`resolve`] is pruned on the
//! spot; there is no explicit deregistration and no eviction policy beyond
//! that.
//!
//! # Thread Safety
//!
//! The id counter is a lock-free atomic, safe under concurrent invocation
//! from multiple native threads issuing calls simultaneously. The slot map
//! sits behind a `Mutex` supporting concurrent insert from call sites and
//! lookup from the dispatch path; the lock is never held across a callback
//! invocation.
//!
//! # Delivery Contract
//!
//! [`resolve`] does not enforce single delivery: a re-invocable callback
//! parameter's id may legitimately be resolved and invoked many times.
//! Invoking a trailing result callback at most once is a usage contract of
//! the generated calling code, not of the registry.
//!
//! [`resolve`]: CallbackRegistry::resolve

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use rustc_hash::FxHashMap;

use goldengate_core::Callback;

/// Per-proxy store of pending callbacks keyed by correlation id.
#[derive(Default)]
pub struct CallbackRegistry {
    next_id: AtomicU64,
    pending: Mutex<FxHashMap<u64, Weak<dyn Callback<String>>>>,
}

impl CallbackRegistry {
    /// Create an empty registry. The first issued id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next correlation id: atomic increment, never reset, never
    /// reused for the lifetime of the registry.
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Register a pending callback under `id`.
    ///
    /// The registration is non-owning: if every strong reference to the
    /// callback is dropped by its owner, the slot resolves to `None` from
    /// then on.
    pub fn register(&self, id: u64, callback: Weak<dyn Callback<String>>) {
        self.lock_pending().insert(id, callback);
    }

    /// Look up the callback registered under `id`.
    ///
    /// Returns `None` for an unknown id or for a callback whose owner has
    /// dropped it — both are expected, silent outcomes, not errors. A dead
    /// slot is pruned when observed. A live slot stays registered, so a
    /// re-invocable id can be resolved again.
    pub fn resolve(&self, id: u64) -> Option<Arc<dyn Callback<String>>> {
        let mut pending = self.lock_pending();
        match pending.get(&id) {
            Some(slot) => match slot.upgrade() {
                Some(callback) => Some(callback),
                None => {
                    pending.remove(&id);
                    None
                }
            },
            None => None,
        }
    }

    /// Number of slots currently held, dead weaks included.
    pub fn pending(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, FxHashMap<u64, Weak<dyn Callback<String>>>> {
        // A poisoned lock means a callback-owning thread panicked; the map
        // itself is still structurally sound.
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}
