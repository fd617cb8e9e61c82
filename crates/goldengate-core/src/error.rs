//! Unified error types for GoldenGate.
//!
//! This module provides a consistent error type hierarchy for the two phases
//! of bridge processing: descriptor construction and runtime encode/decode.
//!
//! ## Error Hierarchy
//!
//! ```text
//! BridgeError (top-level wrapper)
//! ├── DescriptorError - malformed interface declaration (fatal at build time)
//! ├── EncodeError     - outbound argument serialization failures
//! └── DecodeError     - inbound envelope/payload failures (non-fatal)
//! ```
//!
//! Looking up a correlation id that has no live callback is deliberately *not*
//! represented here: resolution returning `None` is an expected, silent outcome
//! of the caller having abandoned interest in the result.
//!
//! ## Propagation Policy
//!
//! - `DescriptorError` aborts generation for the offending interface.
//! - `EncodeError` surfaces synchronously to the caller of the proxy method.
//! - `DecodeError` is contained at the dispatch boundary and reported through
//!   diagnostics; it never crosses back into the script engine's calling
//!   context, which is shared with all other outstanding calls.

use thiserror::Error;

// ============================================================================
// Descriptor Errors
// ============================================================================

/// Errors that occur while building an [`InterfaceDescriptor`].
///
/// These are configuration errors in the declared interface and are fatal at
/// build/generation time: proxy generation cannot proceed for the interface.
///
/// [`InterfaceDescriptor`]: crate::InterfaceDescriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// A parameter was explicitly marked as script-invocable but its type is
    /// not callback-shaped.
    #[error(
        "parameter `{parameter}` of `{method}` is marked as script-invocable but is not callback-shaped"
    )]
    NotCallbackShaped {
        method: &'static str,
        parameter: &'static str,
    },

    /// A property accessor must take either a single result callback (read)
    /// or a single value argument (write).
    #[error("property `{property}` must take either a result callback or exactly one value argument")]
    InvalidProperty { property: &'static str },
}

// ============================================================================
// Encode Errors
// ============================================================================

/// An outbound argument could not be serialized for a script invocation.
///
/// Encoding happens on the call path, so this failure is returned to the
/// immediate caller of the proxy method and fails that call attempt.
#[derive(Debug, Error)]
#[error("failed to serialize argument `{argument}` of `{target}`")]
pub struct EncodeError {
    /// Script-side name of the call being encoded.
    pub target: String,
    /// Name of the offending argument.
    pub argument: String,
    #[source]
    pub source: serde_json::Error,
}

// ============================================================================
// Decode Errors
// ============================================================================

/// An inbound result envelope or payload could not be parsed.
///
/// Decode errors are isolated to the single inbound message that produced
/// them. They are reported through diagnostics and never propagate across the
/// script/native boundary.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The envelope was not a well-formed `{receiver, result}` object.
    #[error("malformed result envelope")]
    Envelope(#[source] serde_json::Error),

    /// The inner payload did not deserialize into the callback's declared
    /// payload type.
    #[error("result payload is not a valid `{expected}`")]
    Payload {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error wrapper for unified handling.
///
/// Phase-specific errors can be used directly for fine-grained handling or
/// converted into `BridgeError` with `?`.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Convenience alias used by generated proxy methods.
pub type BridgeResult<T> = Result<T, BridgeError>;
