//! Wire format shared by both directions of the bridge.
//!
//! Outbound, every callback argument renders as a fixed wrapper expression
//! parameterized only by its correlation id; a bootstrap script evaluated at
//! proxy construction defines the factory that wrapper invokes. Inbound, the
//! script side posts a [`ResultEnvelope`] to the interface's registered
//! result sink.
//!
//! The envelope wraps an *already serialized* payload inside another
//! serialized object: the payload is serialized once by the script side as a
//! value and again as part of the envelope. This double encoding keeps the
//! payload shape opaque to the envelope and must be preserved exactly for
//! compatibility.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Script-side name of the callback factory function.
pub const CALLBACK_FACTORY: &str = "GoldenGate$$CreateCallback";

/// Render the forwarding-function expression for one registered callback.
///
/// ```
/// assert_eq!(
///     goldengate_core::callback_ref_expr(1),
///     "GoldenGate$$CreateCallback(1)"
/// );
/// ```
pub fn callback_ref_expr(id: u64) -> String {
    format!("{CALLBACK_FACTORY}({id})")
}

/// The bootstrap script defining the callback factory for one interface.
///
/// The factory returns a function that, when later invoked by script code
/// with a value, packages `{receiver, result}` and forwards it to the result
/// sink registered under `interface`.
pub fn callback_factory_script(interface: &str) -> String {
    format!(
        "function {CALLBACK_FACTORY}(receiver) {{\
         \n    return function(result) {{\
         \n        {interface}.onResult(JSON.stringify({{receiver: receiver, result: JSON.stringify(result)}}))\
         \n    }}\
         \n}}"
    )
}

/// Inbound result message: a correlation id plus the serialized result
/// payload, itself re-serialized as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Correlation id of the callback this result is addressed to.
    pub receiver: u64,
    /// The payload, still in its serialized form.
    pub result: String,
}

impl ResultEnvelope {
    /// Parse the raw envelope text handed to the result sink.
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(raw).map_err(DecodeError::Envelope)
    }

    /// Build an envelope the way the script-side factory does: serialize the
    /// value, then wrap it. Used by in-process script hosts and tests.
    pub fn from_value<T: Serialize>(receiver: u64, value: &T) -> serde_json::Result<Self> {
        Ok(Self {
            receiver,
            result: serde_json::to_string(value)?,
        })
    }

    /// Serialize the whole envelope to the wire text.
    pub fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_script_forwards_to_the_interface_sink() {
        let script = callback_factory_script("Foo");
        assert!(script.starts_with("function GoldenGate$$CreateCallback(receiver)"));
        assert!(script.contains("Foo.onResult(JSON.stringify({receiver: receiver, result: JSON.stringify(result)}))"));
    }

    #[test]
    fn envelope_round_trips_the_double_encoding() {
        let envelope = ResultEnvelope::from_value(1, &"done").unwrap();
        assert_eq!(envelope.result, "\"done\"");

        let wire = envelope.to_wire().unwrap();
        assert_eq!(wire, r#"{"receiver":1,"result":"\"done\""}"#);

        let parsed = ResultEnvelope::parse(&wire).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn missing_receiver_is_a_decode_error() {
        let err = ResultEnvelope::parse(r#"{"result":"\"done\""}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Envelope(_)));
    }

    #[test]
    fn non_numeric_receiver_is_a_decode_error() {
        let err = ResultEnvelope::parse(r#"{"receiver":"one","result":"1"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Envelope(_)));
    }
}
