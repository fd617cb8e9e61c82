//! Outbound invocation encoding.
//!
//! Builds the script-side call expression for one proxy method call:
//! ordinary arguments render as their serialized form, callback arguments
//! render as forwarding-function expressions bound to a correlation id, and
//! the whole call is `<script-name>(<args joined with ", ">)`.

use serde::Serialize;

use goldengate_core::{EncodeError, callback_ref_expr};

/// Builder for one outgoing call expression.
///
/// Arguments are rendered in push order, which is the declared parameter
/// order; a trailing result callback is pushed last.
///
/// # Examples
///
/// ```
/// use goldengate::Invocation;
///
/// let mut call = Invocation::new("bar");
/// call.push_value("x", &5).unwrap();
/// call.push_callback(1);
/// assert_eq!(call.finish(), "bar(5, GoldenGate$$CreateCallback(1))");
/// ```
#[derive(Debug)]
pub struct Invocation {
    target: String,
    arguments: Vec<String>,
}

impl Invocation {
    /// Start a call to the script-side name `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            arguments: Vec::new(),
        }
    }

    /// Append an ordinary argument as its serialized form.
    ///
    /// `name` is the declared parameter name, used for error context only.
    pub fn push_value<T>(&mut self, name: &str, value: &T) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        let rendered = serde_json::to_string(value).map_err(|source| EncodeError {
            target: self.target.clone(),
            argument: name.to_owned(),
            source,
        })?;
        self.arguments.push(rendered);
        Ok(())
    }

    /// Append a callback argument as a forwarding-function expression bound
    /// to `id`.
    pub fn push_callback(&mut self, id: u64) {
        self.arguments.push(callback_ref_expr(id));
    }

    /// Render the finished call expression.
    pub fn finish(self) -> String {
        format!("{}({})", self.target, self.arguments.join(", "))
    }
}

/// Render a property-read expression: the freshly created forwarding
/// function applied to the script-side property, so the property value is
/// delivered through the callback registered under `id`.
pub fn property_read(script_name: &str, id: u64) -> String {
    format!("{}({script_name})", callback_ref_expr(id))
}

/// Render a property-write expression assigning the serialized value.
pub fn property_write<T>(script_name: &str, value: &T) -> Result<String, EncodeError>
where
    T: Serialize + ?Sized,
{
    let rendered = serde_json::to_string(value).map_err(|source| EncodeError {
        target: script_name.to_owned(),
        argument: script_name.to_owned(),
        source,
    })?;
    Ok(format!("{script_name} = {rendered}"))
}

/// Report an encode failure from a fire-and-forget proxy method.
///
/// Unit-returning bridged methods have no way to surface an [`EncodeError`]
/// to their caller; the generated code reports it here and abandons the
/// call — nothing is sent over the channel.
#[doc(hidden)]
pub fn report_dropped_call(error: &EncodeError) {
    tracing::error!(target: "goldengate", %error, "dropped bridge call");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn arguments_render_in_push_order() {
        let mut call = Invocation::new("greet");
        call.push_value("name", "flipboard").unwrap();
        call.push_value("count", &2).unwrap();
        assert_eq!(call.finish(), r#"greet("flipboard", 2)"#);
    }

    #[test]
    fn zero_argument_call_renders_empty_parens() {
        assert_eq!(Invocation::new("refresh").finish(), "refresh()");
    }

    #[test]
    fn callback_arguments_render_as_factory_references() {
        let mut call = Invocation::new("watch");
        call.push_callback(7);
        assert_eq!(call.finish(), "watch(GoldenGate$$CreateCallback(7))");
    }

    #[test]
    fn unserializable_argument_fails_the_call_with_context() {
        // Non-string map keys cannot be represented as JSON object keys.
        let mut bad = BTreeMap::new();
        bad.insert((1u8, 2u8), 3u8);

        let mut call = Invocation::new("configure");
        let err = call.push_value("options", &bad).unwrap_err();
        assert_eq!(err.target, "configure");
        assert_eq!(err.argument, "options");
    }

    #[test]
    fn property_expressions() {
        assert_eq!(
            property_read("title", 3),
            "GoldenGate$$CreateCallback(3)(title)"
        );
        assert_eq!(property_write("volume", &0.5).unwrap(), "volume = 0.5");
    }
}
