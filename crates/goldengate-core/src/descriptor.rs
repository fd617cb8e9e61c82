//! In-memory model of a bridgeable interface.
//!
//! An [`InterfaceDescriptor`] records, per declared interface, the methods and
//! properties that cross the bridge and the role of every parameter. It is
//! built once per interface (by the `#[bridge]` macro or programmatically) and
//! is immutable after construction.
//!
//! # Parameter Roles
//!
//! - A parameter is the **trailing result callback** iff it is the last
//!   parameter, is callback-shaped, and is not explicitly marked as
//!   script-invocable. It is invoked at most once with the method's eventual
//!   result and is tracked separately from the ordinary parameter list.
//! - A parameter explicitly marked as **script-invocable** must be
//!   callback-shaped; the script side may invoke it zero, one, or many times.
//!   Violating the shape requirement is a [`DescriptorError`], fatal at build
//!   time.
//! - Any other callback-shaped parameter sets `has_callback_parameters` on its
//!   owning method even though it is never registered as a callback.
//!
//! # Examples
//!
//! ```
//! use goldengate_core::{InterfaceDescriptor, MethodDescriptor, ParameterDescriptor, CallbackDescriptor};
//!
//! let descriptor = InterfaceDescriptor::builder("Profiles")
//!     .method(
//!         MethodDescriptor::new("fetch")
//!             .script_name("fetchProfile")
//!             .parameter(ParameterDescriptor::value("id", "i32"))
//!             .trailing_callback(CallbackDescriptor::new("result", "Profile")),
//!     )
//!     .build();
//!
//! assert!(descriptor.needs_callbacks());
//! assert_eq!(descriptor.methods()[0].script_name(), "fetchProfile");
//! ```

use crate::error::DescriptorError;

// ============================================================================
// Parameters
// ============================================================================

/// Role of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// An ordinary value, serialized into the call expression.
    Value,
    /// A callback-shaped parameter. Only script-invocable callbacks are
    /// registered and rendered as forwarding functions; a non-invocable
    /// callback-shaped parameter still flags its owning method.
    Callback { script_invocable: bool },
}

/// A single declared parameter: name plus the type used for serialization
/// diagnostics (callback payload type for callback-shaped parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    name: &'static str,
    ty: &'static str,
    kind: ParameterKind,
}

impl ParameterDescriptor {
    /// An ordinary value parameter.
    pub fn value(name: &'static str, ty: &'static str) -> Self {
        Self {
            name,
            ty,
            kind: ParameterKind::Value,
        }
    }

    /// A callback-shaped parameter carrying the payload type it expects to
    /// receive after deserialization.
    pub fn callback(name: &'static str, payload: &'static str, script_invocable: bool) -> Self {
        Self {
            name,
            ty: payload,
            kind: ParameterKind::Callback { script_invocable },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Value type, or the callback payload type for callback-shaped
    /// parameters.
    pub fn ty(&self) -> &'static str {
        self.ty
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn is_callback(&self) -> bool {
        matches!(self.kind, ParameterKind::Callback { .. })
    }

    pub fn is_script_invocable(&self) -> bool {
        matches!(
            self.kind,
            ParameterKind::Callback {
                script_invocable: true
            }
        )
    }
}

/// The trailing result callback of a method or the callback of a property
/// read: "the result of this call arrives later".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackDescriptor {
    name: &'static str,
    payload: &'static str,
}

impl CallbackDescriptor {
    pub fn new(name: &'static str, payload: &'static str) -> Self {
        Self { name, payload }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type the raw result payload is deserialized into before it is handed
    /// to the caller's callback.
    pub fn payload(&self) -> &'static str {
        self.payload
    }
}

/// Raw input to [`MethodDescriptor::from_parameters`]: a parameter as the
/// descriptor input surface saw it, before classification.
#[derive(Debug, Clone, Copy)]
pub struct RawParameter {
    pub name: &'static str,
    /// Value type, or callback payload type when `callback_shaped`.
    pub ty: &'static str,
    /// Whether the declared type is callback-shaped.
    pub callback_shaped: bool,
    /// Whether the parameter was explicitly marked as script-invocable.
    pub script_invocable: bool,
}

// ============================================================================
// Methods
// ============================================================================

/// One bridgeable method: native name, script-side name, ordered parameters
/// (excluding the trailing result callback), and the optional trailing
/// callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    native_name: &'static str,
    script_name: &'static str,
    parameters: Vec<ParameterDescriptor>,
    callback: Option<CallbackDescriptor>,
}

impl MethodDescriptor {
    /// Create a method whose script-side name defaults to the native name.
    pub fn new(native_name: &'static str) -> Self {
        Self {
            native_name,
            script_name: native_name,
            parameters: Vec::new(),
            callback: None,
        }
    }

    /// Override the script-side name.
    pub fn script_name(mut self, script_name: &'static str) -> Self {
        self.script_name = script_name;
        self
    }

    /// Append an ordinary or callback-shaped parameter.
    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Attach the trailing result callback.
    pub fn trailing_callback(mut self, callback: CallbackDescriptor) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Classify a raw parameter list into a method descriptor.
    ///
    /// Applies the parameter-role rules: the last callback-shaped parameter
    /// not marked script-invocable becomes the trailing result callback; a
    /// script-invocable-marked parameter that is not callback-shaped fails
    /// with a [`DescriptorError`].
    pub fn from_parameters(
        native_name: &'static str,
        script_name: Option<&'static str>,
        raw: &[RawParameter],
    ) -> Result<Self, DescriptorError> {
        let mut method = Self::new(native_name);
        if let Some(script_name) = script_name {
            method = method.script_name(script_name);
        }

        let last = raw.len().wrapping_sub(1);
        for (index, param) in raw.iter().enumerate() {
            if index == last && param.callback_shaped && !param.script_invocable {
                method.callback = Some(CallbackDescriptor::new(param.name, param.ty));
            } else if param.script_invocable {
                if !param.callback_shaped {
                    return Err(DescriptorError::NotCallbackShaped {
                        method: native_name,
                        parameter: param.name,
                    });
                }
                method
                    .parameters
                    .push(ParameterDescriptor::callback(param.name, param.ty, true));
            } else if param.callback_shaped {
                method
                    .parameters
                    .push(ParameterDescriptor::callback(param.name, param.ty, false));
            } else {
                method
                    .parameters
                    .push(ParameterDescriptor::value(param.name, param.ty));
            }
        }

        Ok(method)
    }

    pub fn native_name(&self) -> &'static str {
        self.native_name
    }

    pub fn script_name(&self) -> &'static str {
        self.script_name
    }

    /// Ordered parameters, excluding the trailing result callback.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// The trailing result callback, if the method has one.
    pub fn callback(&self) -> Option<&CallbackDescriptor> {
        self.callback.as_ref()
    }

    /// True if any non-trailing parameter is callback-shaped, meaning the
    /// script side may invoke it at multiple points rather than once as a
    /// terminal result.
    pub fn has_callback_parameters(&self) -> bool {
        self.parameters.iter().any(ParameterDescriptor::is_callback)
    }

    fn references_callbacks(&self) -> bool {
        self.callback.is_some() || self.has_callback_parameters()
    }
}

// ============================================================================
// Properties
// ============================================================================

/// Access direction of a property accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyAccess {
    /// Script-side property read; the value arrives through the callback.
    Read { callback: CallbackDescriptor },
    /// Script-side property write with a single serialized value.
    Write { value: ParameterDescriptor },
}

/// A script-side property accessor. Same shape as a zero/one-argument method,
/// with a script-side name that may differ from the native accessor name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    native_name: &'static str,
    script_name: &'static str,
    access: PropertyAccess,
}

impl PropertyDescriptor {
    /// A property read delivering its value through `callback`.
    pub fn read(
        native_name: &'static str,
        script_name: &'static str,
        callback: CallbackDescriptor,
    ) -> Self {
        Self {
            native_name,
            script_name,
            access: PropertyAccess::Read { callback },
        }
    }

    /// A property write taking a single value argument.
    pub fn write(
        native_name: &'static str,
        script_name: &'static str,
        value: ParameterDescriptor,
    ) -> Self {
        Self {
            native_name,
            script_name,
            access: PropertyAccess::Write { value },
        }
    }

    pub fn native_name(&self) -> &'static str {
        self.native_name
    }

    pub fn script_name(&self) -> &'static str {
        self.script_name
    }

    pub fn access(&self) -> &PropertyAccess {
        &self.access
    }

    /// The property's callback, present only for reads.
    pub fn callback(&self) -> Option<&CallbackDescriptor> {
        match &self.access {
            PropertyAccess::Read { callback } => Some(callback),
            PropertyAccess::Write { .. } => None,
        }
    }
}

// ============================================================================
// Interface
// ============================================================================

/// Immutable model of a bridgeable interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    name: &'static str,
    debug: bool,
    methods: Vec<MethodDescriptor>,
    properties: Vec<PropertyDescriptor>,
    needs_callbacks: bool,
}

impl InterfaceDescriptor {
    pub fn builder(name: &'static str) -> InterfaceDescriptorBuilder {
        InterfaceDescriptorBuilder {
            name,
            debug: false,
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether generated invocations are emitted to the diagnostic sink
    /// before being sent.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Look up a method by native name.
    pub fn method(&self, native_name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.native_name == native_name)
    }

    /// Look up a property by native name.
    pub fn property(&self, native_name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|p| p.native_name == native_name)
    }

    /// True if any method or property references a callback. When false, the
    /// proxy constructs no registry, no id generator, and no result-decode
    /// entry point for this interface.
    pub fn needs_callbacks(&self) -> bool {
        self.needs_callbacks
    }
}

/// Builder for [`InterfaceDescriptor`]. `needs_callbacks` is derived at
/// [`build`](InterfaceDescriptorBuilder::build) time.
#[derive(Debug)]
pub struct InterfaceDescriptorBuilder {
    name: &'static str,
    debug: bool,
    methods: Vec<MethodDescriptor>,
    properties: Vec<PropertyDescriptor>,
}

impl InterfaceDescriptorBuilder {
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn build(self) -> InterfaceDescriptor {
        let needs_callbacks = self
            .methods
            .iter()
            .any(MethodDescriptor::references_callbacks)
            || self.properties.iter().any(|p| p.callback().is_some());

        InterfaceDescriptor {
            name: self.name,
            debug: self.debug,
            methods: self.methods,
            properties: self.properties,
            needs_callbacks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(name: &'static str, ty: &'static str) -> RawParameter {
        RawParameter {
            name,
            ty,
            callback_shaped: false,
            script_invocable: false,
        }
    }

    fn callback(name: &'static str, payload: &'static str) -> RawParameter {
        RawParameter {
            name,
            ty: payload,
            callback_shaped: true,
            script_invocable: false,
        }
    }

    #[test]
    fn trailing_callback_is_tracked_separately() {
        let method = MethodDescriptor::from_parameters(
            "bar",
            None,
            &[value("x", "i32"), callback("cb", "String")],
        )
        .unwrap();

        assert_eq!(method.parameters().len(), 1);
        assert_eq!(method.callback().unwrap().payload(), "String");
        assert!(!method.has_callback_parameters());
    }

    #[test]
    fn script_invocable_trailing_parameter_is_not_a_result_callback() {
        let mut progress = callback("progress", "f32");
        progress.script_invocable = true;

        let method =
            MethodDescriptor::from_parameters("watch", None, &[value("topic", "String"), progress])
                .unwrap();

        assert!(method.callback().is_none());
        assert!(method.has_callback_parameters());
        assert!(method.parameters()[1].is_script_invocable());
    }

    #[test]
    fn script_invocable_marker_requires_callback_shape() {
        let raw = RawParameter {
            name: "progress",
            ty: "f32",
            callback_shaped: false,
            script_invocable: true,
        };

        let err = MethodDescriptor::from_parameters("watch", None, &[raw]).unwrap_err();
        assert_eq!(
            err,
            DescriptorError::NotCallbackShaped {
                method: "watch",
                parameter: "progress",
            }
        );
    }

    #[test]
    fn unmarked_callback_parameter_flags_the_method_without_registration_role() {
        let method = MethodDescriptor::from_parameters(
            "observe",
            None,
            &[callback("listener", "Event"), value("count", "u32")],
        )
        .unwrap();

        assert!(method.callback().is_none());
        assert!(method.has_callback_parameters());
        assert!(!method.parameters()[0].is_script_invocable());
    }

    #[test]
    fn script_name_defaults_to_native_name() {
        let method = MethodDescriptor::new("refresh");
        assert_eq!(method.script_name(), "refresh");

        let renamed = MethodDescriptor::new("fetch").script_name("fetchProfile");
        assert_eq!(renamed.native_name(), "fetch");
        assert_eq!(renamed.script_name(), "fetchProfile");
    }

    #[test]
    fn needs_callbacks_false_for_fire_and_forget_interfaces() {
        let descriptor = InterfaceDescriptor::builder("Logger")
            .method(
                MethodDescriptor::new("log")
                    .parameter(ParameterDescriptor::value("line", "String")),
            )
            .build();

        assert!(!descriptor.needs_callbacks());
    }

    #[test]
    fn needs_callbacks_derives_from_properties_too() {
        let descriptor = InterfaceDescriptor::builder("Document")
            .property(PropertyDescriptor::read(
                "title",
                "title",
                CallbackDescriptor::new("result", "String"),
            ))
            .build();

        assert!(descriptor.needs_callbacks());
        assert!(descriptor.property("title").is_some());
        assert!(descriptor.method("title").is_none());
    }

    #[test]
    fn write_property_carries_no_callback() {
        let descriptor = InterfaceDescriptor::builder("Player")
            .property(PropertyDescriptor::write(
                "set_volume",
                "volume",
                ParameterDescriptor::value("volume", "f32"),
            ))
            .build();

        assert!(!descriptor.needs_callbacks());
        assert_eq!(
            descriptor.property("set_volume").unwrap().script_name(),
            "volume"
        );
    }
}
