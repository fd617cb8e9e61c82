//! Attribute parsing shared by the `#[bridge]` macro.

use syn::parse::{Parse, ParseStream};
use syn::{Attribute, LitStr, Meta};

/// Arguments of the outer `#[bridge(...)]` attribute on a trait.
#[derive(Debug, Default)]
pub struct BridgeAttrs {
    /// Emit generated invocations through the diagnostic sink before sending.
    pub debug: bool,
}

impl Parse for BridgeAttrs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut result = Self::default();

        if input.is_empty() {
            return Ok(result);
        }

        let ident: syn::Ident = input.parse()?;
        if ident == "debug" {
            result.debug = true;
        } else {
            return Err(syn::Error::new(ident.span(), "expected `debug`"));
        }

        Ok(result)
    }
}

/// Arguments of a `#[bridge(...)]` attribute on a trait method.
#[derive(Debug, Default)]
pub struct MethodAttrs {
    /// Script-side name override.
    pub script_name: Option<String>,
    /// Record the method as a property accessor.
    pub property: bool,
}

/// Collect `#[bridge(...)]` arguments from a method's attributes.
pub fn method_attrs(attrs: &[Attribute]) -> syn::Result<MethodAttrs> {
    let mut result = MethodAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("bridge") {
            continue;
        }
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("property") {
                result.property = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                result.script_name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `property` or `name = \"...\"`"))
            }
        })?;
    }

    Ok(result)
}

/// True for the `#[callback]` marker on a parameter.
pub fn is_callback_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("callback")
}

/// True for any helper attribute the macro consumes.
pub fn is_helper_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("bridge") || is_callback_attr(attr)
}
