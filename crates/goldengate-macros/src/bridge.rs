//! Implementation of the `#[bridge]` attribute macro.
//!
//! The macro transforms a Rust trait into a forwarding bridge proxy: it
//! classifies every parameter (ordinary value, trailing result callback, or
//! `#[callback]`-marked script-invocable callback), re-emits the trait with
//! helper attributes stripped, and generates a `<Trait>Bridge` type whose
//! methods encode script invocations and register pending callbacks.
//!
//! Classification violations are configuration errors in the declared
//! interface and are reported at expansion time, so generation aborts for
//! that interface before any proxy exists.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Error, FnArg, GenericArgument, ItemTrait, Pat, PathArguments, ReturnType, TraitItem,
    TraitItemFn, Type, parse_macro_input,
};

use crate::attrs::{self, BridgeAttrs};

pub fn bridge_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match syn::parse::<BridgeAttrs>(attr) {
        Ok(attrs) => attrs,
        Err(err) => return err.to_compile_error().into(),
    };

    let input = parse_macro_input!(item as ItemTrait);

    match bridge_inner(&attrs, input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

// ============================================================================
// Interface model
// ============================================================================

enum ReturnStyle {
    /// Fire-and-forget: encode errors are reported and the call is dropped.
    Unit,
    /// `BridgeResult<()>`-style: encode errors propagate with `?`.
    Result,
}

enum ParamRole {
    /// Serialized into the call expression.
    Value(Box<Type>),
    /// `#[callback]`-marked: registered and rendered as a forwarding
    /// function the script side may invoke at multiple points.
    Invocable(Box<Type>),
}

struct ParamModel {
    ident: syn::Ident,
    name: String,
    role: ParamRole,
}

struct CallbackModel {
    ident: syn::Ident,
    name: String,
    payload: Box<Type>,
}

struct MethodModel {
    sig: syn::Signature,
    native_name: String,
    script_name: String,
    style: ReturnStyle,
    params: Vec<ParamModel>,
    trailing: Option<CallbackModel>,
}

enum PropertyAccessModel {
    Read(CallbackModel),
    Write {
        ident: syn::Ident,
        name: String,
        ty: Box<Type>,
    },
}

struct PropertyModel {
    sig: syn::Signature,
    native_name: String,
    script_name: String,
    style: ReturnStyle,
    access: PropertyAccessModel,
}

enum Entry {
    Method(MethodModel),
    Property(PropertyModel),
}

impl Entry {
    fn references_callbacks(&self) -> bool {
        match self {
            Entry::Method(method) => {
                method.trailing.is_some()
                    || method
                        .params
                        .iter()
                        .any(|p| matches!(p.role, ParamRole::Invocable(_)))
            }
            Entry::Property(property) => matches!(property.access, PropertyAccessModel::Read(_)),
        }
    }
}

// ============================================================================
// Collection
// ============================================================================

fn bridge_inner(attrs: &BridgeAttrs, mut input: ItemTrait) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "bridge traits cannot be generic",
        ));
    }

    let mut entries = Vec::new();
    for item in &input.items {
        match item {
            TraitItem::Fn(method) => entries.push(collect_entry(method)?),
            other => {
                return Err(Error::new_spanned(
                    other,
                    "bridge traits may only contain methods",
                ));
            }
        }
    }

    strip_helper_attrs(&mut input);
    Ok(generate(attrs, &input, &entries))
}

fn collect_entry(method: &TraitItemFn) -> syn::Result<Entry> {
    let sig = &method.sig;
    let native_name = sig.ident.to_string();

    if method.default.is_some() {
        return Err(Error::new_spanned(
            &sig.ident,
            "bridge trait methods cannot have default bodies",
        ));
    }
    if sig.asyncness.is_some() {
        return Err(Error::new_spanned(
            sig,
            "bridge methods are fire-and-forget; deferred results arrive through `CallbackHandle`",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &sig.generics,
            "bridge methods cannot be generic",
        ));
    }
    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(Error::new_spanned(sig, "bridge methods must take `&self`"));
        }
    }

    let style = return_style(&sig.output)?;
    let meta = attrs::method_attrs(&method.attrs)?;
    let script_name = meta
        .script_name
        .clone()
        .unwrap_or_else(|| native_name.clone());

    let typed: Vec<&syn::PatType> = sig
        .inputs
        .iter()
        .skip(1)
        .filter_map(|arg| match arg {
            FnArg::Typed(pat) => Some(pat),
            FnArg::Receiver(_) => None,
        })
        .collect();

    let count = typed.len();
    let mut params = Vec::new();
    let mut trailing = None;

    for (index, pat_type) in typed.iter().enumerate() {
        let ident = match &*pat_type.pat {
            Pat::Ident(pat) => pat.ident.clone(),
            other => {
                return Err(Error::new_spanned(
                    other,
                    "bridge method parameters must be plain identifiers",
                ));
            }
        };
        let name = ident.to_string();
        let marked = pat_type.attrs.iter().any(attrs::is_callback_attr);
        let payload = callback_payload(&pat_type.ty);

        if payload.is_none() && handle_payload(&pat_type.ty).is_some() {
            return Err(Error::new_spanned(
                &pat_type.ty,
                "take callback parameters by reference: `&CallbackHandle<T>`",
            ));
        }

        match (marked, payload) {
            (true, Some(payload)) => params.push(ParamModel {
                ident,
                name,
                role: ParamRole::Invocable(Box::new(payload)),
            }),
            (true, None) => {
                return Err(Error::new_spanned(
                    pat_type,
                    format!(
                        "parameter `{name}` of `{native_name}` is marked as script-invocable but is not callback-shaped"
                    ),
                ));
            }
            (false, Some(payload)) if index + 1 == count => {
                trailing = Some(CallbackModel {
                    ident,
                    name,
                    payload: Box::new(payload),
                });
            }
            (false, Some(_)) => {
                return Err(Error::new_spanned(
                    pat_type,
                    format!(
                        "non-trailing callback parameter `{name}` of `{native_name}` must be marked `#[callback]`"
                    ),
                ));
            }
            (false, None) => params.push(ParamModel {
                ident,
                name,
                role: ParamRole::Value(Box::new((*pat_type.ty).clone())),
            }),
        }
    }

    let sig = cleaned_signature(sig);

    if meta.property {
        let mut params = params;
        let access = match (trailing, params.pop(), params.pop()) {
            (Some(callback), None, None) => PropertyAccessModel::Read(callback),
            (
                None,
                Some(ParamModel {
                    ident,
                    name,
                    role: ParamRole::Value(ty),
                }),
                None,
            ) => PropertyAccessModel::Write { ident, name, ty },
            _ => {
                return Err(Error::new_spanned(
                    &sig.ident,
                    format!(
                        "property `{native_name}` must take either a result callback or exactly one value argument"
                    ),
                ));
            }
        };
        return Ok(Entry::Property(PropertyModel {
            sig,
            native_name,
            script_name,
            style,
            access,
        }));
    }

    Ok(Entry::Method(MethodModel {
        sig,
        native_name,
        script_name,
        style,
        params,
        trailing,
    }))
}

fn return_style(output: &ReturnType) -> syn::Result<ReturnStyle> {
    match output {
        ReturnType::Default => Ok(ReturnStyle::Unit),
        ReturnType::Type(_, ty) => {
            if let Type::Path(path) = &**ty {
                if let Some(segment) = path.path.segments.last() {
                    if segment.ident == "Result" || segment.ident == "BridgeResult" {
                        return Ok(ReturnStyle::Result);
                    }
                }
            }
            Err(Error::new_spanned(
                ty,
                "bridge methods must return `()` or `goldengate::BridgeResult<()>`",
            ))
        }
    }
}

/// Payload type of a `&CallbackHandle<T>` parameter, if callback-shaped.
fn callback_payload(ty: &Type) -> Option<Type> {
    match ty {
        Type::Reference(reference) => handle_payload(&reference.elem),
        _ => None,
    }
}

/// Payload type of a bare `CallbackHandle<T>` path.
fn handle_payload(ty: &Type) -> Option<Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != "CallbackHandle" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(payload) => Some(payload.clone()),
        _ => None,
    }
}

fn cleaned_signature(sig: &syn::Signature) -> syn::Signature {
    let mut sig = sig.clone();
    for arg in sig.inputs.iter_mut() {
        if let FnArg::Typed(pat) = arg {
            pat.attrs.retain(|attr| !attrs::is_helper_attr(attr));
        }
    }
    sig
}

fn strip_helper_attrs(input: &mut ItemTrait) {
    for item in input.items.iter_mut() {
        if let TraitItem::Fn(method) = item {
            method.attrs.retain(|attr| !attrs::is_helper_attr(attr));
            for arg in method.sig.inputs.iter_mut() {
                if let FnArg::Typed(pat) = arg {
                    pat.attrs.retain(|attr| !attrs::is_helper_attr(attr));
                }
            }
        }
    }
}

// ============================================================================
// Generation
// ============================================================================

fn generate(attrs: &BridgeAttrs, input: &ItemTrait, entries: &[Entry]) -> TokenStream2 {
    let trait_ident = &input.ident;
    let vis = &input.vis;
    let trait_name = trait_ident.to_string();
    let bridge_ident = format_ident!("{trait_ident}Bridge");
    let bridge_doc = format!("Generated script bridge implementing [`{trait_name}`].");
    let debug = attrs.debug;

    let needs_callbacks = entries.iter().any(Entry::references_callbacks);

    let descriptor_entries: Vec<TokenStream2> = entries.iter().map(descriptor_tokens).collect();
    let method_impls: Vec<TokenStream2> = entries.iter().map(impl_tokens).collect();

    let callbacks_field = needs_callbacks.then(|| {
        quote! { callbacks: ::std::sync::Arc<::goldengate::CallbackRegistry>, }
    });
    let callbacks_init = needs_callbacks.then(|| {
        quote! { let callbacks = inner.install_result_sink(); }
    });
    let self_expr = if needs_callbacks {
        quote! { Self { inner, callbacks } }
    } else {
        quote! { Self { inner } }
    };

    quote! {
        #input

        #[doc = #bridge_doc]
        #vis struct #bridge_ident {
            inner: ::goldengate::Bridge,
            #callbacks_field
        }

        impl #bridge_ident {
            /// Create a proxy instance over `channel`.
            ///
            /// When the interface needs callbacks this installs the inbound
            /// result path: a per-instance registry, a result sink registered
            /// under the interface name, and the callback-factory bootstrap
            /// script.
            #vis fn new(channel: ::std::sync::Arc<dyn ::goldengate::ScriptChannel>) -> Self {
                let inner = ::goldengate::Bridge::new(channel, Self::descriptor());
                #callbacks_init
                #self_expr
            }

            /// Descriptor of the bridged interface.
            #vis fn descriptor() -> &'static ::goldengate::InterfaceDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<::goldengate::InterfaceDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::goldengate::InterfaceDescriptor::builder(#trait_name)
                        .debug(#debug)
                        #(#descriptor_entries)*
                        .build()
                })
            }
        }

        impl #trait_ident for #bridge_ident {
            #(#method_impls)*
        }
    }
}

fn descriptor_tokens(entry: &Entry) -> TokenStream2 {
    match entry {
        Entry::Method(method) => {
            let native = &method.native_name;
            let script = (method.script_name != method.native_name).then(|| {
                let script = &method.script_name;
                quote! { .script_name(#script) }
            });
            let params = method.params.iter().map(|param| {
                let name = &param.name;
                match &param.role {
                    ParamRole::Value(ty) => quote! {
                        .parameter(::goldengate::ParameterDescriptor::value(
                            #name,
                            ::std::any::type_name::<#ty>(),
                        ))
                    },
                    ParamRole::Invocable(payload) => quote! {
                        .parameter(::goldengate::ParameterDescriptor::callback(
                            #name,
                            ::std::any::type_name::<#payload>(),
                            true,
                        ))
                    },
                }
            });
            let trailing = method.trailing.as_ref().map(|callback| {
                let name = &callback.name;
                let payload = &callback.payload;
                quote! {
                    .trailing_callback(::goldengate::CallbackDescriptor::new(
                        #name,
                        ::std::any::type_name::<#payload>(),
                    ))
                }
            });
            quote! {
                .method(
                    ::goldengate::MethodDescriptor::new(#native)
                        #script
                        #(#params)*
                        #trailing
                )
            }
        }
        Entry::Property(property) => {
            let native = &property.native_name;
            let script = &property.script_name;
            match &property.access {
                PropertyAccessModel::Read(callback) => {
                    let name = &callback.name;
                    let payload = &callback.payload;
                    quote! {
                        .property(::goldengate::PropertyDescriptor::read(
                            #native,
                            #script,
                            ::goldengate::CallbackDescriptor::new(
                                #name,
                                ::std::any::type_name::<#payload>(),
                            ),
                        ))
                    }
                }
                PropertyAccessModel::Write { name, ty, .. } => quote! {
                    .property(::goldengate::PropertyDescriptor::write(
                        #native,
                        #script,
                        ::goldengate::ParameterDescriptor::value(
                            #name,
                            ::std::any::type_name::<#ty>(),
                        ),
                    ))
                },
            }
        }
    }
}

fn impl_tokens(entry: &Entry) -> TokenStream2 {
    match entry {
        Entry::Method(method) => method_impl_tokens(method),
        Entry::Property(property) => property_impl_tokens(property),
    }
}

fn method_impl_tokens(method: &MethodModel) -> TokenStream2 {
    let sig = &method.sig;
    let script = &method.script_name;

    let trailing_reg = method.trailing.as_ref().map(|callback| {
        let ident = &callback.ident;
        quote! {
            let __gg_result_id = self.callbacks.next_id();
            self.callbacks.register(__gg_result_id, #ident.raw_weak());
        }
    });
    let invocable_regs = method.params.iter().filter_map(|param| {
        matches!(param.role, ParamRole::Invocable(_)).then(|| {
            let ident = &param.ident;
            let id_ident = format_ident!("__gg_id_{}", ident);
            quote! {
                let #id_ident = self.callbacks.next_id();
                self.callbacks.register(#id_ident, #ident.raw_weak());
            }
        })
    });

    if method.params.is_empty() && method.trailing.is_none() {
        let ret = result_ok(&method.style);
        return quote! {
            #sig {
                self.inner.dispatch(::goldengate::Invocation::new(#script).finish());
                #ret
            }
        };
    }

    let pushes = method.params.iter().map(|param| {
        let ident = &param.ident;
        let name = &param.name;
        match &param.role {
            ParamRole::Value(_) => match method.style {
                ReturnStyle::Result => quote! {
                    __gg_call.push_value(#name, &#ident)?;
                },
                ReturnStyle::Unit => quote! {
                    if let ::std::result::Result::Err(__gg_error) =
                        __gg_call.push_value(#name, &#ident)
                    {
                        ::goldengate::report_dropped_call(&__gg_error);
                        return;
                    }
                },
            },
            ParamRole::Invocable(_) => {
                let id_ident = format_ident!("__gg_id_{}", ident);
                quote! { __gg_call.push_callback(#id_ident); }
            }
        }
    });
    let trailing_push = method
        .trailing
        .as_ref()
        .map(|_| quote! { __gg_call.push_callback(__gg_result_id); });
    let ret = result_ok(&method.style);

    quote! {
        #sig {
            #trailing_reg
            #(#invocable_regs)*
            let mut __gg_call = ::goldengate::Invocation::new(#script);
            #(#pushes)*
            #trailing_push
            self.inner.dispatch(__gg_call.finish());
            #ret
        }
    }
}

fn property_impl_tokens(property: &PropertyModel) -> TokenStream2 {
    let sig = &property.sig;
    let script = &property.script_name;

    match &property.access {
        PropertyAccessModel::Read(callback) => {
            let ident = &callback.ident;
            let ret = result_ok(&property.style);
            quote! {
                #sig {
                    let __gg_result_id = self.callbacks.next_id();
                    self.callbacks.register(__gg_result_id, #ident.raw_weak());
                    self.inner.dispatch(::goldengate::property_read(#script, __gg_result_id));
                    #ret
                }
            }
        }
        PropertyAccessModel::Write { ident, .. } => match property.style {
            ReturnStyle::Result => quote! {
                #sig {
                    self.inner.dispatch(::goldengate::property_write(#script, &#ident)?);
                    ::std::result::Result::Ok(())
                }
            },
            ReturnStyle::Unit => quote! {
                #sig {
                    match ::goldengate::property_write(#script, &#ident) {
                        ::std::result::Result::Ok(__gg_expression) => {
                            self.inner.dispatch(__gg_expression)
                        }
                        ::std::result::Result::Err(__gg_error) => {
                            ::goldengate::report_dropped_call(&__gg_error)
                        }
                    }
                }
            },
        },
    }
}

fn result_ok(style: &ReturnStyle) -> Option<TokenStream2> {
    matches!(style, ReturnStyle::Result).then(|| quote! { ::std::result::Result::Ok(()) })
}
