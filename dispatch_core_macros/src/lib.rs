//! Attribute macros that register controller types with `dispatch_core`.
//!
//! Both attributes go on an inherent `impl` block. Methods in the block marked
//! with `#[request_mapping(...)]` become routes:
//!
//! ```rust,ignore
//! #[derive(Default)]
//! pub struct Greeting;
//!
//! #[dispatch_core::controller]
//! impl Greeting {
//!     #[request_mapping("/hello", method = GET)]
//!     fn hello(&self) -> ModelAndView { ModelAndView::json().with("message", "hi") }
//!
//!     #[request_mapping(path = "/echo", method = [GET, POST])]
//!     fn echo(&self, request: &HttpRequest) -> anyhow::Result<ModelAndView> { /* ... */ }
//! }
//! ```
//!
//! The generated code submits one `ControllerRegistration` to the link-time
//! inventory. The shared instance is built through `Default`.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{
    bracketed, parse_macro_input, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Result as SynResult,
    Token, Type,
};

const MAPPING_ATTR: &str = "request_mapping";
const METHODS: [(&str, &str); 8] = [
    ("GET", "Get"),
    ("HEAD", "Head"),
    ("POST", "Post"),
    ("PUT", "Put"),
    ("PATCH", "Patch"),
    ("DELETE", "Delete"),
    ("OPTIONS", "Options"),
    ("TRACE", "Trace"),
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Flavor {
    /// Marker-annotated controller
    Annotated,
    /// Implementer of `dispatch_core::handler::Controller`
    Interface,
}

/// Register an `impl` block's mapped methods with the annotated-controller registry.
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, Flavor::Annotated)
}

/// Register an `impl` block's mapped methods with the interface-controller
/// registry. The type must implement `dispatch_core::handler::Controller`.
#[proc_macro_attribute]
pub fn interface_controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, Flavor::Interface)
}

fn expand(attr: TokenStream, item: TokenStream, flavor: Flavor) -> TokenStream {
    let attr = TokenStream2::from(attr);
    if !attr.is_empty() {
        return syn::Error::new_spanned(attr, "controller attributes take no arguments")
            .to_compile_error()
            .into();
    }
    let input = parse_macro_input!(item as ItemImpl);
    match expand_impl(input, flavor) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// `#[request_mapping("/p", method = GET)]` or `#[request_mapping(path = "/p", method = [GET, POST])]`
struct MappingArgs {
    path: LitStr,
    methods: Vec<Ident>,
}

impl Parse for MappingArgs {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut path: Option<LitStr> = None;
        let mut methods: Vec<Ident> = Vec::new();

        if input.peek(LitStr) {
            path = Some(input.parse()?);
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match key.to_string().as_str() {
                "path" => {
                    if path.is_some() {
                        return Err(syn::Error::new(key.span(), "route path given twice"));
                    }
                    path = Some(input.parse()?);
                }
                "method" => {
                    if input.peek(syn::token::Bracket) {
                        let content;
                        bracketed!(content in input);
                        let list = Punctuated::<Ident, Token![,]>::parse_terminated(&content)?;
                        methods.extend(list);
                    } else {
                        methods.push(input.parse()?);
                    }
                }
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unexpected `{other}`, expected `path` or `method`"),
                    ))
                }
            }
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        let path = path.ok_or_else(|| syn::Error::new(Span::call_site(), "missing route path"))?;
        if !path.value().starts_with('/') {
            return Err(syn::Error::new(path.span(), "route path must start with `/`"));
        }
        for (i, method) in methods.iter().enumerate() {
            if methods[..i].contains(method) {
                return Err(syn::Error::new(method.span(), format!("`{method}` listed twice")));
            }
        }
        Ok(MappingArgs { path, methods })
    }
}

fn request_method(ident: &Ident) -> SynResult<TokenStream2> {
    let name = ident.to_string();
    METHODS
        .iter()
        .find(|(token, _)| *token == name)
        .map(|(_, variant)| {
            let variant = Ident::new(variant, ident.span());
            quote! { ::dispatch_core::router::RequestMethod::#variant }
        })
        .ok_or_else(|| {
            let valid: Vec<&str> = METHODS.iter().map(|(token, _)| *token).collect();
            syn::Error::new(
                ident.span(),
                format!("unknown HTTP method `{name}`, expected one of {}", valid.join(", ")),
            )
        })
}

/// Remove and parse the mapping attribute of a method, if any.
fn take_mapping(method: &mut ImplItemFn) -> SynResult<Option<MappingArgs>> {
    let mut found = None;
    let mut kept = Vec::with_capacity(method.attrs.len());
    for attr in method.attrs.drain(..) {
        if attr.path().is_ident(MAPPING_ATTR) {
            if found.is_some() {
                return Err(syn::Error::new_spanned(attr, "method mapped twice"));
            }
            found = Some(attr.parse_args::<MappingArgs>()?);
        } else {
            kept.push(attr);
        }
    }
    method.attrs = kept;
    Ok(found)
}

/// The call of a mapped method, checked against the supported signatures.
fn method_call(method: &ImplItemFn) -> SynResult<TokenStream2> {
    let sig = &method.sig;
    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(sig.asyncness, "mapped methods cannot be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&sig.generics, "mapped methods cannot be generic"));
    }
    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => {
            return Err(syn::Error::new_spanned(
                &sig.ident,
                "mapped methods must take `&self`; controller instances are shared",
            ))
        }
    }

    let name = &sig.ident;
    match sig.inputs.len() - 1 {
        0 => Ok(quote! { __controller.#name() }),
        1 => Ok(quote! { __controller.#name(__request) }),
        2 => Ok(quote! { __controller.#name(__request, __response) }),
        _ => Err(syn::Error::new_spanned(
            &sig.inputs,
            "mapped methods take at most `&HttpRequest` and `&mut HttpResponse`",
        )),
    }
}

fn expand_impl(mut input: ItemImpl, flavor: Flavor) -> SynResult<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(path, "expected an inherent impl block"));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&input.generics, "generic controllers cannot be registered"));
    }
    let self_ty: Type = (*input.self_ty).clone();

    let mut invokers = Vec::new();
    let mut routes = Vec::new();
    for item in &mut input.items {
        let ImplItem::Fn(method) = item else { continue };
        let Some(mapping) = take_mapping(method)? else { continue };

        let call = method_call(method)?;
        let name = &method.sig.ident;
        let invoker = format_ident!("__dispatch_core_invoke_{}", name);
        invokers.push(quote! {
            fn #invoker(
                __instance: &(dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync),
                __request: &::dispatch_core::server::HttpRequest,
                __response: &mut ::dispatch_core::server::HttpResponse,
            ) -> ::dispatch_core::__private::anyhow::Result<::dispatch_core::view::ModelAndView> {
                let __controller = ::dispatch_core::discovery::downcast_controller::<#self_ty>(__instance)?;
                ::dispatch_core::handler::IntoHandlerResult::into_handler_result(#call)
            }
        });

        let path = &mapping.path;
        let methods = mapping.methods.iter().map(request_method).collect::<SynResult<Vec<_>>>()?;
        let method_name = name.to_string();
        routes.push(quote! {
            ::dispatch_core::discovery::RouteDefinition {
                name: #method_name,
                path: #path,
                methods: &[#(#methods),*],
                invoke: #invoker,
            }
        });
    }

    let annotated = flavor == Flavor::Annotated;
    let implements_controller = flavor == Flavor::Interface;
    let capability_check = if implements_controller {
        quote! {
            fn __require_controller<T: ::dispatch_core::handler::Controller>() {}
            const _: fn() = __require_controller::<#self_ty>;
        }
    } else {
        TokenStream2::new()
    };

    Ok(quote! {
        #input

        const _: () = {
            #capability_check
            #(#invokers)*

            ::dispatch_core::__private::inventory::submit! {
                ::dispatch_core::discovery::ControllerRegistration {
                    type_name: ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#self_ty)),
                    module_path: ::core::module_path!(),
                    annotated: #annotated,
                    implements_controller: #implements_controller,
                    construct: ::core::option::Option::Some(::dispatch_core::discovery::default_constructor::<#self_ty>),
                    routes: &[#(#routes),*],
                }
            }
        };
    })
}
