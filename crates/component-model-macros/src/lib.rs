//! Procedural macros for the component model.
//!
//! This crate provides `#[derive(Component)]`, which implements
//! `component_model_core::Component` from a struct-level attribute.
//!
//! # Attributes
//!
//! ## `#[component(...)]`
//!
//! ```ignore
//! #[derive(Clone, Component)]
//! #[component(container, kinds(Presenter, dyn Renderable), factory = "build", factory_names("title", "footer"))]
//! struct Page {
//!     title: String,
//! }
//!
//! impl Page {
//!     fn build(
//!         &self,
//!         tree: &mut ComponentTree,
//!         this: ComponentId,
//!         name: &str,
//!     ) -> TreeResult<Option<ComponentId>> {
//!         // ...
//!     }
//! }
//! ```
//!
//! Component attributes:
//! - `container`: The component owns children
//! - `kinds(T, ...)`: Capability kinds satisfied besides the type itself
//! - `factory = "method"`: Inherent method used to create children on demand
//! - `factory_names("a", ...)`: Names the factory can build, used for hints
//!
//! Without any attribute the type derives as a plain leaf.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Attribute, DeriveInput, Ident, LitStr, Token, Type};

/// Derive the `Component` trait.
///
/// The type must also implement `Clone` so trees containing it can be
/// cloned.
///
/// # Example
///
/// ```ignore
/// use component_model::prelude::*;
///
/// #[derive(Clone, Component)]
/// #[component(container)]
/// struct Panel;
///
/// #[derive(Clone, Component)]
/// struct Label {
///     text: String,
/// }
/// ```
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive_component(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed struct-level component attributes.
#[derive(Default)]
struct ComponentAttrs {
    container: bool,
    kinds: Vec<Type>,
    factory: Option<Ident>,
    factory_names: Vec<LitStr>,
}

fn impl_derive_component(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let attrs = parse_component_attrs(&input.attrs)?;

    if attrs.factory.is_some() && !attrs.container {
        return Err(syn::Error::new_spanned(
            input,
            "`factory` requires `container`: only containers create children",
        ));
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let container = attrs.container;
    let kinds = &attrs.kinds;

    let kinds_fn = if kinds.is_empty() {
        quote! {}
    } else {
        quote! {
            fn kinds(&self) -> ::std::vec::Vec<::component_model_core::Kind> {
                ::std::vec![#(::component_model_core::Kind::of::<#kinds>()),*]
            }
        }
    };

    let factory_fn = match &attrs.factory {
        Some(method) => quote! {
            fn create_component(
                &self,
                tree: &mut ::component_model_core::ComponentTree,
                this: ::component_model_core::ComponentId,
                name: &str,
            ) -> ::component_model_core::TreeResult<::std::option::Option<::component_model_core::ComponentId>> {
                self.#method(tree, this, name)
            }
        },
        None => quote! {},
    };

    let names = &attrs.factory_names;
    let factory_names_fn = if names.is_empty() {
        quote! {}
    } else {
        quote! {
            fn factory_names(&self) -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::string::String::from(#names)),*]
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::component_model_core::Component for #name #ty_generics #where_clause {
            #kinds_fn

            fn is_container(&self) -> bool {
                #container
            }

            #factory_fn

            #factory_names_fn
        }
    })
}

/// Parse `#[component(...)]` attributes.
fn parse_component_attrs(attrs: &[Attribute]) -> syn::Result<ComponentAttrs> {
    let mut parsed = ComponentAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("component") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("container") {
                parsed.container = true;
            } else if meta.path.is_ident("kinds") {
                let content;
                syn::parenthesized!(content in meta.input);
                let kinds = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                parsed.kinds.extend(kinds);
            } else if meta.path.is_ident("factory") {
                let method: LitStr = meta.value()?.parse()?;
                parsed.factory = Some(method.parse()?);
            } else if meta.path.is_ident("factory_names") {
                let content;
                syn::parenthesized!(content in meta.input);
                let names = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                parsed.factory_names.extend(names);
            } else {
                return Err(meta.error(
                    "unsupported component attribute, expected `container`, `kinds`, `factory` or `factory_names`",
                ));
            }
            Ok(())
        })?;
    }

    Ok(parsed)
}
