//! Marker attributes for typebridge modules.
//!
//! The same markers are read by the scanner to build the type model, these macros generate the
//! native half: value conversions and registration of the functions.

mod attrs;
mod enumeration;
mod interface;
mod object;

use proc_macro::TokenStream;
use syn::{parse_macro_input, Item};

/// Exposes a struct as a module object, or registers the functions of its `impl` block.
///
/// On a struct, every named field is part of the object state. Fields marked `#[field]` are
/// exposed too. Instances are allocated with `Default` before their state is written back.
///
/// On an `impl` block, methods marked `#[function]` or `#[constructor]` are registered.
#[proc_macro_attribute]
pub fn object(_args: TokenStream, input: TokenStream) -> TokenStream {
    let expanded = match parse_macro_input!(input as Item) {
        Item::Struct(item) => object::expand_struct(item),
        Item::Impl(item) => object::expand_impl(item),
        other => Err(syn::Error::new_spanned(
            other,
            "#[object] goes on a struct or on its inherent impl block",
        )),
    };

    expanded.unwrap_or_else(syn::Error::into_compile_error).into()
}

/// Exposes a trait as an interface and generates a `{Trait}Ref` handle for values of it.
#[proc_macro_attribute]
pub fn interface(_args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as syn::ItemTrait);

    interface::expand(item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Exposes an enum with unit variants.
#[proc_macro_attribute]
pub fn enumeration(_args: TokenStream, input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as syn::ItemEnum);

    enumeration::expand(item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Marks a method of an `#[object]` impl block as a function of the object.
#[proc_macro_attribute]
pub fn function(_args: TokenStream, input: TokenStream) -> TokenStream {
    misplaced(input, "#[function]")
}

/// Marks the method of an `#[object]` impl block building new instances.
#[proc_macro_attribute]
pub fn constructor(_args: TokenStream, input: TokenStream) -> TokenStream {
    misplaced(input, "#[constructor]")
}

// Both are consumed by `#[object]`, reaching them means the enclosing block is not one.
fn misplaced(input: TokenStream, marker: &str) -> TokenStream {
    let input = proc_macro2::TokenStream::from(input);
    let error = syn::Error::new_spanned(&input, format!("{marker} is only allowed inside an #[object] impl block"))
        .into_compile_error();

    quote::quote!(#error #input).into()
}
