mod docs;
mod enumeration;
mod input;
mod object;
mod scalar;

use proc_macro2::TokenStream;
use quote::quote;
use typebridge_model::{builtin, names};

use self::object::ProxySource;
use crate::{
    context::Context,
    idents::{ident, module_name},
    CodegenError,
};

/// Name of the root object every query starts from.
const ROOT_OBJECT: &str = "Query";

/// One file per object and interface, one per group of enums, scalars and input objects, then
/// the `mod.rs` tying them together.
pub(crate) fn generate_files(context: &Context<'_>) -> Result<Vec<(String, TokenStream)>, CodegenError> {
    let model = context.model;
    let mut files = Vec::new();

    let proxies = model
        .objects
        .values()
        .map(ProxySource::object)
        .chain(model.interfaces.values().map(ProxySource::interface));

    for source in proxies {
        let proxy = object::generate_proxy(context, &source)?;
        files.push((module_name(source.name), with_imports(context, proxy)));
    }

    if !model.enums.is_empty() {
        let enums = model
            .enums
            .values()
            .map(|enumeration| enumeration::generate_enum(&context.client, enumeration));
        files.push(("enums".to_string(), with_imports(context, quote! { #(#enums)* })));
    }

    let scalars = model
        .scalars
        .values()
        .filter(|scalar| scalar.name != builtin::VOID && !builtin::is_builtin(&scalar.name))
        .map(|scalar| scalar::generate_scalar(&context.client, scalar))
        .collect::<Vec<_>>();
    if !scalars.is_empty() {
        files.push(("scalars".to_string(), with_imports(context, quote! { #(#scalars)* })));
    }

    if !model.input_objects.is_empty() {
        let inputs = model
            .input_objects
            .values()
            .map(|input| input::generate_input(context, input))
            .collect::<Result<Vec<_>, _>>()?;
        files.push(("inputs".to_string(), with_imports(context, quote! { #(#inputs)* })));
    }

    let root = generate_root(context, files.iter().map(|(name, _)| name.as_str()));
    files.push(("mod".to_string(), root));

    Ok(files)
}

fn with_imports(context: &Context<'_>, tokens: TokenStream) -> TokenStream {
    let client = &context.client;

    quote! {
        #[allow(unused_imports)]
        use #client::{DynGraphqlClient, ObjectProxy, QueryError, RemoteObjectHandle, Selection};

        #[allow(unused_imports)]
        use super::*;

        #tokens
    }
}

fn generate_root<'a>(context: &Context<'_>, modules: impl Iterator<Item = &'a str>) -> TokenStream {
    let client = &context.client;
    let modules = modules.map(|name| ident(&names::rust_field_name(name))).collect::<Vec<_>>();

    let entry = context.model.objects.contains_key(ROOT_OBJECT).then(|| {
        let root = ident(ROOT_OBJECT);
        quote! {
            /// Starts a query at the root of the schema.
            pub fn query(client: #client::DynGraphqlClient) -> #root {
                <#root as #client::ObjectProxy>::new(#client::query(), client)
            }
        }
    });

    quote! {
        #(mod #modules;)*

        #(pub use #modules::*;)*

        #entry
    }
}
