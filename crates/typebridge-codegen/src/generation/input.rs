use proc_macro2::TokenStream;
use quote::quote;
use typebridge_model::InputObjectDef;

use super::docs::Docs;
use crate::{
    context::Context,
    idents::{FieldIdent, TypeIdent},
    CodegenError,
};

/// A plain struct, embedded into queries as an object literal.
pub(crate) fn generate_input(context: &Context<'_>, input: &InputObjectDef) -> Result<TokenStream, CodegenError> {
    let client = &context.client;
    let name = TypeIdent(&input.name);
    let docs = Docs::new(input.description.as_deref());

    let mut fields = Vec::with_capacity(input.fields.len());
    let mut entries = Vec::with_capacity(input.fields.len());

    for field in &input.fields {
        let location = format!("{}.{}", input.name, field.name);
        let ident = FieldIdent(&field.name);
        let api_name = field.name.as_str();
        let ty = context.value_type(&field.type_ref, &location)?;
        let docs = Docs::new(field.description.as_deref());

        if field.optional {
            fields.push(quote! {
                #docs
                #[serde(rename = #api_name, default, skip_serializing_if = "Option::is_none")]
                pub #ident: Option<#ty>,
            });
            entries.push(quote! { (#api_name, value.#ident.map(Self::from)) });
        } else {
            fields.push(quote! {
                #docs
                #[serde(rename = #api_name)]
                pub #ident: #ty,
            });
            entries.push(quote! { (#api_name, Some(Self::from(value.#ident))) });
        }
    }

    Ok(quote! {
        #docs
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct #name {
            #(#fields)*
        }

        impl From<#name> for #client::WireValue {
            fn from(value: #name) -> Self {
                let entries: Vec<(&str, Option<Self>)> = vec![#(#entries),*];
                Self::Object(
                    entries
                        .into_iter()
                        .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
                        .collect(),
                )
            }
        }
    })
}
