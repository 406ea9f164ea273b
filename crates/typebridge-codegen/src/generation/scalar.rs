use proc_macro2::TokenStream;
use quote::quote;
use typebridge_model::ScalarDef;

use super::docs::Docs;
use crate::idents::TypeIdent;

/// A transparent newtype over the string form of a custom scalar.
pub(crate) fn generate_scalar(client: &TokenStream, scalar: &ScalarDef) -> TokenStream {
    let name = TypeIdent(&scalar.name);
    let docs = Docs::new(scalar.description.as_deref());

    quote! {
        #docs
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct #name(pub String);

        impl #name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for #name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for #name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<#name> for #client::WireValue {
            fn from(value: #name) -> Self {
                Self::String(value.0)
            }
        }
    }
}
