use proc_macro2::TokenStream;
use quote::quote;
use typebridge_model::{names, EnumDef};

use super::docs::Docs;
use crate::idents::{ident, TypeIdent};

/// A Rust enum with its mapping to API names. Names the schema adds later decode into a
/// pass-through variant instead of failing.
pub(crate) fn generate_enum(client: &TokenStream, enumeration: &EnumDef) -> TokenStream {
    let name = TypeIdent(&enumeration.name);
    let docs = Docs::new(enumeration.description.as_deref());

    let variants = enumeration
        .values
        .iter()
        .map(|value| ident(&names::rust_type_name(&value.native_name)))
        .collect::<Vec<_>>();
    let api_names = enumeration.values.iter().map(|value| value.api_name.as_str()).collect::<Vec<_>>();

    let unknown = if variants.iter().any(|variant| variant == "Unknown") {
        ident("UnknownValue")
    } else {
        ident("Unknown")
    };

    let declarations = enumeration.values.iter().zip(&variants).map(|(value, variant)| {
        let docs = Docs {
            description: value.description.as_deref(),
            deprecated: value.deprecated.as_deref(),
            experimental: None,
        };
        quote! {
            #docs
            #variant,
        }
    });

    quote! {
        #docs
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum #name {
            #(#declarations)*
            /// A member this client does not know about.
            #unknown(String),
        }

        impl #name {
            pub fn as_api_name(&self) -> &str {
                match self {
                    #(Self::#variants => #api_names,)*
                    Self::#unknown(name) => name,
                }
            }

            pub fn from_api_name(name: &str) -> Self {
                match name {
                    #(#api_names => Self::#variants,)*
                    other => Self::#unknown(other.to_string()),
                }
            }
        }

        impl std::fmt::Display for #name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_api_name())
            }
        }

        impl From<#name> for #client::WireValue {
            fn from(value: #name) -> Self {
                Self::String(value.as_api_name().to_string())
            }
        }

        impl serde::Serialize for #name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_api_name())
            }
        }

        impl<'de> serde::Deserialize<'de> for #name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let name = <String as serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::from_api_name(&name))
            }
        }
    }
}
