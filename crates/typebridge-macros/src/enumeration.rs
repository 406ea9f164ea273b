use proc_macro2::TokenStream;
use quote::quote;
use syn::ItemEnum;

use crate::attrs;

/// Values travel by native variant name, the codec maps them to wire names.
pub(crate) fn expand(mut item: ItemEnum) -> syn::Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&item.generics, "exposed enums cannot be generic"));
    }

    for variant in &mut item.variants {
        if !matches!(variant.fields, syn::Fields::Unit) {
            return Err(syn::Error::new_spanned(
                &variant.fields,
                "exposed enums can only have unit variants",
            ));
        }
        attrs::strip(&mut variant.attrs, attrs::VALUE);
    }

    let name = &item.ident;
    let enum_name = name.to_string();
    let variants = item.variants.iter().map(|variant| &variant.ident).collect::<Vec<_>>();
    let native_names = variants.iter().map(ToString::to_string).collect::<Vec<_>>();

    Ok(quote! {
        #item

        #[allow(deprecated)]
        impl ::typebridge_module::FromValue for #name {
            fn from_value(
                value: ::typebridge_module::Value,
            ) -> ::core::result::Result<Self, ::typebridge_module::CodecError> {
                match value {
                    ::typebridge_module::Value::Enum(native) | ::typebridge_module::Value::String(native) => {
                        match native.as_str() {
                            #(#native_names => ::core::result::Result::Ok(Self::#variants),)*
                            _ => ::core::result::Result::Err(::typebridge_module::CodecError::UnknownEnumValue {
                                enum_name: #enum_name.to_string(),
                                value: native,
                            }),
                        }
                    }
                    other => ::core::result::Result::Err(::typebridge_module::CodecError::marshalling(
                        #enum_name,
                        other.kind_name(),
                    )),
                }
            }
        }

        #[allow(deprecated)]
        impl ::typebridge_module::IntoValue for #name {
            fn into_value(self) -> ::typebridge_module::Value {
                let native = match self {
                    #(Self::#variants => #native_names,)*
                };
                ::typebridge_module::Value::Enum(native.to_string())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn rejects_variants_with_data() {
        let item: ItemEnum = parse_quote! {
            enum Shape {
                Circle(f64),
            }
        };

        let error = expand(item).unwrap_err();
        assert_eq!(error.to_string(), "exposed enums can only have unit variants");
    }

    #[test]
    fn strips_value_markers() {
        let item: ItemEnum = parse_quote! {
            enum Language {
                English,
                #[value(name = "FR")]
                French,
            }
        };

        let expanded = expand(item).unwrap().to_string().split_whitespace().collect::<String>();
        assert!(!expanded.contains("#[value"), "{expanded}");
        assert!(expanded.contains(r#""French"=>::core::result::Result::Ok(Self::French)"#), "{expanded}");
    }
}
