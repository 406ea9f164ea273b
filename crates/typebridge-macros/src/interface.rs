use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ItemTrait, TraitItem};

use crate::attrs;

/// Interface values come from other objects, possibly other modules, so they are received as
/// remote handles rather than trait objects.
pub(crate) fn expand(mut item: ItemTrait) -> syn::Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&item.generics, "exposed interfaces cannot be generic"));
    }

    for trait_item in &mut item.items {
        if let TraitItem::Fn(method) = trait_item {
            attrs::strip(&mut method.attrs, attrs::FUNCTION);
            for input in &mut method.sig.inputs {
                if let syn::FnArg::Typed(pat_type) = input {
                    attrs::strip(&mut pat_type.attrs, attrs::ARG);
                }
            }
        }
    }

    let vis = &item.vis;
    let interface_name = item.ident.to_string();
    let handle = format_ident!("{}Ref", item.ident);
    let doc = format!("Handle to an object implementing the `{interface_name}` interface.");

    Ok(quote! {
        #item

        #[doc = #doc]
        #[derive(Debug, Clone)]
        #vis struct #handle(::typebridge_module::RemoteObjectHandle);

        impl #handle {
            pub const INTERFACE: &'static str = #interface_name;

            pub fn handle(&self) -> &::typebridge_module::RemoteObjectHandle {
                &self.0
            }

            pub fn into_handle(self) -> ::typebridge_module::RemoteObjectHandle {
                self.0
            }
        }

        impl ::core::convert::From<::typebridge_module::RemoteObjectHandle> for #handle {
            fn from(handle: ::typebridge_module::RemoteObjectHandle) -> Self {
                Self(handle)
            }
        }

        impl ::typebridge_module::FromValue for #handle {
            fn from_value(
                value: ::typebridge_module::Value,
            ) -> ::core::result::Result<Self, ::typebridge_module::CodecError> {
                <::typebridge_module::RemoteObjectHandle as ::typebridge_module::FromValue>::from_value(value).map(Self)
            }
        }

        impl ::typebridge_module::IntoValue for #handle {
            fn into_value(self) -> ::typebridge_module::Value {
                ::typebridge_module::Value::Handle(self.0)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn generates_a_handle_next_to_the_trait() {
        let item: ItemTrait = parse_quote! {
            pub trait Named {
                #[function]
                fn name(&self, #[arg(description = "Upper case")] loud: bool) -> String;
            }
        };

        let expanded = expand(item).unwrap().to_string().split_whitespace().collect::<String>();

        assert!(expanded.starts_with("pubtraitNamed{fnname(&self,loud:bool)->String;}"), "{expanded}");
        assert!(expanded.contains("pubstructNamedRef(::typebridge_module::RemoteObjectHandle);"), "{expanded}");
        assert!(expanded.contains(r#"pubconstINTERFACE:&'staticstr="Named";"#), "{expanded}");
    }
}
