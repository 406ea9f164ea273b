use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{parse_quote, FnArg, ImplItem, ImplItemFn, ItemImpl, ItemStruct, Pat, ReturnType, Type};

use crate::attrs;

pub(crate) fn expand_struct(mut item: ItemStruct) -> syn::Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&item.generics, "module objects cannot be generic"));
    }

    let mut idents = Vec::new();
    let mut types = Vec::new();

    match &mut item.fields {
        syn::Fields::Named(fields) => {
            for field in &mut fields.named {
                attrs::strip(&mut field.attrs, attrs::FIELD);
                idents.push(field.ident.clone());
                types.push(field.ty.clone());
            }
        }
        syn::Fields::Unit => {}
        fields @ syn::Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(fields, "module objects need named fields"));
        }
    }

    let names = idents
        .iter()
        .flatten()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    let name = &item.ident;
    let object_name = name.to_string();

    Ok(quote! {
        #item

        impl ::typebridge_module::ModuleObject for #name {
            const NAME: &'static str = #object_name;

            fn allocate() -> Self {
                <Self as ::core::default::Default>::default()
            }

            #[allow(unused_mut)]
            fn assign(
                &mut self,
                mut state: ::typebridge_module::ObjectValue,
            ) -> ::core::result::Result<(), ::typebridge_module::CodecError> {
                #(
                    if let ::core::option::Option::Some(value) = state.take::<#types>(#names)? {
                        self.#idents = value;
                    }
                )*
                ::core::result::Result::Ok(())
            }
        }

        impl ::typebridge_module::FromValue for #name {
            fn from_value(
                value: ::typebridge_module::Value,
            ) -> ::core::result::Result<Self, ::typebridge_module::CodecError> {
                let state = <::typebridge_module::ObjectValue as ::typebridge_module::FromValue>::from_value(value)?;
                <Self as ::typebridge_module::ModuleObject>::restore(state)
            }
        }

        impl ::typebridge_module::IntoValue for #name {
            fn into_value(self) -> ::typebridge_module::Value {
                let state = ::typebridge_module::ObjectValue::new(#object_name) #(.with(#names, self.#idents))*;
                ::typebridge_module::IntoValue::into_value(state)
            }
        }
    })
}

pub(crate) fn expand_impl(mut item: ItemImpl) -> syn::Result<TokenStream> {
    if item.trait_.is_some() {
        return Err(syn::Error::new_spanned(
            &item.self_ty,
            "#[object] goes on the inherent impl block, not on trait implementations",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&item.generics, "module objects cannot be generic"));
    }

    let mut registrations = Vec::new();

    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let constructor = attrs::strip(&mut method.attrs, attrs::CONSTRUCTOR);
        let function = attrs::strip(&mut method.attrs, attrs::FUNCTION);

        match (constructor, function) {
            (false, false) => continue,
            (true, true) => {
                return Err(syn::Error::new_spanned(
                    &method.sig,
                    "a method is either a constructor or a function",
                ));
            }
            (true, false) => registrations.push(Call::parse(method)?.constructor()?),
            (false, true) => registrations.push(Call::parse(method)?.function()),
        }
    }

    let self_ty = &item.self_ty;

    Ok(quote! {
        #item

        impl ::typebridge_module::ObjectFunctions for #self_ty {
            #[allow(unused_mut)]
            fn functions(
                object: ::typebridge_module::ObjectBuilder<Self>,
            ) -> ::typebridge_module::ObjectBuilder<Self> {
                object #(#registrations)*
            }
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Receiver {
    None,
    Shared,
    Mutable,
    Owned,
}

struct Param {
    native_name: String,
    binding: Ident,
    /// Type taken from the call arguments.
    owned: Type,
    /// Whether the method borrows the value.
    by_ref: bool,
}

/// How to call a marked method from a registered handler.
struct Call {
    ident: Ident,
    receiver: Receiver,
    params: Vec<Param>,
    is_async: bool,
    is_result: bool,
}

impl Call {
    fn parse(method: &mut ImplItemFn) -> syn::Result<Self> {
        let sig = &mut method.sig;
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "functions of module objects cannot be generic",
            ));
        }

        let mut receiver = Receiver::None;
        let mut params = Vec::new();

        for input in &mut sig.inputs {
            match input {
                FnArg::Receiver(self_arg) => {
                    if self_arg.colon_token.is_some() {
                        return Err(syn::Error::new_spanned(
                            self_arg,
                            "only self, &self and &mut self receivers are supported",
                        ));
                    }

                    receiver = match (&self_arg.reference, &self_arg.mutability) {
                        (Some(_), Some(_)) => Receiver::Mutable,
                        (Some(_), None) => Receiver::Shared,
                        (None, _) => Receiver::Owned,
                    };
                }
                FnArg::Typed(pat_type) => {
                    attrs::strip(&mut pat_type.attrs, attrs::ARG);

                    let Pat::Ident(pat) = pat_type.pat.as_ref() else {
                        return Err(syn::Error::new_spanned(
                            &pat_type.pat,
                            "parameters must be plain identifiers",
                        ));
                    };

                    let (owned, by_ref) = owned_type(&pat_type.ty)?;
                    params.push(Param {
                        native_name: pat.ident.to_string(),
                        binding: format_ident!("__arg{}", params.len()),
                        owned,
                        by_ref,
                    });
                }
            }
        }

        let is_result = match &sig.output {
            ReturnType::Default => false,
            ReturnType::Type(_, ty) => is_result(ty),
        };

        Ok(Self {
            ident: sig.ident.clone(),
            receiver,
            params,
            is_async: sig.asyncness.is_some(),
            is_result,
        })
    }

    fn constructor(&self) -> syn::Result<TokenStream> {
        if self.receiver != Receiver::None {
            return Err(syn::Error::new_spanned(&self.ident, "constructors cannot take self"));
        }

        let body = self.body();

        Ok(quote! {
            .constructor(|mut __args: ::typebridge_module::CallArgs| async move { #body })
        })
    }

    fn function(&self) -> TokenStream {
        let native_name = self.ident.to_string();
        let this = match self.receiver {
            Receiver::None => quote!(_),
            Receiver::Mutable => quote!(mut __this),
            Receiver::Shared | Receiver::Owned => quote!(__this),
        };

        let body = self.body();

        quote! {
            .function(#native_name, |#this: Self, mut __args: ::typebridge_module::CallArgs| async move { #body })
        }
    }

    /// Takes the arguments by native name, calls the method and wraps its result.
    fn body(&self) -> TokenStream {
        let takes = self.params.iter().map(|param| {
            let Param {
                native_name,
                binding,
                owned,
                ..
            } = param;
            quote! { let #binding: #owned = __args.take(#native_name)?; }
        });

        let arguments = self.params.iter().map(|param| {
            let binding = &param.binding;
            if param.by_ref {
                quote!(&#binding)
            } else {
                quote!(#binding)
            }
        });

        let ident = &self.ident;
        let mut call = match self.receiver {
            Receiver::None => quote!(Self::#ident(#(#arguments),*)),
            _ => quote!(__this.#ident(#(#arguments),*)),
        };

        if self.is_async {
            call = quote!(#call.await);
        }
        if self.is_result {
            call = quote!(#call?);
        }

        quote! {
            #(#takes)*
            let __value = #call;
            ::core::result::Result::<_, ::typebridge_module::__private::anyhow::Error>::Ok(__value)
        }
    }
}

/// Borrowed parameters are taken owned and passed by reference.
fn owned_type(ty: &Type) -> syn::Result<(Type, bool)> {
    let Type::Reference(reference) = ty else {
        return Ok((ty.clone(), false));
    };

    if reference.mutability.is_some() {
        return Err(syn::Error::new_spanned(
            ty,
            "mutable references cannot be passed to module functions",
        ));
    }

    let owned = match reference.elem.as_ref() {
        Type::Path(path) if path.path.is_ident("str") => parse_quote!(::std::string::String),
        Type::Slice(slice) => {
            let element = &slice.elem;
            parse_quote!(::std::vec::Vec<#element>)
        }
        other => other.clone(),
    };

    Ok((owned, true))
}

fn is_result(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Path(path) if path.qself.is_none()
            && path.path.segments.last().is_some_and(|segment| segment.ident == "Result")
    )
}
