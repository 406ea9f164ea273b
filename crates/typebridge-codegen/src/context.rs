use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use typebridge_model::{builtin, Argument, FunctionDef, TypeModel, TypeRef};

use crate::{idents::TypeIdent, CodegenError};

pub(crate) struct Context<'a> {
    pub model: &'a TypeModel,
    /// Path of the query builder crate.
    pub client: TokenStream,
    /// Path of the codec crate.
    pub codec: TokenStream,
}

/// What calling a generated method gives back.
pub(crate) enum Returns {
    /// A new proxy extending the query, nothing is sent.
    Proxy(TokenStream),
    /// Proxies loaded back from the IDs of a list.
    ProxyList(TokenStream),
    /// A value decoded from the response.
    Value(TokenStream),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Literal,
    Str,
    Enum,
    EnumList,
    Object,
    ObjectList,
}

/// How an argument is taken by a generated method and embedded in the query.
pub(crate) struct Input {
    kind: InputKind,
    owned: TokenStream,
}

impl Context<'_> {
    pub(crate) fn returns(&self, function: &FunctionDef, location: &str) -> Result<Returns, CodegenError> {
        match &function.return_type {
            TypeRef::Object { name } | TypeRef::Interface { name } => {
                Ok(Returns::Proxy(TypeIdent(name).to_token_stream()))
            }
            TypeRef::List { element } => match element.as_ref() {
                TypeRef::Object { name } | TypeRef::Interface { name } => {
                    Ok(Returns::ProxyList(TypeIdent(name).to_token_stream()))
                }
                _ => self.value_returns(function, location),
            },
            TypeRef::Void => Ok(Returns::Value(quote! { () })),
            _ => self.value_returns(function, location),
        }
    }

    fn value_returns(&self, function: &FunctionDef, location: &str) -> Result<Returns, CodegenError> {
        let ty = self.value_type(&function.return_type, location)?;

        Ok(Returns::Value(if function.return_optional {
            quote! { Option<#ty> }
        } else {
            ty
        }))
    }

    /// Rust type of a value travelling as a literal.
    pub(crate) fn value_type(&self, type_ref: &TypeRef, location: &str) -> Result<TokenStream, CodegenError> {
        match type_ref {
            TypeRef::Scalar { name } => Ok(match name.as_str() {
                builtin::STRING | builtin::ID => quote! { String },
                builtin::INT => quote! { i64 },
                builtin::FLOAT => quote! { f64 },
                builtin::BOOLEAN => quote! { bool },
                name => TypeIdent(name).to_token_stream(),
            }),
            TypeRef::Enum { name, .. } | TypeRef::InputObject { name } => Ok(TypeIdent(name).to_token_stream()),
            TypeRef::List { element } => {
                let element = self.value_type(element, location)?;
                Ok(quote! { Vec<#element> })
            }
            TypeRef::Object { .. } | TypeRef::Interface { .. } | TypeRef::Void => Err(CodegenError::UnsupportedType {
                location: location.to_string(),
                type_ref: type_ref.to_string(),
            }),
        }
    }

    pub(crate) fn input(&self, argument: &Argument, location: &str) -> Result<Input, CodegenError> {
        let object = |type_ref: &TypeRef| match type_ref {
            TypeRef::Object { name } | TypeRef::Interface { name } => Some(TypeIdent(name).to_token_stream()),
            // `load*FromID(id:)` takes the ID itself.
            TypeRef::Scalar { name } if argument.name != "id" => {
                self.identified_object(name).map(|name| TypeIdent(name).to_token_stream())
            }
            _ => None,
        };

        if let Some(owned) = object(&argument.type_ref) {
            return Ok(Input {
                kind: InputKind::Object,
                owned,
            });
        }

        let (kind, owned) = match &argument.type_ref {
            TypeRef::List { element } => match (object(element), element.as_ref()) {
                (Some(proxy), _) => (InputKind::ObjectList, quote! { Vec<#proxy> }),
                (None, TypeRef::Enum { name, .. }) => {
                    let name = TypeIdent(name);
                    (InputKind::EnumList, quote! { Vec<#name> })
                }
                _ => (InputKind::Literal, self.value_type(&argument.type_ref, location)?),
            },
            TypeRef::Enum { name, .. } => (InputKind::Enum, TypeIdent(name).to_token_stream()),
            TypeRef::Scalar { name } if name == builtin::STRING => (InputKind::Str, quote! { String }),
            type_ref => (InputKind::Literal, self.value_type(type_ref, location)?),
        };

        Ok(Input { kind, owned })
    }

    /// The object an ID scalar stands for: `ContainerID` for `Container`.
    fn identified_object<'s>(&self, scalar: &'s str) -> Option<&'s str> {
        let name = scalar.strip_suffix("ID")?;
        (self.model.objects.contains_key(name) || self.model.interfaces.contains_key(name)).then_some(name)
    }
}

impl Input {
    /// Type of the parameter when the argument is required.
    pub(crate) fn parameter(&self) -> TokenStream {
        let owned = &self.owned;
        match self.kind {
            InputKind::Str => quote! { &str },
            InputKind::Object => quote! { &#owned },
            _ => owned.clone(),
        }
    }

    /// Type of the field in an options struct.
    pub(crate) fn owned(&self) -> &TokenStream {
        &self.owned
    }

    /// Statement adding `value` to the local `query`.
    pub(crate) fn apply(&self, name: &str, value: &impl ToTokens) -> TokenStream {
        match self.kind {
            InputKind::Literal | InputKind::Str => quote! {
                query = query.arg(#name, #value);
            },
            InputKind::Enum => quote! {
                query = query.arg_enum(#name, #value.as_api_name());
            },
            InputKind::EnumList => quote! {
                query = query.arg_enums(#name, #value.iter().map(|value| value.as_api_name()));
            },
            InputKind::Object => quote! {
                query = query.arg_id(#name, #value.to_handle());
            },
            InputKind::ObjectList => quote! {
                query = query.arg_ids(#name, #value.iter().map(|value| value.to_handle()).collect());
            },
        }
    }
}
