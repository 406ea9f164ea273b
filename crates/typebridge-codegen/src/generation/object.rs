use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use tracing::instrument;
use typebridge_model::{Argument, FunctionDef, InterfaceDef, ObjectDef};

use super::docs::Docs;
use crate::{
    context::{Context, Input, Returns},
    idents::{FieldIdent, OptsIdent, OptsMethodIdent, ParamIdent, TypeIdent},
    CodegenError,
};

/// An object or interface, both turned into proxies.
pub(crate) struct ProxySource<'a> {
    pub name: &'a str,
    docs: Docs<'a>,
    functions: Vec<&'a FunctionDef>,
    interfaces: &'a [String],
}

impl<'a> ProxySource<'a> {
    pub(crate) fn object(object: &'a ObjectDef) -> Self {
        Self {
            name: &object.name,
            docs: Docs {
                description: object.description.as_deref(),
                deprecated: object.deprecated.as_deref(),
                experimental: None,
            },
            functions: object.functions.values().collect(),
            interfaces: &object.interfaces,
        }
    }

    pub(crate) fn interface(interface: &'a InterfaceDef) -> Self {
        Self {
            name: &interface.name,
            docs: Docs::new(interface.description.as_deref()),
            functions: interface.functions.values().collect(),
            interfaces: &[],
        }
    }
}

#[instrument(skip_all, fields(name = source.name))]
pub(crate) fn generate_proxy(context: &Context<'_>, source: &ProxySource<'_>) -> Result<TokenStream, CodegenError> {
    let name = TypeIdent(source.name);
    let type_name = source.name;
    let docs = source.docs;

    let mut methods = Vec::with_capacity(source.functions.len());
    let mut options = Vec::new();
    for function in &source.functions {
        let generated = generate_function(context, source.name, function)?;
        methods.push(generated.methods);
        options.extend(generated.options);
    }

    let conversions = source
        .interfaces
        .iter()
        .filter(|interface| context.model.interfaces.contains_key(interface.as_str()))
        .map(|interface| {
            let interface = TypeIdent(interface);
            quote! {
                impl From<#name> for #interface {
                    fn from(value: #name) -> Self {
                        #interface::new(value.selection, value.client)
                    }
                }
            }
        });

    let identity = context.model.provides_identity(source.name).then(|| {
        let codec = &context.codec;
        quote! { #codec::impl_proxy_value!(#name); }
    });

    Ok(quote! {
        #docs
        #[derive(Clone)]
        pub struct #name {
            selection: Selection,
            client: DynGraphqlClient,
        }

        impl ObjectProxy for #name {
            const TYPE_NAME: &'static str = #type_name;

            fn new(selection: Selection, client: DynGraphqlClient) -> Self {
                Self { selection, client }
            }

            fn selection(&self) -> &Selection {
                &self.selection
            }

            fn client(&self) -> &DynGraphqlClient {
                &self.client
            }
        }

        impl std::fmt::Debug for #name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(#type_name).field("selection", &self.selection).finish()
            }
        }

        impl #name {
            #(#methods)*
        }

        #(#options)*

        #(#conversions)*

        #identity
    })
}

struct GeneratedFunction {
    methods: TokenStream,
    options: Option<TokenStream>,
}

fn generate_function(
    context: &Context<'_>,
    parent: &str,
    function: &FunctionDef,
) -> Result<GeneratedFunction, CodegenError> {
    let location = format!("{parent}.{}", function.name);
    let returns = context.returns(function, &location)?;
    let docs = Docs {
        description: function.description.as_deref(),
        deprecated: function.deprecated.as_deref(),
        experimental: function.experimental.as_deref(),
    };

    let required = inputs(context, &location, function.required_arguments())?;
    let optional = inputs(context, &location, function.optional_arguments())?;

    let mut params = required
        .iter()
        .map(|(argument, input)| {
            let param = ParamIdent(&argument.name);
            let ty = input.parameter();
            quote! { #param: #ty }
        })
        .collect::<Vec<_>>();
    let mut statements = required
        .iter()
        .map(|(argument, input)| input.apply(&argument.name, &ParamIdent(&argument.name)))
        .collect::<Vec<_>>();

    let mut methods = method(
        &docs,
        FieldIdent(&function.name),
        &function.name,
        &params,
        &statements,
        &returns,
    );

    if optional.is_empty() {
        return Ok(GeneratedFunction { methods, options: None });
    }

    let opts = OptsIdent {
        parent,
        function: &function.name,
    };

    params.push(quote! { opts: #opts });
    statements.extend(optional.iter().map(|(argument, input)| {
        let field = FieldIdent(&argument.name);
        let apply = input.apply(&argument.name, &quote! { value });
        quote! {
            if let Some(value) = opts.#field {
                #apply
            }
        }
    }));

    methods.extend(method(
        &docs,
        OptsMethodIdent(&function.name),
        &function.name,
        &params,
        &statements,
        &returns,
    ));

    let fields = optional.iter().map(|(argument, input)| {
        let field = FieldIdent(&argument.name);
        let ty = input.owned();
        let docs = Docs::new(argument.description.as_deref());
        quote! {
            #docs
            pub #field: Option<#ty>,
        }
    });

    let options = quote! {
        #[derive(Debug, Clone, Default)]
        pub struct #opts {
            #(#fields)*
        }
    };

    Ok(GeneratedFunction {
        methods,
        options: Some(options),
    })
}

fn inputs<'f>(
    context: &Context<'_>,
    location: &str,
    arguments: impl Iterator<Item = &'f Argument>,
) -> Result<Vec<(&'f Argument, Input)>, CodegenError> {
    arguments
        .map(|argument| Ok((argument, context.input(argument, &format!("{location}({})", argument.name))?)))
        .collect()
}

fn method(
    docs: &Docs<'_>,
    name: impl ToTokens,
    field: &str,
    params: &[TokenStream],
    statements: &[TokenStream],
    returns: &Returns,
) -> TokenStream {
    let mutability = (!statements.is_empty()).then(|| quote! { mut });
    let select = quote! {
        let #mutability query = self.selection.select(#field);
        #(#statements)*
    };

    match returns {
        Returns::Proxy(proxy) => quote! {
            #docs
            pub fn #name(&self, #(#params),*) -> #proxy {
                #select
                #proxy::new(query, self.client.clone())
            }
        },
        Returns::ProxyList(proxy) => quote! {
            #docs
            pub async fn #name(&self, #(#params),*) -> Result<Vec<#proxy>, QueryError> {
                #select
                let ids: Vec<String> = query.select("id").execute(&self.client).await?;
                Ok(ids
                    .into_iter()
                    .map(|id| #proxy::from_handle(RemoteObjectHandle::from_id(#proxy::TYPE_NAME, id, self.client.clone())))
                    .collect())
            }
        },
        Returns::Value(ty) => quote! {
            #docs
            pub async fn #name(&self, #(#params),*) -> Result<#ty, QueryError> {
                #select
                query.execute(&self.client).await
            }
        },
    }
}
