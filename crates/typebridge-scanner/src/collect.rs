//! First pass: turns the items of one source file into plain declarations.

use std::path::{Path, PathBuf};

use syn::{spanned::Spanned, FnArg, ImplItem, Item, ReturnType, TraitItem};
use typebridge_model::WireValue;

use crate::{attrs, native_type::NativeType, ScanError, SourceUnit};

#[derive(Debug, Default)]
pub(crate) struct FileDecls {
    pub(crate) path: PathBuf,
    pub(crate) module_doc: Option<String>,
    pub(crate) structs: Vec<StructDecl>,
    pub(crate) impls: Vec<ImplDecl>,
    pub(crate) traits: Vec<TraitDecl>,
    pub(crate) enums: Vec<EnumDecl>,
}

#[derive(Debug)]
pub(crate) struct StructDecl {
    pub(crate) name: String,
    pub(crate) exposed: bool,
    pub(crate) docs: Option<String>,
    pub(crate) deprecated: Option<String>,
    pub(crate) fields: Vec<FieldDecl>,
}

#[derive(Debug)]
pub(crate) struct FieldDecl {
    pub(crate) native_name: String,
    pub(crate) rename: Option<String>,
    pub(crate) exposed: bool,
    pub(crate) docs: Option<String>,
    pub(crate) deprecated: Option<String>,
    pub(crate) ty: NativeType,
}

#[derive(Debug)]
pub(crate) struct ImplDecl {
    pub(crate) self_name: String,
    pub(crate) exposed: bool,
    pub(crate) methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MethodKind {
    Function,
    Constructor,
    Private,
}

#[derive(Debug)]
pub(crate) struct MethodDecl {
    pub(crate) native_name: String,
    pub(crate) kind: MethodKind,
    pub(crate) rename: Option<String>,
    pub(crate) cache: Option<String>,
    pub(crate) experimental: Option<String>,
    pub(crate) docs: Option<String>,
    pub(crate) deprecated: Option<String>,
    pub(crate) params: Vec<ParamDecl>,
    pub(crate) ret: NativeType,
}

#[derive(Debug)]
pub(crate) struct ParamDecl {
    pub(crate) native_name: String,
    pub(crate) rename: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) ty: NativeType,
    pub(crate) default: Option<WireValue>,
    pub(crate) default_path: Option<String>,
    pub(crate) ignore: Option<Vec<String>>,
}

#[derive(Debug)]
pub(crate) struct TraitDecl {
    pub(crate) name: String,
    pub(crate) exposed: bool,
    pub(crate) docs: Option<String>,
    pub(crate) methods: Vec<MethodDecl>,
}

#[derive(Debug)]
pub(crate) struct EnumDecl {
    pub(crate) name: String,
    pub(crate) exposed: bool,
    pub(crate) docs: Option<String>,
    pub(crate) variants: Vec<VariantDecl>,
}

#[derive(Debug)]
pub(crate) struct VariantDecl {
    pub(crate) native_name: String,
    pub(crate) rename: Option<String>,
    pub(crate) docs: Option<String>,
    pub(crate) deprecated: Option<String>,
}

pub(crate) fn collect(unit: &SourceUnit) -> Result<FileDecls, ScanError> {
    let file = syn::parse_file(&unit.text).map_err(|error| ScanError::Parse {
        path: unit.path.clone(),
        message: error.to_string(),
    })?;

    let mut decls = FileDecls {
        path: unit.path.clone(),
        module_doc: if unit.is_root() { attrs::docs(&file.attrs) } else { None },
        ..Default::default()
    };

    collect_items(&file.items, &mut decls).map_err(|error| invalid(&unit.path, &error))?;

    tracing::debug!(
        path = %unit.path.display(),
        structs = decls.structs.len(),
        impls = decls.impls.len(),
        traits = decls.traits.len(),
        enums = decls.enums.len(),
        "collected declarations"
    );

    Ok(decls)
}

fn invalid(path: &Path, error: &syn::Error) -> ScanError {
    ScanError::InvalidAttribute {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

fn collect_items(items: &[Item], decls: &mut FileDecls) -> syn::Result<()> {
    for item in items {
        match item {
            Item::Struct(item) => decls.structs.push(collect_struct(item)?),
            Item::Impl(item) => {
                if let Some(decl) = collect_impl(item)? {
                    decls.impls.push(decl);
                }
            }
            Item::Trait(item) => decls.traits.push(collect_trait(item)?),
            Item::Enum(item) => decls.enums.push(collect_enum(item)?),
            Item::Mod(module) => {
                if let Some((_, items)) = &module.content {
                    collect_items(items, decls)?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn collect_struct(item: &syn::ItemStruct) -> syn::Result<StructDecl> {
    let mut fields = Vec::new();

    if let syn::Fields::Named(named) = &item.fields {
        for field in &named.named {
            let Some(ident) = &field.ident else {
                continue;
            };

            let marker = attrs::find(&field.attrs, attrs::FIELD);
            let rename = marker.map(attrs::rename).transpose()?.flatten();

            fields.push(FieldDecl {
                native_name: ident.to_string(),
                rename,
                exposed: marker.is_some(),
                docs: attrs::docs(&field.attrs),
                deprecated: attrs::deprecated(&field.attrs)?,
                ty: NativeType::from_syn(&field.ty),
            });
        }
    }

    Ok(StructDecl {
        name: item.ident.to_string(),
        exposed: attrs::has(&item.attrs, attrs::OBJECT),
        docs: attrs::docs(&item.attrs),
        deprecated: attrs::deprecated(&item.attrs)?,
        fields,
    })
}

fn collect_impl(item: &syn::ItemImpl) -> syn::Result<Option<ImplDecl>> {
    // Trait implementations never expose functions.
    if item.trait_.is_some() {
        return Ok(None);
    }

    let NativeType::Path { name: self_name, .. } = NativeType::from_syn(&item.self_ty) else {
        return Ok(None);
    };

    let exposed = attrs::has(&item.attrs, attrs::OBJECT);
    let mut methods = Vec::new();

    for impl_item in &item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let kind = if attrs::has(&method.attrs, attrs::CONSTRUCTOR) {
            MethodKind::Constructor
        } else if attrs::has(&method.attrs, attrs::FUNCTION) {
            MethodKind::Function
        } else {
            MethodKind::Private
        };

        if kind == MethodKind::Private {
            continue;
        }

        methods.push(collect_method(&method.attrs, &method.sig, kind, &self_name)?);
    }

    Ok(Some(ImplDecl {
        self_name,
        exposed,
        methods,
    }))
}

fn collect_trait(item: &syn::ItemTrait) -> syn::Result<TraitDecl> {
    let name = item.ident.to_string();
    let mut methods = Vec::new();

    for trait_item in &item.items {
        if let TraitItem::Fn(method) = trait_item {
            methods.push(collect_method(&method.attrs, &method.sig, MethodKind::Function, &name)?);
        }
    }

    Ok(TraitDecl {
        exposed: attrs::has(&item.attrs, attrs::INTERFACE),
        docs: attrs::docs(&item.attrs),
        name,
        methods,
    })
}

fn collect_enum(item: &syn::ItemEnum) -> syn::Result<EnumDecl> {
    let exposed = attrs::has(&item.attrs, attrs::ENUMERATION);
    let mut variants = Vec::new();

    for variant in &item.variants {
        if exposed && !matches!(variant.fields, syn::Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "exposed enums can only have unit variants",
            ));
        }

        let rename = attrs::find(&variant.attrs, attrs::VALUE)
            .map(attrs::rename)
            .transpose()?
            .flatten();

        variants.push(VariantDecl {
            native_name: variant.ident.to_string(),
            rename,
            docs: attrs::docs(&variant.attrs),
            deprecated: attrs::deprecated(&variant.attrs)?,
        });
    }

    Ok(EnumDecl {
        name: item.ident.to_string(),
        exposed,
        docs: attrs::docs(&item.attrs),
        variants,
    })
}

fn collect_method(
    method_attrs: &[syn::Attribute],
    sig: &syn::Signature,
    kind: MethodKind,
    self_name: &str,
) -> syn::Result<MethodDecl> {
    let function_args = match attrs::find(method_attrs, attrs::FUNCTION) {
        Some(attr) => attrs::function_args(attr)?,
        None => attrs::FunctionArgs::default(),
    };

    let mut params = Vec::new();
    for input in &sig.inputs {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };

        let native_name = match pat_type.pat.as_ref() {
            syn::Pat::Ident(ident) => ident.ident.to_string(),
            other => return Err(syn::Error::new(other.span(), "parameters must be plain identifiers")),
        };

        let arg = match attrs::find(&pat_type.attrs, attrs::ARG) {
            Some(attr) => attrs::arg_args(attr)?,
            None => attrs::ArgArgs::default(),
        };

        params.push(ParamDecl {
            native_name,
            rename: arg.name,
            description: arg.description,
            ty: NativeType::from_syn(&pat_type.ty),
            default: arg.default,
            default_path: arg.default_path,
            ignore: arg.ignore,
        });
    }

    let ret = match &sig.output {
        ReturnType::Default => NativeType::unit(),
        ReturnType::Type(_, ty) => match NativeType::from_syn(ty) {
            NativeType::Path { name, args } if name == "Self" => NativeType::Path {
                name: self_name.to_string(),
                args,
            },
            ty => ty,
        },
    };

    Ok(MethodDecl {
        native_name: sig.ident.to_string(),
        kind,
        rename: function_args.name,
        cache: function_args.cache,
        experimental: function_args.experimental,
        docs: attrs::docs(method_attrs),
        deprecated: attrs::deprecated(method_attrs)?,
        params,
        ret,
    })
}
