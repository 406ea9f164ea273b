use quote::ToTokens;

/// A Rust type reduced to what the type mapping needs.
///
/// `syn` types are not `Send`, declarations carry this form across the parallel collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NativeType {
    /// A path type, by its last segment and generic type arguments.
    Path { name: String, args: Vec<NativeType> },
    Reference(Box<NativeType>),
    Slice(Box<NativeType>),
    DynTrait(String),
    Tuple(Vec<NativeType>),
    /// Raw pointers, function pointers and anything else the mapping never accepts.
    Other(String),
}

impl NativeType {
    pub(crate) fn from_syn(ty: &syn::Type) -> Self {
        match ty {
            syn::Type::Path(type_path) if type_path.qself.is_none() => {
                let Some(segment) = type_path.path.segments.last() else {
                    return NativeType::Other(render(ty));
                };

                let args = match &segment.arguments {
                    syn::PathArguments::AngleBracketed(generics) => generics
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            syn::GenericArgument::Type(ty) => Some(NativeType::from_syn(ty)),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };

                NativeType::Path {
                    name: segment.ident.to_string(),
                    args,
                }
            }
            syn::Type::Reference(reference) => NativeType::Reference(Box::new(NativeType::from_syn(&reference.elem))),
            syn::Type::Slice(slice) => NativeType::Slice(Box::new(NativeType::from_syn(&slice.elem))),
            syn::Type::Array(array) => NativeType::Slice(Box::new(NativeType::from_syn(&array.elem))),
            syn::Type::Paren(paren) => NativeType::from_syn(&paren.elem),
            syn::Type::Group(group) => NativeType::from_syn(&group.elem),
            syn::Type::Tuple(tuple) => NativeType::Tuple(tuple.elems.iter().map(NativeType::from_syn).collect()),
            syn::Type::TraitObject(object) => object
                .bounds
                .iter()
                .find_map(|bound| match bound {
                    syn::TypeParamBound::Trait(bound) => bound.path.segments.last().map(|s| s.ident.to_string()),
                    _ => None,
                })
                .map_or_else(|| NativeType::Other(render(ty)), NativeType::DynTrait),
            _ => NativeType::Other(render(ty)),
        }
    }

    pub(crate) fn unit() -> Self {
        NativeType::Tuple(Vec::new())
    }

    pub(crate) fn is_path(&self, expected: &str) -> bool {
        matches!(self, NativeType::Path { name, .. } if name == expected)
    }
}

impl std::fmt::Display for NativeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeType::Path { name, args } if args.is_empty() => f.write_str(name),
            NativeType::Path { name, args } => {
                let args = args.iter().map(ToString::to_string).collect::<Vec<_>>();
                write!(f, "{name}<{}>", args.join(", "))
            }
            NativeType::Reference(inner) => write!(f, "&{inner}"),
            NativeType::Slice(inner) => write!(f, "[{inner}]"),
            NativeType::DynTrait(name) => write!(f, "dyn {name}"),
            NativeType::Tuple(elems) => {
                let elems = elems.iter().map(ToString::to_string).collect::<Vec<_>>();
                write!(f, "({})", elems.join(", "))
            }
            NativeType::Other(rendered) => f.write_str(rendered),
        }
    }
}

fn render(ty: &syn::Type) -> String {
    ty.to_token_stream().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(ty: &str) -> NativeType {
        NativeType::from_syn(&syn::parse_str(ty).unwrap())
    }

    #[test]
    fn keeps_generic_arguments() {
        assert_eq!(parse("std::vec::Vec<Option<String>>").to_string(), "Vec<Option<String>>");
        assert_eq!(parse("anyhow::Result<()>").to_string(), "Result<()>");
        assert_eq!(parse("&[u8]").to_string(), "&[u8]");
        assert_eq!(parse("Box<dyn Shape + Send>").to_string(), "Box<dyn Shape>");
    }

    #[test]
    fn pointers_are_kept_verbatim() {
        assert!(matches!(parse("*const u8"), NativeType::Other(_)));
        assert!(matches!(parse("fn(u8) -> u8"), NativeType::Other(_)));
    }
}
