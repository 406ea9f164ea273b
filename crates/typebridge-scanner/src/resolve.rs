//! Second pass: resolves the collected declarations into a [`TypeModel`].

use std::collections::HashSet;

use indexmap::IndexMap;
use typebridge_model::{
    names, Argument, CachePolicy, EnumDef, EnumValueDef, FieldDef, FunctionDef, InterfaceDef, ObjectDef, TypeModel,
    TypeRef, WireValue,
};

use crate::{
    collect::{EnumDecl, FileDecls, ImplDecl, MethodDecl, MethodKind, ParamDecl, StructDecl, TraitDecl},
    native_type::NativeType,
    ScanError, ScanOptions,
};

const CONTEXTUAL_TYPES: [&str; 2] = ["Directory", "File"];

struct Resolver<'a> {
    structs: IndexMap<&'a str, &'a StructDecl>,
    traits: IndexMap<&'a str, &'a TraitDecl>,
    enums: IndexMap<&'a str, EnumDef>,
    hidden: HashSet<&'a str>,
    remote: Option<&'a TypeModel>,
}

pub(crate) fn resolve(files: &[FileDecls], options: &ScanOptions) -> Result<TypeModel, ScanError> {
    let mut resolver = Resolver {
        structs: IndexMap::new(),
        traits: IndexMap::new(),
        enums: IndexMap::new(),
        hidden: HashSet::new(),
        remote: options.remote.as_ref(),
    };

    let mut declared = HashSet::new();
    let mut enum_decls = Vec::new();

    for file in files {
        for decl in &file.structs {
            if decl.exposed {
                check_unique(&mut declared, &decl.name, &options.module_name)?;
                resolver.structs.insert(&decl.name, decl);
            } else {
                resolver.hidden.insert(&decl.name);
            }
        }

        for decl in &file.traits {
            if decl.exposed {
                check_unique(&mut declared, &decl.name, &options.module_name)?;
                resolver.traits.insert(&decl.name, decl);
            } else {
                resolver.hidden.insert(&decl.name);
            }
        }

        for decl in &file.enums {
            if decl.exposed {
                check_unique(&mut declared, &decl.name, &options.module_name)?;
                enum_decls.push(decl);
            } else {
                resolver.hidden.insert(&decl.name);
            }
        }
    }

    for decl in enum_decls {
        let enumeration = enum_def(decl)?;
        resolver.enums.insert(&decl.name, enumeration);
    }

    let mut model = TypeModel::new(&options.module_name);
    model.description = files.iter().find_map(|file| file.module_doc.clone());

    for (name, decl) in &resolver.traits {
        let mut interface = InterfaceDef::new(*name);
        interface.description = decl.docs.clone();

        for method in &decl.methods {
            let function = resolver.function(method, name)?;
            if interface.functions.contains_key(&function.name) {
                return Err(duplicate("function", &function.name, name));
            }
            interface.functions.insert(function.name.clone(), function);
        }

        model.insert_interface(interface);
    }

    let impls = files.iter().flat_map(|file| &file.impls).collect::<Vec<_>>();
    resolver.check_impls(&impls)?;

    for (name, decl) in &resolver.structs {
        let object = resolver.object(decl, impls.iter().copied().filter(|i| i.exposed && i.self_name == *name))?;
        tracing::debug!(
            object = %object.name,
            fields = object.fields.len(),
            functions = object.functions.len(),
            "resolved object"
        );
        model.insert_object(object);
    }

    for enumeration in resolver.enums.values() {
        model.insert_enum(enumeration.clone());
    }

    Ok(model)
}

fn check_unique<'a>(declared: &mut HashSet<&'a str>, name: &'a str, module: &str) -> Result<(), ScanError> {
    if declared.insert(name) {
        Ok(())
    } else {
        Err(duplicate("type", name, module))
    }
}

fn duplicate(kind: &'static str, name: &str, scope: &str) -> ScanError {
    ScanError::Duplicate {
        kind,
        name: name.to_string(),
        scope: scope.to_string(),
    }
}

fn enum_def(decl: &EnumDecl) -> Result<EnumDef, ScanError> {
    let values = decl
        .variants
        .iter()
        .map(|variant| EnumValueDef {
            api_name: variant
                .rename
                .clone()
                .unwrap_or_else(|| names::enum_value_name(&variant.native_name)),
            native_name: variant.native_name.clone(),
            description: variant.docs.clone(),
            deprecated: variant.deprecated.clone(),
        })
        .collect();

    let mut enumeration = EnumDef::new(&decl.name, values);
    enumeration.description = decl.docs.clone();

    if let Some(value) = enumeration.bijection_violation() {
        return Err(ScanError::EnumBijection {
            name: decl.name.clone(),
            value: value.to_string(),
        });
    }

    Ok(enumeration)
}

impl<'a> Resolver<'a> {
    fn check_impls(&self, impls: &[&ImplDecl]) -> Result<(), ScanError> {
        for decl in impls {
            let marked = decl.exposed || !decl.methods.is_empty();
            if !marked || self.structs.contains_key(decl.self_name.as_str()) {
                continue;
            }

            if self.hidden.contains(decl.self_name.as_str()) {
                return Err(ScanError::AmbiguousExposure {
                    name: decl.self_name.clone(),
                    location: format!("impl {}", decl.self_name),
                });
            }

            return Err(ScanError::UnsupportedType {
                ty: decl.self_name.clone(),
                location: format!("impl {}", decl.self_name),
                reason: "no declaration found",
            });
        }

        Ok(())
    }

    fn object<'i>(
        &self,
        decl: &StructDecl,
        impls: impl Iterator<Item = &'i ImplDecl>,
    ) -> Result<ObjectDef, ScanError> {
        let mut object = ObjectDef::new(&decl.name);
        object.description = decl.docs.clone();
        object.deprecated = decl.deprecated.clone();

        for field in &decl.fields {
            let location = format!("{}.{}", decl.name, field.native_name);
            let (type_ref, optional) = self.type_ref(&field.ty, &location)?;
            let name = field
                .rename
                .clone()
                .unwrap_or_else(|| names::api_name(&field.native_name));

            if object.fields.contains_key(&name) {
                return Err(duplicate("field", &name, &decl.name));
            }

            object.fields.insert(
                name.clone(),
                FieldDef {
                    name,
                    native_name: field.native_name.clone(),
                    description: field.docs.clone(),
                    deprecated: field.deprecated.clone(),
                    type_ref,
                    optional,
                    exposed: field.exposed,
                },
            );
        }

        for method in impls.flat_map(|block| &block.methods) {
            let function = self.function(method, &decl.name)?;

            if method.kind == MethodKind::Constructor {
                if object.constructor.is_some() {
                    return Err(ScanError::MultipleConstructors {
                        object: decl.name.clone(),
                    });
                }
                object.constructor = Some(function);
                continue;
            }

            let clashes_with_field = object
                .fields
                .get(&function.name)
                .is_some_and(|field| field.exposed);

            if clashes_with_field || object.functions.contains_key(&function.name) {
                return Err(duplicate("function", &function.name, &decl.name));
            }

            object.functions.insert(function.name.clone(), function);
        }

        object.provides_identity = object.detect_identity();
        Ok(object)
    }

    fn function(&self, method: &MethodDecl, owner: &str) -> Result<FunctionDef, ScanError> {
        let constructor = method.kind == MethodKind::Constructor;
        let location = format!("{owner}.{}", method.native_name);

        let name = match (&method.rename, constructor) {
            (_, true) => String::new(),
            (Some(rename), false) => rename.clone(),
            (None, false) => names::api_name(&method.native_name),
        };

        let (return_type, return_optional) = if constructor {
            (TypeRef::object(owner), false)
        } else {
            self.type_ref(&method.ret, &location)?
        };

        let cache_policy = match &method.cache {
            Some(cache) => cache.parse().map_err(|source| ScanError::CachePolicy {
                location: location.clone(),
                source,
            })?,
            None => CachePolicy::Default,
        };

        let mut arguments: Vec<Argument> = Vec::with_capacity(method.params.len());
        for param in &method.params {
            let argument = self.argument(param, &location)?;
            if arguments.iter().any(|existing| existing.name == argument.name) {
                return Err(duplicate("argument", &argument.name, &location));
            }
            arguments.push(argument);
        }

        Ok(FunctionDef {
            name,
            native_name: method.native_name.clone(),
            description: method.docs.clone(),
            deprecated: method.deprecated.clone(),
            experimental: method.experimental.clone(),
            arguments,
            return_type,
            return_optional,
            cache_policy,
        })
    }

    fn argument(&self, param: &ParamDecl, function: &str) -> Result<Argument, ScanError> {
        let location = format!("{function}({})", param.native_name);
        let (type_ref, nullable) = self.type_ref(&param.ty, &location)?;

        if let Some(path) = &param.default_path {
            if param.default.is_some() {
                return Err(ScanError::ConflictingDefaults {
                    argument: param.native_name.clone(),
                    location: function.to_string(),
                });
            }

            let type_name = type_ref.innermost().name().unwrap_or_default();
            if !CONTEXTUAL_TYPES.contains(&type_name) || type_ref.is_list() {
                return Err(ScanError::InvalidContextualPath {
                    argument: param.native_name.clone(),
                    location: function.to_string(),
                    type_name: type_ref.to_string(),
                });
            }

            tracing::trace!(argument = %param.native_name, path = %path, "contextual argument");
        }

        let default_value = param.default.clone().map(|value| self.enum_default(&type_ref, value));

        Ok(Argument {
            name: param
                .rename
                .clone()
                .unwrap_or_else(|| names::api_name(&param.native_name)),
            native_name: param.native_name.clone(),
            description: param.description.clone(),
            optional: nullable || default_value.is_some() || param.default_path.is_some(),
            type_ref,
            default_value,
            contextual_path: param.default_path.clone(),
            ignore_patterns: param.ignore.clone(),
        })
    }

    /// Enum defaults are written with native names, the wire expects API names.
    fn enum_default(&self, type_ref: &TypeRef, value: WireValue) -> WireValue {
        let TypeRef::Enum { name, .. } = type_ref.innermost() else {
            return value;
        };

        let Some(enumeration) = self.enums.get(name.as_str()) else {
            return value;
        };

        let to_api = |value: WireValue| match value {
            WireValue::String(native) => WireValue::String(
                enumeration
                    .native_to_api(&native)
                    .map(str::to_string)
                    .unwrap_or(native),
            ),
            other => other,
        };

        match value {
            WireValue::List(values) => WireValue::List(values.into_iter().map(to_api).collect()),
            value => to_api(value),
        }
    }

    /// Maps a native type to its type reference and whether it is nullable.
    fn type_ref(&self, ty: &NativeType, location: &str) -> Result<(TypeRef, bool), ScanError> {
        let unsupported = |reason: &'static str| ScanError::UnsupportedType {
            ty: ty.to_string(),
            location: location.to_string(),
            reason,
        };

        match ty {
            NativeType::Path { name, args } => match (name.as_str(), args.as_slice()) {
                ("Option", [inner]) => Ok((self.type_ref(inner, location)?.0, true)),
                ("Result", [inner, ..]) => self.type_ref(inner, location),
                ("Vec" | "VecDeque", [inner]) => Ok((TypeRef::list(self.type_ref(inner, location)?.0), false)),
                ("Box" | "Arc" | "Rc", _) => Err(unsupported(
                    "boxed values have no wire representation, pass interfaces as their generated `Ref` handle",
                )),
                ("HashMap" | "BTreeMap" | "IndexMap" | "HashSet" | "BTreeSet", _) => {
                    Err(unsupported("maps and sets have no wire representation"))
                }
                ("String", []) => Ok((TypeRef::string(), false)),
                ("bool", []) => Ok((TypeRef::boolean(), false)),
                ("f32" | "f64", []) => Ok((TypeRef::float(), false)),
                ("i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32", []) => Ok((TypeRef::int(), false)),
                ("u64" | "usize" | "isize", []) => {
                    Err(unsupported("Int is a signed 64 bit integer, use i64 or a narrower type"))
                }
                ("Value" | "WireValue", []) => Ok((TypeRef::scalar(typebridge_model::builtin::JSON), false)),
                (name, []) => self.named(name, location, ty),
                _ => Err(unsupported("unexpected generic arguments")),
            },
            NativeType::Reference(inner) => match inner.as_ref() {
                NativeType::Path { name, args } if name == "str" && args.is_empty() => Ok((TypeRef::string(), false)),
                NativeType::Slice(element) => Ok((TypeRef::list(self.type_ref(element, location)?.0), false)),
                _ => Err(unsupported("only &str and &[T] references are supported")),
            },
            NativeType::Slice(element) => Ok((TypeRef::list(self.type_ref(element, location)?.0), false)),
            NativeType::Tuple(elements) if elements.is_empty() => Ok((TypeRef::Void, false)),
            NativeType::Tuple(_) => Err(unsupported("tuples have no wire representation")),
            NativeType::DynTrait(_) => Err(unsupported(
                "trait objects have no wire representation, pass interfaces as their generated `Ref` handle",
            )),
            NativeType::Other(_) => Err(unsupported("pointers and function types have no wire representation")),
        }
    }

    fn named(&self, name: &str, location: &str, ty: &NativeType) -> Result<(TypeRef, bool), ScanError> {
        if self.structs.contains_key(name) {
            return Ok((TypeRef::object(name), false));
        }
        if self.traits.contains_key(name) {
            return Err(ScanError::UnsupportedType {
                ty: ty.to_string(),
                location: location.to_string(),
                reason: "trait objects have no wire representation, pass interfaces as their generated `Ref` handle",
            });
        }
        // Handle types generated by `#[interface]` for exposed traits.
        if let Some(interface) = name
            .strip_suffix("Ref")
            .filter(|interface| self.traits.contains_key(*interface))
        {
            return Ok((TypeRef::interface(interface), false));
        }
        if let Some(enumeration) = self.enums.get(name) {
            return Ok((enumeration.as_type_ref(), false));
        }
        if self.hidden.contains(name) {
            return Err(ScanError::AmbiguousExposure {
                name: name.to_string(),
                location: location.to_string(),
            });
        }

        if let Some(remote) = self.remote {
            if remote.object(name).is_some() {
                return Ok((TypeRef::object(name), false));
            }
            if remote.interface(name).is_some() {
                return Ok((TypeRef::interface(name), false));
            }
            if let Some(enumeration) = remote.enumeration(name) {
                return Ok((enumeration.as_type_ref(), false));
            }
            if remote.scalars.contains_key(name) {
                return Ok((TypeRef::scalar(name), false));
            }
            if remote.input_objects.contains_key(name) {
                return Ok((TypeRef::input_object(name), false));
            }
        }

        Err(ScanError::UnsupportedType {
            ty: ty.to_string(),
            location: location.to_string(),
            reason: "no declaration found",
        })
    }
}
