use std::collections::HashSet;

use typebridge_model::{builtin, Number, TypeModel, TypeRef, WireValue};

use crate::{ArgumentDecl, Declaration, RegistrationError, RegistrationPlan, TypeUse};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Object,
    Interface,
    Enum,
}

struct Scope {
    name: String,
    kind: Kind,
    members: HashSet<String>,
    has_constructor: bool,
}

struct Function {
    location: String,
    arguments: HashSet<String>,
}

/// Checks the whole plan before anything is sent.
pub(crate) fn validate(plan: &RegistrationPlan, remote: Option<&TypeModel>) -> Result<(), RegistrationError> {
    let mut declared = Vec::new();
    for declaration in plan.declarations() {
        let entry = match declaration {
            Declaration::DeclareObject { name, .. } => (name.as_str(), Kind::Object),
            Declaration::DeclareInterface { name, .. } => (name.as_str(), Kind::Interface),
            Declaration::DeclareEnum { name, .. } => (name.as_str(), Kind::Enum),
            _ => continue,
        };

        if declared.iter().any(|(name, _)| *name == entry.0) {
            return Err(RegistrationError::Duplicate {
                kind: "type",
                name: entry.0.to_string(),
                scope: "the module".to_string(),
            });
        }
        declared.push(entry);
    }

    let validator = Validator { declared, remote };
    let mut scope: Option<Scope> = None;
    let mut function: Option<Function> = None;

    for declaration in plan.declarations() {
        match declaration {
            Declaration::ModuleDescription(_) => {}
            Declaration::DeclareObject { name, .. } => {
                scope = Some(Scope::new(name, Kind::Object));
                function = None;
            }
            Declaration::DeclareInterface { name, .. } => {
                scope = Some(Scope::new(name, Kind::Interface));
                function = None;
            }
            Declaration::DeclareEnum { name, .. } => {
                scope = Some(Scope::new(name, Kind::Enum));
                function = None;
            }
            Declaration::DeclareFunction(decl) => {
                let scope = members_of(scope.as_mut(), declaration, &[Kind::Object, Kind::Interface])?;
                scope.insert("function", &decl.name)?;

                let location = format!("{}.{}", scope.name, decl.name);
                validator.type_use(&decl.return_type, &location)?;
                function = Some(Function::new(location));
            }
            Declaration::AttachConstructor { .. } => {
                let scope = members_of(scope.as_mut(), declaration, &[Kind::Object])?;
                if scope.has_constructor {
                    return Err(RegistrationError::Duplicate {
                        kind: "constructor",
                        name: scope.name.clone(),
                        scope: scope.name.clone(),
                    });
                }
                scope.has_constructor = true;
                function = Some(Function::new(format!("{} constructor", scope.name)));
            }
            Declaration::AttachArgument(argument) => {
                let Some(function) = function.as_mut() else {
                    return Err(misplaced(declaration, "function"));
                };

                if !function.arguments.insert(argument.name.clone()) {
                    return Err(RegistrationError::Duplicate {
                        kind: "argument",
                        name: argument.name.clone(),
                        scope: function.location.clone(),
                    });
                }

                let location = format!("{}({})", function.location, argument.name);
                validator.type_use(&argument.type_use, &location)?;
                validator.default_value(argument, &location)?;
            }
            Declaration::AttachField(field) => {
                let scope = members_of(scope.as_mut(), declaration, &[Kind::Object])?;
                scope.insert("field", &field.name)?;

                let location = format!("{}.{}", scope.name, field.name);
                validator.type_use(&field.type_use, &location)?;
                function = None;
            }
            Declaration::AttachEnumMember { name, .. } => {
                let scope = members_of(scope.as_mut(), declaration, &[Kind::Enum])?;
                scope.insert("enum member", name)?;
            }
        }
    }

    Ok(())
}

impl Scope {
    fn new(name: &str, kind: Kind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            members: HashSet::new(),
            has_constructor: false,
        }
    }

    fn insert(&mut self, kind: &'static str, name: &str) -> Result<(), RegistrationError> {
        if self.members.insert(name.to_string()) {
            return Ok(());
        }

        Err(RegistrationError::Duplicate {
            kind,
            name: name.to_string(),
            scope: self.name.clone(),
        })
    }
}

impl Function {
    fn new(location: String) -> Self {
        Self {
            location,
            arguments: HashSet::new(),
        }
    }
}

fn members_of<'s>(
    scope: Option<&'s mut Scope>,
    declaration: &Declaration,
    kinds: &[Kind],
) -> Result<&'s mut Scope, RegistrationError> {
    let expected = match kinds {
        [Kind::Enum] => "enum",
        [Kind::Object] => "object",
        _ => "object or interface",
    };

    match scope {
        Some(scope) if kinds.contains(&scope.kind) => Ok(scope),
        _ => Err(misplaced(declaration, expected)),
    }
}

fn misplaced(declaration: &Declaration, expected: &'static str) -> RegistrationError {
    RegistrationError::Misplaced {
        declaration: declaration.to_string(),
        expected,
    }
}

struct Validator<'a> {
    declared: Vec<(&'a str, Kind)>,
    remote: Option<&'a TypeModel>,
}

impl Validator<'_> {
    fn is_declared(&self, name: &str, kind: Kind) -> bool {
        self.declared.contains(&(name, kind))
    }

    fn type_use(&self, type_use: &TypeUse, location: &str) -> Result<(), RegistrationError> {
        self.type_ref(&type_use.type_ref, location)
    }

    fn type_ref(&self, type_ref: &TypeRef, location: &str) -> Result<(), RegistrationError> {
        let remote = self.remote;

        let (name, known) = match type_ref {
            TypeRef::Void => return Ok(()),
            TypeRef::List { element } => return self.type_ref(element, location),
            TypeRef::InputObject { name } => {
                return Err(RegistrationError::UnsupportedType {
                    name: name.clone(),
                    location: location.to_string(),
                })
            }
            TypeRef::Scalar { name } => (
                name,
                builtin::is_builtin(name)
                    || name == builtin::JSON
                    || remote.is_some_and(|remote| remote.scalars.contains_key(name)),
            ),
            TypeRef::Object { name } => (
                name,
                self.is_declared(name, Kind::Object) || remote.is_some_and(|remote| remote.object(name).is_some()),
            ),
            TypeRef::Interface { name } => (
                name,
                self.is_declared(name, Kind::Interface) || remote.is_some_and(|remote| remote.interface(name).is_some()),
            ),
            TypeRef::Enum { name, .. } => (
                name,
                self.is_declared(name, Kind::Enum) || remote.is_some_and(|remote| remote.enumeration(name).is_some()),
            ),
        };

        if known {
            Ok(())
        } else {
            Err(RegistrationError::UnknownType {
                name: name.clone(),
                location: location.to_string(),
            })
        }
    }

    fn default_value(&self, argument: &ArgumentDecl, location: &str) -> Result<(), RegistrationError> {
        let Some(value) = &argument.default_value else {
            return Ok(());
        };

        if !is_finite(value) {
            return Err(invalid_default(location, "numbers must be finite"));
        }

        check_shape(&argument.type_use.type_ref, value, location)
    }
}

fn invalid_default(location: &str, reason: impl Into<String>) -> RegistrationError {
    RegistrationError::InvalidDefault {
        location: location.to_string(),
        reason: reason.into(),
    }
}

fn is_finite(value: &WireValue) -> bool {
    match value {
        WireValue::Number(Number::Float(value)) => value.is_finite(),
        WireValue::List(values) => values.iter().all(is_finite),
        WireValue::Object(fields) => fields.values().all(is_finite),
        _ => true,
    }
}

/// Defaults are sent as JSON and must match the argument type.
fn check_shape(type_ref: &TypeRef, value: &WireValue, location: &str) -> Result<(), RegistrationError> {
    if value.is_null() {
        return Ok(());
    }

    let mismatch = || invalid_default(location, format!("expected {type_ref}, found {}", value.kind()));

    match type_ref {
        TypeRef::List { element } => match value {
            WireValue::List(values) => values
                .iter()
                .try_for_each(|value| check_shape(element, value, location)),
            _ => Err(mismatch()),
        },
        TypeRef::Enum { name, values } => match value {
            WireValue::String(member) if values.contains(member) => Ok(()),
            value => Err(RegistrationError::InvalidEnumDefault {
                location: location.to_string(),
                value: value.to_string(),
                enum_name: name.clone(),
            }),
        },
        TypeRef::Scalar { name } => {
            let matches = match (name.as_str(), value) {
                (builtin::JSON, _) => true,
                (builtin::INT, WireValue::Number(Number::Int(_))) => true,
                (builtin::FLOAT, WireValue::Number(_)) => true,
                (builtin::BOOLEAN, WireValue::Boolean(_)) => true,
                (builtin::INT | builtin::FLOAT | builtin::BOOLEAN, _) => false,
                (_, WireValue::String(_)) => true,
                _ => false,
            };
            if matches { Ok(()) } else { Err(mismatch()) }
        }
        TypeRef::Object { .. } | TypeRef::Interface { .. } | TypeRef::InputObject { .. } => Err(invalid_default(
            location,
            "objects cannot have default values, use a contextual path instead",
        )),
        TypeRef::Void => Err(mismatch()),
    }
}
