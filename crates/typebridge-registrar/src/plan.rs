use std::fmt;

use typebridge_model::{Argument, CachePolicy, FieldDef, FunctionDef, ObjectDef, TypeModel, TypeRef, WireValue};

/// A type as used by a function, argument or field.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeUse {
    pub type_ref: TypeRef,
    pub optional: bool,
}

impl TypeUse {
    pub fn new(type_ref: TypeRef, optional: bool) -> Self {
        Self { type_ref, optional }
    }
}

impl fmt::Display for TypeUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_ref)?;
        if !self.optional && !self.type_ref.is_void() {
            f.write_str("!")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: Option<String>,
    pub cache_policy: CachePolicy,
    pub return_type: TypeUse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDecl {
    pub name: String,
    pub description: Option<String>,
    pub type_use: TypeUse,
    pub default_value: Option<WireValue>,
    pub contextual_path: Option<String>,
    pub ignore_patterns: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub description: Option<String>,
    pub deprecated: Option<String>,
    pub type_use: TypeUse,
}

/// One step of a registration.
///
/// Declarations are positional: functions and fields attach to the last declared object or
/// interface, arguments to the last declared function or constructor, members to the last
/// declared enum.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    ModuleDescription(String),
    DeclareObject {
        name: String,
        description: Option<String>,
        deprecated: Option<String>,
    },
    DeclareFunction(FunctionDecl),
    AttachArgument(ArgumentDecl),
    AttachField(FieldDecl),
    AttachConstructor {
        object: String,
    },
    DeclareEnum {
        name: String,
        description: Option<String>,
    },
    AttachEnumMember {
        name: String,
        description: Option<String>,
        deprecated: Option<String>,
    },
    DeclareInterface {
        name: String,
        description: Option<String>,
    },
}

impl Declaration {
    fn depth(&self) -> usize {
        match self {
            Declaration::ModuleDescription(_)
            | Declaration::DeclareObject { .. }
            | Declaration::DeclareEnum { .. }
            | Declaration::DeclareInterface { .. } => 0,
            Declaration::DeclareFunction(_)
            | Declaration::AttachField(_)
            | Declaration::AttachConstructor { .. }
            | Declaration::AttachEnumMember { .. } => 1,
            Declaration::AttachArgument(_) => 2,
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::ModuleDescription(description) => write!(f, "module {description:?}"),
            Declaration::DeclareObject { name, deprecated, .. } => {
                write!(f, "object {name}")?;
                write_deprecated(f, deprecated.as_deref())
            }
            Declaration::DeclareFunction(function) => {
                write!(f, "function {}: {}", function.name, function.return_type)?;
                if function.cache_policy != CachePolicy::Default {
                    write!(f, " cache={}", function.cache_policy)?;
                }
                write_deprecated(f, function.deprecated.as_deref())
            }
            Declaration::AttachArgument(argument) => {
                write!(f, "argument {}: {}", argument.name, argument.type_use)?;
                if let Some(default) = &argument.default_value {
                    write!(f, " = {default}")?;
                }
                if let Some(path) = &argument.contextual_path {
                    write!(f, " path={path:?}")?;
                }
                if let Some(patterns) = &argument.ignore_patterns {
                    write!(f, " ignore={patterns:?}")?;
                }
                Ok(())
            }
            Declaration::AttachField(field) => {
                write!(f, "field {}: {}", field.name, field.type_use)?;
                write_deprecated(f, field.deprecated.as_deref())
            }
            Declaration::AttachConstructor { .. } => f.write_str("constructor"),
            Declaration::DeclareEnum { name, .. } => write!(f, "enum {name}"),
            Declaration::AttachEnumMember { name, deprecated, .. } => {
                write!(f, "member {name}")?;
                write_deprecated(f, deprecated.as_deref())
            }
            Declaration::DeclareInterface { name, .. } => write!(f, "interface {name}"),
        }
    }
}

fn write_deprecated(f: &mut fmt::Formatter<'_>, reason: Option<&str>) -> fmt::Result {
    match reason {
        Some(reason) => write!(f, " @deprecated({reason:?})"),
        None => Ok(()),
    }
}

/// The buffered declarations of a module, in the order they are sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationPlan {
    declarations: Vec<Declaration>,
}

impl RegistrationPlan {
    /// Walks the model once: the module description, then every object with its functions,
    /// exposed fields and constructor, then enums and interfaces.
    pub fn from_model(model: &TypeModel) -> Self {
        let mut plan = RegistrationPlan::default();

        if let Some(description) = &model.description {
            plan.push(Declaration::ModuleDescription(description.clone()));
        }

        for object in model.objects.values() {
            plan.object(object);
        }

        for enumeration in model.enums.values() {
            plan.push(Declaration::DeclareEnum {
                name: enumeration.name.clone(),
                description: enumeration.description.clone(),
            });

            for value in &enumeration.values {
                plan.push(Declaration::AttachEnumMember {
                    name: value.api_name.clone(),
                    description: value.description.clone(),
                    deprecated: value.deprecated.clone(),
                });
            }
        }

        for interface in model.interfaces.values() {
            plan.push(Declaration::DeclareInterface {
                name: interface.name.clone(),
                description: interface.description.clone(),
            });

            for function in interface.functions.values() {
                plan.function(function);
            }
        }

        plan
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn push(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }

    fn object(&mut self, object: &ObjectDef) {
        self.push(Declaration::DeclareObject {
            name: object.name.clone(),
            description: object.description.clone(),
            deprecated: object.deprecated.clone(),
        });

        for function in object.functions.values() {
            self.function(function);
        }

        for field in object.exposed_fields() {
            self.field(field);
        }

        if let Some(constructor) = &object.constructor {
            self.push(Declaration::AttachConstructor {
                object: object.name.clone(),
            });
            self.arguments(&constructor.arguments);
        }
    }

    fn function(&mut self, function: &FunctionDef) {
        self.push(Declaration::DeclareFunction(FunctionDecl {
            name: function.name.clone(),
            description: function.description.clone(),
            deprecated: function.deprecated.clone(),
            cache_policy: function.cache_policy,
            return_type: TypeUse::new(function.return_type.clone(), function.return_optional),
        }));

        self.arguments(&function.arguments);
    }

    fn arguments(&mut self, arguments: &[Argument]) {
        for argument in arguments {
            self.push(Declaration::AttachArgument(ArgumentDecl {
                name: argument.name.clone(),
                description: argument.description.clone(),
                type_use: TypeUse::new(argument.type_ref.clone(), argument.optional),
                default_value: argument.default_value.clone(),
                contextual_path: argument.contextual_path.clone(),
                ignore_patterns: argument.ignore_patterns.clone(),
            }));
        }
    }

    fn field(&mut self, field: &FieldDef) {
        self.push(Declaration::AttachField(FieldDecl {
            name: field.name.clone(),
            description: field.description.clone(),
            deprecated: field.deprecated.clone(),
            type_use: TypeUse::new(field.type_ref.clone(), field.optional),
        }));
    }
}

/// Renders the plan as an indented outline, one declaration per line.
impl fmt::Display for RegistrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, declaration) in self.declarations.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{:indent$}{declaration}", "", indent = declaration.depth() * 2)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use typebridge_model::{EnumDef, EnumValueDef, InterfaceDef};

    use super::*;

    fn model() -> TypeModel {
        let mut model = TypeModel::new("greeter");
        model.description = Some("Greets people.".into());

        let mut greeting = FunctionDef::new("greeting", TypeRef::string())
            .with_argument(Argument::new("name", TypeRef::string()))
            .with_argument(Argument::new("excited", TypeRef::boolean()).with_default(WireValue::from(false)));
        greeting.cache_policy = CachePolicy::Ttl(Duration::from_secs(600));

        let mut shout = FunctionDef::new("shout", TypeRef::Void);
        shout.deprecated = Some("use greeting".into());

        let build = FunctionDef::new("build", TypeRef::object("Container")).with_argument({
            let mut source = Argument::new("source", TypeRef::object("Directory")).optional();
            source.contextual_path = Some(".".into());
            source.ignore_patterns = Some(vec!["target".into()]);
            source
        });

        model.insert_object(
            ObjectDef::new("Greeter")
                .with_field(FieldDef::new("prefix", TypeRef::string()))
                .with_field(FieldDef::new("calls", TypeRef::int()).private())
                .with_function(greeting)
                .with_function(shout)
                .with_function(build)
                .with_constructor(
                    FunctionDef::constructor("Greeter")
                        .with_argument(Argument::new("prefix", TypeRef::string()).with_default(WireValue::from("Hello"))),
                ),
        );

        model.insert_enum(EnumDef::new(
            "Language",
            vec![EnumValueDef::new("ENGLISH", "English"), EnumValueDef::new("FR", "French")],
        ));

        let mut named = InterfaceDef::new("Named");
        named
            .functions
            .insert("name".into(), FunctionDef::new("name", TypeRef::string()));
        model.insert_interface(named);

        model
    }

    #[test]
    fn declarations_follow_the_model() {
        let plan = RegistrationPlan::from_model(&model());

        insta::assert_snapshot!(plan, @r###"
        module "Greets people."
        object Greeter
          function greeting: String! cache=600s
            argument name: String!
            argument excited: Boolean = false
          function shout: Void @deprecated("use greeting")
          function build: Container!
            argument source: Directory path="." ignore=["target"]
          field prefix: String!
          constructor
            argument prefix: String = "Hello"
        enum Language
          member ENGLISH
          member FR
        interface Named
          function name: String!
        "###);
    }

    #[test]
    fn empty_models_have_empty_plans() {
        let plan = RegistrationPlan::from_model(&TypeModel::new("empty"));

        assert!(plan.is_empty());
        assert_eq!(plan.to_string(), "");
    }
}
