use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{builtin, EnumDef, FunctionDef, InputObjectDef, InterfaceDef, ObjectDef, ScalarDef, TypeRef};

/// A closed catalog of named types.
///
/// Every [`TypeRef::Object`] and [`TypeRef::Interface`] reachable from the model names a
/// definition of the same model, or of the remote catalog it is checked against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeModel {
    /// Module name for scanned models, empty for remote schemas.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub objects: IndexMap<String, ObjectDef>,
    #[serde(default)]
    pub interfaces: IndexMap<String, InterfaceDef>,
    #[serde(default)]
    pub enums: IndexMap<String, EnumDef>,
    #[serde(default)]
    pub scalars: IndexMap<String, ScalarDef>,
    #[serde(default)]
    pub input_objects: IndexMap<String, InputObjectDef>,
}

/// Any named definition of a [`TypeModel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Definition<'a> {
    Object(&'a ObjectDef),
    Interface(&'a InterfaceDef),
    Enum(&'a EnumDef),
    Scalar(&'a ScalarDef),
    InputObject(&'a InputObjectDef),
}

impl Definition<'_> {
    pub fn name(&self) -> &str {
        match self {
            Definition::Object(def) => &def.name,
            Definition::Interface(def) => &def.name,
            Definition::Enum(def) => &def.name,
            Definition::Scalar(def) => &def.name,
            Definition::InputObject(def) => &def.name,
        }
    }

    pub fn as_type_ref(&self) -> TypeRef {
        match self {
            Definition::Object(def) => TypeRef::object(&def.name),
            Definition::Interface(def) => TypeRef::interface(&def.name),
            Definition::Enum(def) => def.as_type_ref(),
            Definition::Scalar(def) => TypeRef::scalar(&def.name),
            Definition::InputObject(def) => TypeRef::input_object(&def.name),
        }
    }
}

impl TypeModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn object(&self, name: &str) -> Option<&ObjectDef> {
        self.objects.get(name)
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDef> {
        self.interfaces.get(name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumDef> {
        self.enums.get(name)
    }

    pub fn definition(&self, name: &str) -> Option<Definition<'_>> {
        if let Some(def) = self.objects.get(name) {
            return Some(Definition::Object(def));
        }
        if let Some(def) = self.interfaces.get(name) {
            return Some(Definition::Interface(def));
        }
        if let Some(def) = self.enums.get(name) {
            return Some(Definition::Enum(def));
        }
        if let Some(def) = self.scalars.get(name) {
            return Some(Definition::Scalar(def));
        }
        self.input_objects.get(name).map(Definition::InputObject)
    }

    pub fn contains(&self, name: &str) -> bool {
        builtin::is_builtin(name) || self.definition(name).is_some()
    }

    /// Looks up a function by its object (or interface) and wire name.
    /// The empty name resolves to the constructor.
    pub fn function(&self, parent: &str, name: &str) -> Option<&FunctionDef> {
        if let Some(object) = self.objects.get(parent) {
            if name.is_empty() {
                return object.constructor.as_ref();
            }
            return object.functions.get(name);
        }

        self.interfaces.get(parent)?.functions.get(name)
    }

    /// Whether values of the named type travel by identity.
    pub fn provides_identity(&self, name: &str) -> bool {
        self.objects.get(name).is_some_and(|object| object.provides_identity) || self.interfaces.contains_key(name)
    }

    pub fn insert_object(&mut self, object: ObjectDef) {
        self.objects.insert(object.name.clone(), object);
    }

    pub fn insert_interface(&mut self, interface: InterfaceDef) {
        self.interfaces.insert(interface.name.clone(), interface);
    }

    pub fn insert_enum(&mut self, enumeration: EnumDef) {
        self.enums.insert(enumeration.name.clone(), enumeration);
    }

    pub fn insert_scalar(&mut self, scalar: ScalarDef) {
        self.scalars.insert(scalar.name.clone(), scalar);
    }

    pub fn insert_input_object(&mut self, input_object: InputObjectDef) {
        self.input_objects.insert(input_object.name.clone(), input_object);
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
            && self.interfaces.is_empty()
            && self.enums.is_empty()
            && self.scalars.is_empty()
            && self.input_objects.is_empty()
    }

    /// The names of the referenced object and interface types that are not defined in this model.
    pub fn unresolved_references(&self) -> Vec<String> {
        let mut missing = Vec::new();

        let mut check = |type_ref: &TypeRef| {
            if let TypeRef::Object { name } | TypeRef::Interface { name } = type_ref.innermost() {
                if self.definition(name).is_none() && !missing.contains(name) {
                    missing.push(name.clone());
                }
            }
        };

        for object in self.objects.values() {
            for field in object.fields.values() {
                check(&field.type_ref);
            }
            for function in object.functions.values().chain(object.constructor.as_ref()) {
                check(&function.return_type);
                function.arguments.iter().for_each(|argument| check(&argument.type_ref));
            }
        }

        for interface in self.interfaces.values() {
            for function in interface.functions.values() {
                check(&function.return_type);
                function.arguments.iter().for_each(|argument| check(&argument.type_ref));
            }
        }

        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Argument, FieldDef};

    fn model() -> TypeModel {
        let mut model = TypeModel::new("greeter");
        model.insert_object(
            ObjectDef::new("Greeter")
                .with_field(FieldDef::new("greeting", TypeRef::string()))
                .with_function(
                    FunctionDef::new("hello", TypeRef::string()).with_argument(Argument::new("name", TypeRef::string())),
                )
                .with_function(FunctionDef::new("container", TypeRef::object("Container")))
                .with_constructor(FunctionDef::constructor("Greeter")),
        );
        model
    }

    #[test]
    fn empty_function_name_is_the_constructor() {
        let model = model();

        assert!(model.function("Greeter", "").unwrap().is_constructor());
        assert_eq!(model.function("Greeter", "hello").unwrap().arguments.len(), 1);
        assert!(model.function("Greeter", "missing").is_none());
        assert!(model.function("Missing", "hello").is_none());
    }

    #[test]
    fn reports_references_to_undefined_types() {
        assert_eq!(model().unresolved_references(), vec!["Container".to_string()]);
    }

    #[test]
    fn definitions_are_found_by_name() {
        let model = model();

        assert_eq!(model.definition("Greeter").unwrap().as_type_ref(), TypeRef::object("Greeter"));
        assert!(model.contains("String"));
        assert!(!model.contains("Container"));
    }
}
