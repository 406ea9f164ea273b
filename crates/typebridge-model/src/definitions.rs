use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{CachePolicy, TypeRef, WireValue};

/// A function argument, in declaration order within its [`FunctionDef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    /// Name on the wire.
    pub name: String,
    /// Name of the parameter in the native source. Equal to `name` for remote schemas.
    pub native_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<WireValue>,
    /// Local path loaded when the argument is omitted. Only valid for `Directory` and `File`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contextual_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_patterns: Option<Vec<String>>,
}

impl Argument {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        let name = name.into();
        Self {
            native_name: name.clone(),
            name,
            description: None,
            type_ref,
            optional: false,
            default_value: None,
            contextual_path: None,
            ignore_patterns: None,
        }
    }

    #[must_use]
    pub fn with_native_name(mut self, native_name: impl Into<String>) -> Self {
        self.native_name = native_name.into();
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: WireValue) -> Self {
        self.optional = true;
        self.default_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Required arguments must be supplied by the caller.
    pub fn is_required(&self) -> bool {
        !self.optional && self.default_value.is_none() && self.contextual_path.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    /// Name on the wire. Empty for constructors.
    pub name: String,
    pub native_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<String>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    pub return_type: TypeRef,
    #[serde(default)]
    pub return_optional: bool,
    #[serde(default)]
    pub cache_policy: CachePolicy,
}

impl FunctionDef {
    pub fn new(name: impl Into<String>, return_type: TypeRef) -> Self {
        let name = name.into();
        Self {
            native_name: name.clone(),
            name,
            description: None,
            deprecated: None,
            experimental: None,
            arguments: Vec::new(),
            return_type,
            return_optional: false,
            cache_policy: CachePolicy::Default,
        }
    }

    /// A constructor has an empty wire name and returns its declaring object.
    pub fn constructor(object_name: &str) -> Self {
        let mut function = Self::new("", TypeRef::object(object_name));
        function.native_name = "new".to_string();
        function
    }

    #[must_use]
    pub fn with_native_name(mut self, native_name: impl Into<String>) -> Self {
        self.native_name = native_name.into();
        self
    }

    #[must_use]
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.name.is_empty()
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|argument| argument.name == name)
    }

    pub fn has_required_arguments(&self) -> bool {
        self.arguments.iter().any(Argument::is_required)
    }

    pub fn required_arguments(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter().filter(|argument| !argument.optional)
    }

    pub fn optional_arguments(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter().filter(|argument| argument.optional)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    pub native_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub optional: bool,
    /// Exposed fields are part of the schema; the others only travel as object state.
    #[serde(default)]
    pub exposed: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        let name = name.into();
        Self {
            native_name: name.clone(),
            name,
            description: None,
            deprecated: None,
            type_ref,
            optional: false,
            exposed: true,
        }
    }

    #[must_use]
    pub fn with_native_name(mut self, native_name: impl Into<String>) -> Self {
        self.native_name = native_name.into();
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.exposed = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    /// Keyed by wire name.
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
    /// Keyed by wire name.
    #[serde(default)]
    pub functions: IndexMap<String, FunctionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructor: Option<FunctionDef>,
    #[serde(default)]
    pub provides_identity: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
}

impl ObjectDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deprecated: None,
            fields: IndexMap::new(),
            functions: IndexMap::new(),
            constructor: None,
            provides_identity: false,
            interfaces: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    #[must_use]
    pub fn with_function(mut self, function: FunctionDef) -> Self {
        self.functions.insert(function.name.clone(), function);
        self
    }

    #[must_use]
    pub fn with_constructor(mut self, constructor: FunctionDef) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn field_by_native_name(&self, native_name: &str) -> Option<&FieldDef> {
        self.fields.values().find(|field| field.native_name == native_name)
    }

    pub fn exposed_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values().filter(|field| field.exposed)
    }

    /// Whether the object has a non null `id` field, or an `id` function without required
    /// arguments, returning `ID` or `{Name}ID`.
    pub fn detect_identity(&self) -> bool {
        let identity_field = self.fields.get("id").is_some_and(|field| {
            field.exposed && !field.optional && field.type_ref.is_id_scalar_of(&self.name)
        });

        let identity_function = self.functions.get("id").is_some_and(|function| {
            !function.return_optional
                && !function.has_required_arguments()
                && function.return_type.is_id_scalar_of(&self.name)
        });

        identity_field || identity_function
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub functions: IndexMap<String, FunctionDef>,
}

impl InterfaceDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            functions: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueDef {
    pub api_name: String,
    pub native_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl EnumValueDef {
    pub fn new(api_name: impl Into<String>, native_name: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            native_name: native_name.into(),
            description: None,
            deprecated: None,
        }
    }
}

/// An enumeration. Wire and native names form a bijection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub values: Vec<EnumValueDef>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, values: Vec<EnumValueDef>) -> Self {
        Self {
            name: name.into(),
            description: None,
            values,
        }
    }

    pub fn api_to_native(&self, api_name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|value| value.api_name == api_name)
            .map(|value| value.native_name.as_str())
    }

    pub fn native_to_api(&self, native_name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|value| value.native_name == native_name)
            .map(|value| value.api_name.as_str())
    }

    /// The first name that breaks the bijection between wire and native names, if any.
    pub fn bijection_violation(&self) -> Option<&str> {
        let mut api_names = std::collections::HashSet::new();
        let mut native_names = std::collections::HashSet::new();

        self.values
            .iter()
            .find(|value| !api_names.insert(&value.api_name) || !native_names.insert(&value.native_name))
            .map(|value| value.api_name.as_str())
    }

    pub fn as_type_ref(&self) -> TypeRef {
        TypeRef::enumeration(&self.name, self.values.iter().map(|value| value.api_name.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputObjectDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Argument>,
}
