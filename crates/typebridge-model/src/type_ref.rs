use std::fmt;

use serde::{Deserialize, Serialize};

/// Names of the scalars every schema provides.
pub mod builtin {
    pub const STRING: &str = "String";
    pub const INT: &str = "Int";
    pub const FLOAT: &str = "Float";
    pub const BOOLEAN: &str = "Boolean";
    pub const ID: &str = "ID";
    pub const JSON: &str = "JSON";
    pub const VOID: &str = "Void";

    pub fn is_builtin(name: &str) -> bool {
        matches!(name, STRING | INT | FLOAT | BOOLEAN | ID)
    }
}

/// A reference to a type of the model.
///
/// Objects and interfaces are referenced by name only; their definition lives in the
/// [`TypeModel`](crate::TypeModel). This keeps recursive object graphs free of cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeRef {
    Scalar { name: String },
    Object { name: String },
    Interface { name: String },
    Enum { name: String, values: Vec<String> },
    List { element: Box<TypeRef> },
    InputObject { name: String },
    Void,
}

impl TypeRef {
    pub fn scalar(name: impl Into<String>) -> Self {
        TypeRef::Scalar { name: name.into() }
    }

    pub fn string() -> Self {
        Self::scalar(builtin::STRING)
    }

    pub fn int() -> Self {
        Self::scalar(builtin::INT)
    }

    pub fn float() -> Self {
        Self::scalar(builtin::FLOAT)
    }

    pub fn boolean() -> Self {
        Self::scalar(builtin::BOOLEAN)
    }

    pub fn object(name: impl Into<String>) -> Self {
        TypeRef::Object { name: name.into() }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        TypeRef::Interface { name: name.into() }
    }

    pub fn input_object(name: impl Into<String>) -> Self {
        TypeRef::InputObject { name: name.into() }
    }

    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeRef::Enum {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn list(element: TypeRef) -> Self {
        TypeRef::List {
            element: Box::new(element),
        }
    }

    /// The name of the named type, `None` for lists and void.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Scalar { name }
            | TypeRef::Object { name }
            | TypeRef::Interface { name }
            | TypeRef::Enum { name, .. }
            | TypeRef::InputObject { name } => Some(name),
            TypeRef::List { .. } | TypeRef::Void => None,
        }
    }

    /// Strips every list wrapper.
    pub fn innermost(&self) -> &TypeRef {
        let mut current = self;
        while let TypeRef::List { element } = current {
            current = element;
        }
        current
    }

    pub fn list_depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let TypeRef::List { element } = current {
            depth += 1;
            current = element;
        }
        depth
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TypeRef::List { .. })
    }

    /// Objects and interfaces, the types that are selected rather than returned as values.
    pub fn is_object_like(&self) -> bool {
        matches!(self, TypeRef::Object { .. } | TypeRef::Interface { .. })
    }

    pub fn is_scalar_named(&self, expected: &str) -> bool {
        matches!(self, TypeRef::Scalar { name } if name == expected)
    }

    /// The ID scalar of `object`: the builtin `ID` or `{object}ID` (`ContainerID`).
    pub fn is_id_scalar_of(&self, object: &str) -> bool {
        matches!(self, TypeRef::Scalar { name } if name == builtin::ID || name.strip_suffix("ID") == Some(object))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::List { element } => write!(f, "[{element}]"),
            TypeRef::Void => f.write_str(builtin::VOID),
            named => f.write_str(named.name().unwrap_or_default()),
        }
    }
}
