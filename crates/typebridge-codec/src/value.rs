use std::collections::VecDeque;

use indexmap::IndexMap;
use typebridge_client::{ObjectProxy, RemoteObjectHandle};
use typebridge_model::WireValue;

use crate::CodecError;

/// A native value, as seen by the codec.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Enum member, by native name.
    Enum(String),
    List(Vec<Value>),
    /// State of a module object.
    Object(ObjectValue),
    /// An object living in the remote engine.
    Handle(RemoteObjectHandle),
    /// JSON scalars and input objects.
    Json(WireValue),
}

/// The state of a module object, keyed by native field name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectValue {
    pub type_name: String,
    pub fields: IndexMap<String, Value>,
}

impl ObjectValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, native_name: impl Into<String>, value: impl IntoValue) -> Self {
        self.fields.insert(native_name.into(), value.into_value());
        self
    }

    /// Removes a field and converts it, `None` when the state does not carry it.
    pub fn take<T: FromValue>(&mut self, native_name: &str) -> Result<Option<T>, CodecError> {
        self.fields.swap_remove(native_name).map(T::from_value).transpose()
    }
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Handle(_) => "remote object",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) | (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            // Handles only compare equal once both IDs are known.
            (Value::Handle(a), Value::Handle(b)) => {
                a.type_name() == b.type_name() && a.known_id().is_some() && a.known_id() == b.known_id()
            }
            _ => false,
        }
    }
}

/// Conversion from a decoded [`Value`] into a native type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, CodecError>;
}

/// Conversion of a native type into a [`Value`] ready to be encoded.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        Ok(value)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::String(value) => Ok(value),
            other => Err(CodecError::marshalling("string", other.kind_name())),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Boolean(value) => Ok(value),
            other => Err(CodecError::marshalling("boolean", other.kind_name())),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}

macro_rules! impl_int {
    ($($ty:ty),*) => {$(
        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, CodecError> {
                match value {
                    Value::Int(value) => <$ty>::try_from(value)
                        .map_err(|_| CodecError::marshalling(stringify!($ty), value)),
                    other => Err(CodecError::marshalling("int", other.kind_name())),
                }
            }
        }

        impl IntoValue for $ty {
            fn into_value(self) -> Value {
                Value::Int(i64::from(self))
            }
        }
    )*};
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Float(value) => Ok(value),
            Value::Int(value) => Ok(value as f64),
            other => Err(CodecError::marshalling("float", other.kind_name())),
        }
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        f64::from_value(value).map(|value| value as f32)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl FromValue for () {
    fn from_value(_: Value) -> Result<Self, CodecError> {
        Ok(())
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::List(values) => values.into_iter().map(T::from_value).collect(),
            other => Err(CodecError::marshalling("list", other.kind_name())),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for VecDeque<T> {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        Vec::<T>::from_value(value).map(VecDeque::from)
    }
}

impl<T: IntoValue> IntoValue for VecDeque<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl FromValue for RemoteObjectHandle {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Handle(handle) => Ok(handle),
            other => Err(CodecError::marshalling("remote object", other.kind_name())),
        }
    }
}

impl IntoValue for RemoteObjectHandle {
    fn into_value(self) -> Value {
        Value::Handle(self)
    }
}

impl FromValue for WireValue {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Json(value) => Ok(value),
            Value::Null => Ok(WireValue::Null),
            other => Err(CodecError::marshalling("json", other.kind_name())),
        }
    }
}

impl IntoValue for WireValue {
    fn into_value(self) -> Value {
        Value::Json(self)
    }
}

impl FromValue for ObjectValue {
    fn from_value(value: Value) -> Result<Self, CodecError> {
        match value {
            Value::Object(object) => Ok(object),
            other => Err(CodecError::marshalling("object", other.kind_name())),
        }
    }
}

impl IntoValue for ObjectValue {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

/// Converts a decoded handle into a generated client type.
pub fn proxy_from_value<P: ObjectProxy>(value: Value) -> Result<P, CodecError> {
    match value {
        Value::Handle(handle) => Ok(P::from_handle(handle)),
        other => Err(CodecError::marshalling(P::TYPE_NAME, other.kind_name())),
    }
}

pub fn proxy_into_value<P: ObjectProxy>(proxy: &P) -> Value {
    Value::Handle(proxy.to_handle())
}

/// Implements [`FromValue`] and [`IntoValue`] for generated client types.
#[macro_export]
macro_rules! impl_proxy_value {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::FromValue for $ty {
            fn from_value(value: $crate::Value) -> ::std::result::Result<Self, $crate::CodecError> {
                $crate::proxy_from_value(value)
            }
        }

        impl $crate::IntoValue for $ty {
            fn into_value(self) -> $crate::Value {
                $crate::proxy_into_value(&self)
            }
        }
    )*};
}
