use indexmap::IndexMap;
use typebridge_codec::{CodecError, FromValue, IntoValue, ObjectValue, Value};

use crate::ObjectBuilder;

/// A native type exposed as an object of the module.
///
/// Restoring an instance is two-phase: [`ModuleObject::allocate`] builds an empty one without
/// running the constructor, then [`ModuleObject::assign`] writes the state sent by the caller.
pub trait ModuleObject: FromValue + IntoValue + Send + 'static {
    /// Object name, as registered.
    const NAME: &'static str;

    fn allocate() -> Self;

    /// Overwrites the fields present in `state`, keyed by native name. Missing fields keep
    /// their allocated value.
    fn assign(&mut self, state: ObjectValue) -> Result<(), CodecError>;

    /// Restores an instance from its state.
    fn restore(state: ObjectValue) -> Result<Self, CodecError> {
        let mut object = Self::allocate();
        object.assign(state)?;
        Ok(object)
    }
}

/// The functions of a module object, usually generated by `#[object]` on an `impl` block.
pub trait ObjectFunctions: ModuleObject + Sized {
    fn functions(object: ObjectBuilder<Self>) -> ObjectBuilder<Self>;
}

/// Decoded arguments of a call, keyed by native name in declared order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    values: IndexMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, native_name: impl Into<String>, value: impl IntoValue) -> Self {
        self.insert(native_name, value.into_value());
        self
    }

    pub fn insert(&mut self, native_name: impl Into<String>, value: Value) {
        self.values.insert(native_name.into(), value);
    }

    /// Removes an argument and converts it. Absent arguments convert from null.
    pub fn take<T: FromValue>(&mut self, native_name: &str) -> Result<T, CodecError> {
        T::from_value(self.values.shift_remove(native_name).unwrap_or(Value::Null))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl IntoIterator for CallArgs {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_arguments_take_as_null() {
        let mut args = CallArgs::new().with("name", "world");

        assert_eq!(args.take::<String>("name").unwrap(), "world");
        assert_eq!(args.take::<Option<String>>("name").unwrap(), None);
        assert!(matches!(
            args.take::<String>("name"),
            Err(CodecError::Marshalling { .. })
        ));
    }

    #[test]
    fn keeps_insertion_order() {
        let args = CallArgs::new().with("b", 1_i64).with("a", 2_i64);
        assert_eq!(args.names().collect::<Vec<_>>(), ["b", "a"]);
    }
}
