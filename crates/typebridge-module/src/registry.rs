use std::{collections::HashMap, future::Future, marker::PhantomData, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use indexmap::IndexMap;
use typebridge_codec::{IntoValue, ObjectValue, Value};

use crate::{CallArgs, DispatchError, ModuleObject, ObjectFunctions};

pub(crate) type Constructor = Arc<dyn Fn(CallArgs) -> BoxFuture<'static, Result<Value, DispatchError>> + Send + Sync>;

pub(crate) type Method =
    Arc<dyn Fn(ObjectValue, CallArgs) -> BoxFuture<'static, Result<Value, DispatchError>> + Send + Sync>;

pub(crate) struct ObjectEntry {
    pub(crate) constructor: Constructor,
    pub(crate) methods: HashMap<String, Method>,
}

/// The native implementations of the module objects, by object name.
///
/// Built once before the first dispatch and read-only afterwards.
pub struct Registry {
    objects: IndexMap<&'static str, ObjectEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn contains(&self, object: &str) -> bool {
        self.objects.contains_key(object)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().copied()
    }

    pub(crate) fn object(&self, name: &str) -> Option<&ObjectEntry> {
        self.objects.get(name)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.objects.iter().map(|(name, entry)| {
                let mut methods = entry.methods.keys().collect::<Vec<_>>();
                methods.sort();
                (name, methods)
            }))
            .finish()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    objects: IndexMap<&'static str, ObjectEntry>,
}

impl RegistryBuilder {
    /// Registers `T` with the functions added by `configure`.
    #[must_use]
    pub fn object<T: ModuleObject>(mut self, configure: impl FnOnce(ObjectBuilder<T>) -> ObjectBuilder<T>) -> Self {
        let object = configure(ObjectBuilder::new());
        self.objects.insert(T::NAME, object.entry);
        self
    }

    /// Registers `T` with the functions declared on it by the marker macros.
    #[must_use]
    pub fn register<T: ObjectFunctions>(self) -> Self {
        self.object::<T>(T::functions)
    }

    pub fn build(self) -> Registry {
        tracing::debug!(objects = self.objects.len(), "registry ready");
        Registry { objects: self.objects }
    }
}

/// Collects the constructor and functions of one object.
///
/// Functions are keyed by their native name, the dispatcher maps wire names through the type
/// model.
pub struct ObjectBuilder<T> {
    entry: ObjectEntry,
    object: PhantomData<fn() -> T>,
}

impl<T: ModuleObject> ObjectBuilder<T> {
    fn new() -> Self {
        let constructor: Constructor = Arc::new(|_| async { Ok(T::allocate().into_value()) }.boxed());

        Self {
            entry: ObjectEntry {
                constructor,
                methods: HashMap::new(),
            },
            object: PhantomData,
        }
    }

    /// Replaces the default constructor, which returns an allocated instance.
    #[must_use]
    pub fn constructor<F, Fut>(mut self, constructor: F) -> Self
    where
        F: Fn(CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.entry.constructor = Arc::new(move |args| {
            let call = constructor(args);
            async move {
                call.await
                    .map(IntoValue::into_value)
                    .map_err(DispatchError::from_handler)
            }
            .boxed()
        });
        self
    }

    /// Adds a function called on an instance restored from the parent state.
    #[must_use]
    pub fn function<F, Fut, R>(mut self, native_name: &str, function: F) -> Self
    where
        F: Fn(T, CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: IntoValue,
    {
        let method: Method = Arc::new(move |state, args| match T::restore(state) {
            Ok(this) => {
                let call = function(this, args);
                async move {
                    call.await
                        .map(IntoValue::into_value)
                        .map_err(DispatchError::from_handler)
                }
                .boxed()
            }
            Err(error) => futures::future::ready(Err(error.into())).boxed(),
        });

        self.entry.methods.insert(native_name.to_string(), method);
        self
    }
}
