use indexmap::IndexMap;
use serde::Deserialize;
use tracing::instrument;
use typebridge_codec::Codec;
use typebridge_model::{FunctionDef, TypeRef, WireValue};

use crate::{CallArgs, DispatchError, Registry};

/// A call of a module function, as received from the engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub parent_name: String,
    /// Empty for the constructor.
    #[serde(default)]
    pub fn_name: String,
    #[serde(default)]
    pub parent_state: IndexMap<String, WireValue>,
    #[serde(default)]
    pub args: IndexMap<String, WireValue>,
}

impl Invocation {
    pub fn new(parent_name: impl Into<String>, fn_name: impl Into<String>) -> Self {
        Self {
            parent_name: parent_name.into(),
            fn_name: fn_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_state(mut self, field: impl Into<String>, value: impl Into<WireValue>) -> Self {
        self.parent_state.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<WireValue>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.fn_name.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DispatchState {
    Idle,
    Invoking,
    /// Terminal.
    Failed,
}

/// Routes invocations to the native implementations of the registry.
pub struct Dispatcher<'a> {
    registry: &'a Registry,
    codec: Codec<'a>,
    state: DispatchState,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry, codec: Codec<'a>) -> Self {
        Self {
            registry,
            codec,
            state: DispatchState::Idle,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Runs exactly one native call and returns its encoded result.
    #[instrument(skip_all, fields(object = %invocation.parent_name, function = %invocation.fn_name))]
    pub async fn dispatch(&mut self, invocation: Invocation) -> Result<WireValue, DispatchError> {
        if self.state == DispatchState::Failed {
            return Err(DispatchError::Poisoned);
        }

        self.state = DispatchState::Invoking;
        let result = self.invoke(invocation).await;

        self.state = match &result {
            Ok(_) => DispatchState::Idle,
            Err(error) => {
                tracing::debug!(%error, "invocation failed");
                DispatchState::Failed
            }
        };

        result
    }

    async fn invoke(&self, invocation: Invocation) -> Result<WireValue, DispatchError> {
        let Invocation {
            parent_name,
            fn_name,
            parent_state,
            args,
        } = invocation;

        let local = self.codec.local();
        let (Some(entry), Some(object)) = (self.registry.object(&parent_name), local.object(&parent_name)) else {
            return Err(DispatchError::UnknownObject(parent_name));
        };

        let unknown_method = || DispatchError::UnknownMethod {
            object: parent_name.clone(),
            function: fn_name.clone(),
        };

        if fn_name.is_empty() {
            let arguments = match &object.constructor {
                Some(constructor) => self.arguments(constructor, args)?,
                None => CallArgs::new(),
            };

            tracing::debug!("constructing");
            let instance = (entry.constructor)(arguments).await?;

            let return_type = TypeRef::object(&parent_name);
            return Ok(self.codec.encode(&return_type, instance).await?);
        }

        let function = object.functions.get(&fn_name).ok_or_else(unknown_method)?;
        let method = entry.methods.get(&function.native_name).ok_or_else(unknown_method)?;

        let state = self.codec.restore(object, parent_state)?;
        let arguments = self.arguments(function, args)?;

        tracing::debug!(native = function.native_name.as_str(), "invoking");
        let result = method(state, arguments).await?;

        Ok(self.codec.encode(&function.return_type, result).await?)
    }

    /// Decodes the arguments in declared order, whatever order the caller sent them in.
    fn arguments(
        &self,
        function: &FunctionDef,
        mut wire: IndexMap<String, WireValue>,
    ) -> Result<CallArgs, DispatchError> {
        let mut arguments = CallArgs::new();

        for argument in &function.arguments {
            let value = self.codec.decode_argument(argument, wire.swap_remove(&argument.name))?;
            arguments.insert(argument.native_name.clone(), value);
        }

        for name in wire.keys() {
            tracing::debug!(argument = name.as_str(), "ignoring undeclared argument");
        }

        Ok(arguments)
    }
}
