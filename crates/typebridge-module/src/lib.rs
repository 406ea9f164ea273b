//! Runtime of a typebridge module.
//!
//! The engine starts the module process once per call. [`run`] reads the call, scans the
//! module sources into a type model and either registers the module or dispatches the call
//! to the native implementation found in the [`Registry`].

mod config;
mod dispatcher;
mod entrypoint;
mod error;
pub mod logging;
mod object;
mod registry;

pub use config::{ModuleConfig, CONFIG_FILE, MODULE_ROOT_ENV};
pub use dispatcher::{DispatchState, Dispatcher, Invocation};
pub use entrypoint::{run, serve, Entrypoint};
pub use error::{DispatchError, EntrypointError};
pub use object::{CallArgs, ModuleObject, ObjectFunctions};
pub use registry::{ObjectBuilder, Registry, RegistryBuilder};

pub use typebridge_client::{QueryError, RemoteExecError, RemoteObjectHandle};
pub use typebridge_codec::{CodecError, FromValue, IntoValue, ObjectValue, Value};
pub use typebridge_macros::{constructor, enumeration, function, interface, object};

#[doc(hidden)]
pub mod __private {
    pub use anyhow;
}
