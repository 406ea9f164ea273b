use std::path::PathBuf;

use typebridge_client::{ConfigError, QueryError, RemoteExecError};
use typebridge_codec::CodecError;
use typebridge_model::introspection::IntrospectionError;
use typebridge_registrar::RegistrationError;
use typebridge_scanner::ScanError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("object {0} is not registered")]
    UnknownObject(String),
    #[error("object {object} has no function {function}")]
    UnknownMethod { object: String, function: String },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Function(anyhow::Error),
    #[error("a previous invocation failed, the dispatcher accepts no further calls")]
    Poisoned,
}

impl DispatchError {
    /// Handler errors keep their codec classification when they carry one.
    pub(crate) fn from_handler(error: anyhow::Error) -> Self {
        match error.downcast::<CodecError>() {
            Ok(error) => DispatchError::Codec(error),
            Err(error) => DispatchError::Function(error),
        }
    }

    /// Details of a failed remote exec, when that is what made the call fail.
    pub fn remote_exec(&self) -> Option<&RemoteExecError> {
        match self {
            DispatchError::Codec(CodecError::Query(QueryError::RemoteExec(error))) => Some(error),
            DispatchError::Function(error) => error.chain().find_map(|cause| {
                cause.downcast_ref::<RemoteExecError>().or_else(|| match cause.downcast_ref::<QueryError>() {
                    Some(QueryError::RemoteExec(error)) => Some(error),
                    _ => None,
                })
            }),
            _ => None,
        }
    }

    /// Whether the native function itself failed, as opposed to the plumbing around it.
    pub fn is_function_error(&self) -> bool {
        matches!(self, DispatchError::Function(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EntrypointError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid module configuration in {path}: {source}")]
    ModuleConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("not running inside a session: {0}")]
    Session(#[from] ConfigError),
    #[error(transparent)]
    Introspection(#[from] IntrospectionError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("invalid JSON in the current function call: {0}")]
    Json(#[from] serde_json::Error),
}

impl EntrypointError {
    /// `1` when the invoked function failed, `2` for anything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            EntrypointError::Dispatch(error) if error.is_function_error() => 1,
            _ => 2,
        }
    }
}
