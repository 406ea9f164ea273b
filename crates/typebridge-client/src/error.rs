use std::fmt;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("could not reach the remote API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote API answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Graphql(GraphqlErrors),
    #[error(transparent)]
    RemoteExec(#[from] RemoteExecError),
    #[error("remote API returned no data")]
    EmptyResponse,
    #[error("response has no value at `{path}`")]
    Unpack { path: String },
    #[error("could not deserialize the response: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error("could not resolve argument `{name}`: {source}")]
    LazyArgument {
        name: String,
        #[source]
        source: Box<QueryError>,
    },
}

/// The `errors` entry of a GraphQL response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlErrors(pub Vec<GraphqlError>);

impl fmt::Display for GraphqlErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self.0.iter().map(|error| error.message.as_str()).collect::<Vec<_>>();
        write!(f, "remote API returned errors: {}", messages.join("; "))
    }
}

/// A command executed by the remote engine exited with a non zero code.
///
/// Output streams are kept apart from the message so that callers can surface them as is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteExecError {
    pub message: String,
    pub exit_code: i32,
    pub command: Vec<String>,
    pub stdout: String,
    pub stderr: String,
}

impl RemoteExecError {
    /// Exec failures carry their details as error extensions (`exitCode`, `stdout`, `stderr`).
    pub fn from_graphql(error: &GraphqlError) -> Option<Self> {
        let extensions = error.extensions.as_ref()?;
        let exit_code = extensions.get("exitCode")?.as_i64()?;

        let text = |key: &str| {
            extensions
                .get(key)
                .and_then(|value| value.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let command = extensions
            .get("cmd")
            .and_then(|value| value.as_array())
            .map(|args| args.iter().filter_map(|arg| arg.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        Some(Self {
            message: error.message.clone(),
            exit_code: i32::try_from(exit_code).unwrap_or(i32::MAX),
            command,
            stdout: text("stdout"),
            stderr: text("stderr"),
        })
    }
}

impl QueryError {
    /// Turns the `errors` of a response into the most specific error.
    pub fn from_graphql_errors(errors: Vec<GraphqlError>) -> Self {
        match errors.iter().find_map(RemoteExecError::from_graphql) {
            Some(exec) => QueryError::RemoteExec(exec),
            None => QueryError::Graphql(GraphqlErrors(errors)),
        }
    }

    pub fn as_remote_exec(&self) -> Option<&RemoteExecError> {
        match self {
            QueryError::RemoteExec(error) => Some(error),
            QueryError::LazyArgument { source, .. } => source.as_remote_exec(),
            _ => None,
        }
    }
}
