use typebridge_client::QueryError;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("'{value}' is not a member of enum {enum_name}")]
    UnknownEnumValue { enum_name: String, value: String },
    #[error("cannot decode a value of type {type_name}: it is neither a module object nor an object with an ID")]
    UnsupportedDecode { type_name: String },
    #[error("expected {expected}, found {found}")]
    Marshalling { expected: String, found: String },
    #[error("missing required argument `{name}`")]
    MissingArgument { name: String },
    #[error("type {0} is not defined")]
    UnknownType(String),
    #[error("contextual paths are only supported for Directory and File arguments, not {type_name}")]
    InvalidContextualPath { type_name: String },
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl CodecError {
    pub fn marshalling(expected: impl ToString, found: impl ToString) -> Self {
        CodecError::Marshalling {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
