use typebridge_client::QueryError;

/// Why a module could not be registered. Nothing is registered when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{location} refers to the unknown type `{name}`")]
    UnknownType { name: String, location: String },
    #[error("{location} uses the input object `{name}`, which cannot be declared by a module")]
    UnsupportedType { name: String, location: String },
    #[error("{kind} `{name}` is declared more than once in {scope}")]
    Duplicate {
        kind: &'static str,
        name: String,
        scope: String,
    },
    #[error("default value {value} of {location} is not a member of enum {enum_name}")]
    InvalidEnumDefault {
        location: String,
        value: String,
        enum_name: String,
    },
    #[error("default value of {location} cannot be sent: {reason}")]
    InvalidDefault { location: String, reason: String },
    #[error("{declaration} is not attached to any {expected}")]
    Misplaced {
        declaration: String,
        expected: &'static str,
    },
    #[error("could not register the module: {0}")]
    Commit(#[from] QueryError),
}
