use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid declaration in {}: {message}", path.display())]
    InvalidAttribute { path: PathBuf, message: String },
    #[error("unsupported type `{ty}` in {location}: {reason}")]
    UnsupportedType {
        ty: String,
        location: String,
        reason: &'static str,
    },
    #[error("`{name}` is used in {location} but is not exposed, mark its declaration with #[object], #[interface] or #[enumeration]")]
    AmbiguousExposure { name: String, location: String },
    #[error("object {object} declares more than one constructor")]
    MultipleConstructors { object: String },
    #[error("{kind} `{name}` is declared more than once in {scope}")]
    Duplicate {
        kind: &'static str,
        name: String,
        scope: String,
    },
    #[error("argument `{argument}` of {location} has a contextual path but its type is {type_name}, only Directory and File are supported")]
    InvalidContextualPath {
        argument: String,
        location: String,
        type_name: String,
    },
    #[error("argument `{argument}` of {location} cannot have both a default value and a contextual path")]
    ConflictingDefaults { argument: String, location: String },
    #[error("enum {name} maps more than one member to `{value}`")]
    EnumBijection { name: String, value: String },
    #[error("invalid cache policy on {location}: {source}")]
    CachePolicy {
        location: String,
        #[source]
        source: typebridge_model::CachePolicyParseError,
    },
}
