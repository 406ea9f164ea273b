use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("`{path}` is not a valid crate path")]
    InvalidCratePath { path: String },
    #[error("{location} has the type {type_ref}, which generated clients cannot express")]
    UnsupportedType { location: String, type_ref: String },
    #[error("could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum FormatError {
    #[error(transparent)]
    Shell(#[from] xshell::Error),
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}
