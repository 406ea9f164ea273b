//! Derives a [`TypeModel`] from Rust sources annotated with the typebridge markers.
//!
//! Files are parsed in parallel, then the declarations are resolved together: a type used in
//! one file may be declared in another. Any error aborts the whole scan.

mod attrs;
mod collect;
mod error;
mod native_type;
mod resolve;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::instrument;
use typebridge_model::TypeModel;

pub use error::ScanError;

/// A Rust source file.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub text: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Crate roots carry the module description in their `//!` comments.
    pub fn is_root(&self) -> bool {
        matches!(
            self.path.file_name().and_then(|name| name.to_str()),
            Some("lib.rs" | "main.rs")
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub module_name: String,
    /// Catalog of the remote engine, used to resolve the remote types sources refer to.
    pub remote: Option<TypeModel>,
}

impl ScanOptions {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            remote: None,
        }
    }

    #[must_use]
    pub fn with_remote(mut self, remote: TypeModel) -> Self {
        self.remote = Some(remote);
        self
    }
}

#[instrument(skip_all, fields(module = %options.module_name, files = units.len()))]
pub fn scan(units: &[SourceUnit], options: &ScanOptions) -> Result<TypeModel, ScanError> {
    let files = units
        .par_iter()
        .map(collect::collect)
        .collect::<Result<Vec<_>, _>>()?;

    let model = resolve::resolve(&files, options)?;

    tracing::debug!(
        objects = model.objects.len(),
        interfaces = model.interfaces.len(),
        enums = model.enums.len(),
        "scanned module"
    );

    Ok(model)
}

/// Reads every `.rs` file below `root`, in path order, skipping `target` directories.
pub fn read_sources(root: &Path) -> Result<Vec<SourceUnit>, ScanError> {
    let mut units = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "target");

    for entry in walker {
        let entry = entry.map_err(|error| ScanError::Io {
            path: error.path().unwrap_or(root).to_path_buf(),
            source: error.into(),
        })?;

        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|extension| extension.to_str()) != Some("rs") {
            continue;
        }

        let text = std::fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        units.push(SourceUnit::new(path, text));
    }

    Ok(units)
}

/// Reads and scans the sources below `root`.
pub fn scan_dir(root: &Path, options: &ScanOptions) -> Result<TypeModel, ScanError> {
    let units = read_sources(root)?;
    scan(&units, options)
}
