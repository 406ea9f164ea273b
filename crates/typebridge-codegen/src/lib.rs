//! Generates a lazy Rust client from a remote schema.
//!
//! Every object becomes a proxy holding an immutable query selection. Methods returning objects
//! only extend the selection; methods returning scalars send the query and decode the answer.

mod context;
mod error;
mod formatter;
mod generation;
mod idents;
mod options;

use std::{fs, path::Path};

use tracing::instrument;
use typebridge_model::TypeModel;

pub use error::CodegenError;
pub use options::CodegenOptions;

use crate::{context::Context, formatter::Formatter};

const HEADER: &str = "// Generated by typebridge from the remote schema. Do not edit by hand.\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory.
    pub name: String,
    pub contents: String,
}

#[instrument(skip_all, fields(objects = model.objects.len(), enums = model.enums.len()))]
pub fn generate(model: &TypeModel, options: &CodegenOptions) -> Result<Vec<GeneratedFile>, CodegenError> {
    let context = Context {
        model,
        client: options.client_path()?,
        codec: options.codec_path()?,
    };

    let files = generation::generate_files(&context)?;

    let formatter = if options.format {
        Formatter::new()
            .inspect_err(|error| tracing::warn!(%error, "rustfmt is unavailable, files are left unformatted"))
            .ok()
    } else {
        None
    };

    let files = files
        .into_iter()
        .map(|(module, tokens)| {
            let name = format!("{module}.rs");
            let code = tokens.to_string();

            let code = match formatter.as_ref().map(|formatter| formatter.format(&code)) {
                Some(Ok(formatted)) => formatted,
                Some(Err(error)) => {
                    tracing::warn!(file = name.as_str(), %error, "could not format generated file");
                    code
                }
                None => code,
            };

            GeneratedFile {
                name,
                contents: format!("{HEADER}{code}"),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(files = files.len(), "generated client");
    Ok(files)
}

/// Writes the files into `dir`, creating it when missing.
#[instrument(skip(files))]
pub fn write_files(files: &[GeneratedFile], dir: &Path) -> Result<(), CodegenError> {
    let io = |path: &Path| {
        let path = path.to_path_buf();
        move |source| CodegenError::Io { path, source }
    };

    fs::create_dir_all(dir).map_err(io(dir))?;

    for file in files {
        let path = dir.join(&file.name);
        fs::write(&path, &file.contents).map_err(io(&path))?;
        tracing::debug!(path = %path.display(), "wrote generated file");
    }

    Ok(())
}
