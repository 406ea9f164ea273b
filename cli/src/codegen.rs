use std::path::Path;

use tracing::instrument;

use crate::{args::CodegenCommand, config::ProjectConfig, introspect};

#[instrument(skip_all)]
pub(crate) async fn codegen(root: &Path, command: CodegenCommand) -> anyhow::Result<()> {
    let ProjectConfig { module, codegen: mut options } = ProjectConfig::load(root)?;

    let saved = command
        .schema
        .or_else(|| module.and_then(|module| module.introspection));
    let model = introspect::remote_schema(saved.as_deref()).await?;

    if let Some(output) = command.output {
        options.output_dir = output;
    }
    if command.no_format {
        options.format = false;
    }

    let files = typebridge_codegen::generate(&model, &options)?;
    typebridge_codegen::write_files(&files, &options.output_dir)?;

    tracing::info!(files = files.len(), "generated the client");
    println!("wrote {} files to {}", files.len(), options.output_dir.display());

    Ok(())
}
