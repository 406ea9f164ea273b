use std::{fmt::Write as _, path::Path};

use anyhow::Context;
use tracing::instrument;
use typebridge_model::{FunctionDef, TypeModel};
use typebridge_scanner::ScanOptions;

use crate::{args::ScanCommand, config::ProjectConfig, introspect};

#[instrument(skip_all)]
pub(crate) async fn scan(root: &Path, command: ScanCommand) -> anyhow::Result<()> {
    let config = ProjectConfig::load(root)?;
    let module = config.module()?;

    let mut options = ScanOptions::new(&module.name);
    if let Some(saved) = &module.introspection {
        options = options.with_remote(introspect::remote_schema(Some(saved)).await?);
    }

    let mut model = typebridge_scanner::scan_dir(&module.source, &options)?;
    if let Some(description) = &module.description {
        model.description = Some(description.clone());
    }

    if !command.json {
        print!("{}", summary(&model));
        return Ok(());
    }

    let json = serde_json::to_string_pretty(&model)?;

    match command.output {
        Some(path) => std::fs::write(&path, json).with_context(|| format!("could not write {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}

/// One line per exposed type and function.
fn summary(model: &TypeModel) -> String {
    let mut out = format!("module {}\n", model.name);

    for object in model.objects.values() {
        let _ = writeln!(out, "\nobject {}", object.name);

        if let Some(constructor) = &object.constructor {
            let _ = writeln!(out, "  constructor{}", signature(constructor));
        }
        for field in object.fields.values().filter(|field| field.exposed) {
            let _ = writeln!(out, "  field {}: {}{}", field.name, field.type_ref, nullable(field.optional));
        }
        for function in object.functions.values() {
            let _ = writeln!(out, "  fn {}{}", function.name, signature(function));
        }
    }

    for interface in model.interfaces.values() {
        let _ = writeln!(out, "\ninterface {}", interface.name);
        for function in interface.functions.values() {
            let _ = writeln!(out, "  fn {}{}", function.name, signature(function));
        }
    }

    for enumeration in model.enums.values() {
        let values = enumeration
            .values
            .iter()
            .map(|value| value.api_name.as_str())
            .collect::<Vec<_>>();
        let _ = writeln!(out, "\nenum {} {{ {} }}", enumeration.name, values.join(", "));
    }

    out
}

fn signature(function: &FunctionDef) -> String {
    let arguments = function
        .arguments
        .iter()
        .map(|argument| format!("{}: {}{}", argument.name, argument.type_ref, nullable(argument.optional)))
        .collect::<Vec<_>>();

    format!(
        "({}) -> {}{}",
        arguments.join(", "),
        function.return_type,
        nullable(function.return_optional)
    )
}

fn nullable(optional: bool) -> &'static str {
    if optional {
        "?"
    } else {
        ""
    }
}
