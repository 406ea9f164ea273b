use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use typebridge_codegen::CodegenOptions;
use typebridge_module::{ModuleConfig, CONFIG_FILE};

/// Everything the CLI reads from `typebridge.toml`. Both tables are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ProjectConfig {
    #[serde(default)]
    pub module: Option<ModuleConfig>,
    #[serde(default)]
    pub codegen: CodegenOptions,
}

impl ProjectConfig {
    /// Reads `typebridge.toml` from `root` and makes its paths relative to the working directory.
    pub(crate) fn load(root: &Path) -> anyhow::Result<Self> {
        let path = root.join(CONFIG_FILE);

        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(Self::default().resolve_paths(root));
            }
            Err(error) => return Err(error).with_context(|| format!("could not read {}", path.display())),
        };

        let config = toml::from_str::<Self>(&text).with_context(|| format!("invalid {}", path.display()))?;

        Ok(config.resolve_paths(root))
    }

    pub(crate) fn module(&self) -> anyhow::Result<&ModuleConfig> {
        self.module
            .as_ref()
            .with_context(|| format!("{CONFIG_FILE} has no [module] table"))
    }

    fn resolve_paths(mut self, root: &Path) -> Self {
        self.module = self.module.map(|module| module.resolve_paths(root));
        self.codegen.output_dir = root.join(&self.codegen.output_dir);
        self
    }
}
