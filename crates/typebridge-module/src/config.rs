use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::EntrypointError;

pub const CONFIG_FILE: &str = "typebridge.toml";

/// Directory holding the module's `typebridge.toml`, the working directory when unset.
pub const MODULE_ROOT_ENV: &str = "TYPEBRIDGE_MODULE_ROOT";

/// The `[module]` table of `typebridge.toml`. Other tables are left to the tools reading them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub name: String,
    /// Overrides the crate-level documentation of the sources.
    #[serde(default)]
    pub description: Option<String>,
    /// Source directory, relative to the configuration file.
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// A saved introspection response used instead of querying the engine.
    #[serde(default)]
    pub introspection: Option<PathBuf>,
}

fn default_source() -> PathBuf {
    PathBuf::from("src")
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    module: ModuleConfig,
}

impl ModuleConfig {
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, EntrypointError> {
        toml::from_str::<ConfigFile>(text)
            .map(|file| file.module)
            .map_err(|source| EntrypointError::ModuleConfig {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Reads `typebridge.toml` from `root`.
    pub fn load(root: &Path) -> Result<Self, EntrypointError> {
        let path = root.join(CONFIG_FILE);
        let text = std::fs::read_to_string(&path).map_err(|source| EntrypointError::Io {
            path: path.clone(),
            source,
        })?;

        Self::from_toml(&path, &text)
    }

    /// Paths in the configuration are relative to `root`.
    #[must_use]
    pub fn resolve_paths(mut self, root: &Path) -> Self {
        self.source = root.join(&self.source);
        self.introspection = self.introspection.map(|path| root.join(path));
        self
    }
}
