use std::{path::PathBuf, str::FromStr};

use proc_macro2::TokenStream;
use serde::Deserialize;

use crate::CodegenError;

/// How generated code refers to the runtime crates and where it lands.
///
/// Read from the `[codegen]` table of `typebridge.toml`; every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodegenOptions {
    /// Path of the query builder crate as seen from the generated module.
    pub client_crate: String,
    /// Path of the codec crate, used for the glue of identity objects.
    pub codec_crate: String,
    pub output_dir: PathBuf,
    /// Run `rustfmt` over every file. Failures leave the file unformatted.
    pub format: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            client_crate: "typebridge_client".to_string(),
            codec_crate: "typebridge_codec".to_string(),
            output_dir: PathBuf::from("src/gen"),
            format: true,
        }
    }
}

impl CodegenOptions {
    pub(crate) fn client_path(&self) -> Result<TokenStream, CodegenError> {
        crate_path(&self.client_crate)
    }

    pub(crate) fn codec_path(&self) -> Result<TokenStream, CodegenError> {
        crate_path(&self.codec_crate)
    }
}

fn crate_path(path: &str) -> Result<TokenStream, CodegenError> {
    let invalid = || CodegenError::InvalidCratePath { path: path.to_string() };

    let valid = !path.is_empty()
        && path
            .trim_start_matches("::")
            .split("::")
            .all(|segment| !segment.is_empty() && segment.chars().all(|ch| ch.is_alphanumeric() || ch == '_'));

    if !valid {
        return Err(invalid());
    }

    TokenStream::from_str(path).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_paths_are_validated() {
        assert_eq!(crate_path("::my_sdk::client").unwrap().to_string(), ":: my_sdk :: client");
        assert!(crate_path("").is_err());
        assert!(crate_path("my sdk").is_err());
        assert!(crate_path("a::::b").is_err());
    }

    #[test]
    fn options_read_from_toml_keep_defaults() {
        let options: CodegenOptions = toml::from_str(r#"client_crate = "sdk::client""#).unwrap();

        assert_eq!(options.client_crate, "sdk::client");
        assert_eq!(options.codec_crate, "typebridge_codec");
        assert!(options.format);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<CodegenOptions>("rustfmt = false").is_err());
    }
}
