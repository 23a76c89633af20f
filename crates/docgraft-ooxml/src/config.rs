//! Transplant configuration
//!
//! Settings are read from a `docgraft.toml` file. Every field has a default,
//! so an empty file (or no file) is a valid configuration.
//!
//! ```toml
//! [transplant]
//! header = true
//! footer = true
//! numbering = "replace"
//! page_fields = true
//!
//! [output]
//! suffix = "_formatted"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::numbering::NumberingPolicy;

/// Default configuration file name
pub const CONFIG_FILE: &str = "docgraft.toml";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// What the engine transfers
    pub transplant: TransplantOptions,
    /// How results are named
    pub output: OutputSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Engine options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransplantOptions {
    /// Rebuild the first section's header
    pub header: bool,
    /// Rebuild the first section's footer
    pub footer: bool,
    /// What to do with a numbering element already on the target
    pub numbering: NumberingPolicy,
    /// Synthesize `PAGE` fields in rebuilt headers and footers
    pub page_fields: bool,
}

impl Default for TransplantOptions {
    fn default() -> Self {
        Self {
            header: true,
            footer: true,
            numbering: NumberingPolicy::Replace,
            page_fields: true,
        }
    }
}

/// Output naming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Appended to each target's file stem
    pub suffix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            suffix: "_formatted".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OoxmlError;

    #[test]
    fn test_empty_config_is_default() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.transplant.header);
        assert_eq!(settings.transplant.numbering, NumberingPolicy::Replace);
        assert_eq!(settings.output.suffix, "_formatted");
    }

    #[test]
    fn test_partial_config() {
        let settings = Settings::from_toml_str(
            r#"
[transplant]
footer = false
numbering = "append"
"#,
        )
        .unwrap();

        assert!(settings.transplant.header);
        assert!(!settings.transplant.footer);
        assert_eq!(settings.transplant.numbering, NumberingPolicy::Append);
        assert!(settings.transplant.page_fields);
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let result = Settings::from_toml_str("[transplant]\nnumbering = \"merge\"\n");
        assert!(matches!(result, Err(OoxmlError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[output]\nsuffix = \"-styled\"\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.output.suffix, "-styled");
    }
}
