//! Configuration for the conjure CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "conjure.yml";

/// Compiler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// IR output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Source discovery configuration
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl CompilerConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse configuration")
    }

    /// Load `path`, or `conjure.yml` if present when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid configuration in {:?}", path))
    }
}

/// IR output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print the IR JSON
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Output file; stdout when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            path: None,
        }
    }
}

/// Source discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Extensions picked up when a directory is given as input
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Load imported files that are not themselves inputs
    #[serde(default = "default_true")]
    pub follow_imports: bool,
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["yml".to_string(), "yaml".to_string()]
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            follow_imports: true,
        }
    }
}

impl SourcesConfig {
    /// Whether `path` has one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert!(config.output.pretty);
        assert!(config.output.path.is_none());
        assert_eq!(config.sources.extensions, vec!["yml", "yaml"]);
        assert!(config.sources.follow_imports);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = CompilerConfig::from_yaml(
            r#"
output:
  pretty: false
"#,
        )
        .unwrap();
        assert!(!config.output.pretty);
        assert!(config.sources.follow_imports);
        assert_eq!(config.sources.extensions, vec!["yml", "yaml"]);
    }

    #[test]
    fn test_accepts_configured_extensions() {
        let config = SourcesConfig::default();
        assert!(config.accepts(Path::new("api/widgets.yml")));
        assert!(config.accepts(Path::new("api/widgets.YAML")));
        assert!(!config.accepts(Path::new("api/widgets.json")));
        assert!(!config.accepts(Path::new("api/README")));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "sources:\n  extensions: [conjure]\n  follow_imports: false\n\
             output:\n  path: out/ir.json"
        )
        .unwrap();

        let config = CompilerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.sources.extensions, vec!["conjure"]);
        assert!(!config.sources.follow_imports);
        assert_eq!(config.output.path, Some(PathBuf::from("out/ir.json")));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CompilerConfig::load(Some(&dir.path().join("absent.yml"))).is_err());
    }
}
