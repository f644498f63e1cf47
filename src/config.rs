//! Project metadata that feeds the `cfg_*` substitutions.

use std::path::Path;

use config::{Config, Environment, File};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{DocsError, Result};

/// Environment variable prefix, e.g. `DOCSTYPO3_PROJECT=Guide`.
pub const ENV_PREFIX: &str = "DOCSTYPO3";

/// Project-level configuration values, mirroring the matching entries of a
/// Sphinx `conf.py`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub audience: String,
    pub author: String,
    pub copyright: String,
    pub description: String,
    pub language: String,
    pub license: String,
    pub project: String,
    pub release: String,
    pub version: String,
    /// Fallback author used when `author` is empty.
    pub t3author: String,
}

impl ProjectConfig {
    /// Load the configuration from an optional file, overridden by
    /// `DOCSTYPO3_*` environment variables.
    ///
    /// The file format is picked from its extension (`.toml`, `.yaml`,
    /// `.json`, ...).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(DocsError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
                ));
            }
            debug!("Loading project configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Look up a value by its configuration name (`"author"`, `"release"`, ...).
    pub fn value(&self, name: &str) -> Option<&str> {
        let value = match name {
            "audience" => &self.audience,
            "author" => &self.author,
            "copyright" => &self.copyright,
            "description" => &self.description,
            "language" => &self.language,
            "license" => &self.license,
            "project" => &self.project,
            "release" => &self.release,
            "version" => &self.version,
            "t3author" => &self.t3author,
            _ => return None,
        };
        Some(value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_toml_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "project = \"TYPO3 Explained\"\nauthor = \"TYPO3 Documentation Team\"\nrelease = \"12.4\""
        )
        .unwrap();
        file.flush().unwrap();

        let config = ProjectConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.project, "TYPO3 Explained");
        assert_eq!(config.author, "TYPO3 Documentation Team");
        assert_eq!(config.release, "12.4");
        assert_eq!(config.version, "");
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = ProjectConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, DocsError::Io { .. }));
        assert!(err.to_string().contains("here.toml"));
    }

    #[test]
    fn test_value_lookup() {
        let config = ProjectConfig {
            license: "CC-BY-4.0".to_string(),
            ..Default::default()
        };
        assert_eq!(config.value("license"), Some("CC-BY-4.0"));
        assert_eq!(config.value("audience"), Some(""));
        assert_eq!(config.value("html_theme"), None);
    }
}
