//! Loader configuration.
//!
//! Can be built in code or read from a YAML file:
//!
//! ```yaml
//! include_format: true
//! formats: [json, xml]
//! default_format: json
//! paths:
//!   - config/routes
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// Format negotiation settings applied to every route definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Append `.{_format}` to route paths that do not carry the placeholder.
    pub include_format: bool,
    /// Known formats, joined into the `_format` requirement.
    pub formats: Vec<String>,
    /// Value for the `_format` default.
    pub default_format: Option<String>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            include_format: true,
            formats: Vec::new(),
            default_format: None,
        }
    }
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_format(mut self, include: bool) -> Self {
        self.include_format = include;
        self
    }

    pub fn with_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = Some(format.into());
        self
    }

    /// The `_format` requirement pattern (`json|xml`), if any formats are known.
    pub fn requirement(&self) -> Option<String> {
        if self.formats.is_empty() {
            None
        } else {
            Some(self.formats.join("|"))
        }
    }
}

/// Top-level loader configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Format negotiation settings (flattened into the config file root).
    #[serde(flatten)]
    pub format: FormatOptions,
    /// Extra directories searched for relative resources.
    pub paths: Vec<PathBuf>,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a YAML file.
    ///
    /// Relative search paths are resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self, RouteError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RouteError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::parse(&content, path)?;
        if let Some(base) = path.parent() {
            config.paths = config
                .paths
                .into_iter()
                .map(|p| if p.is_absolute() { p } else { base.join(p) })
                .collect();
        }
        Ok(config)
    }

    /// Parse a config from YAML content. An empty document yields the defaults.
    pub fn parse(content: &str, path: &Path) -> Result<Self, RouteError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            RouteError::ConfigError(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn defaults_include_format() {
        let options = FormatOptions::default();
        assert!(options.include_format);
        assert!(options.formats.is_empty());
        assert!(options.default_format.is_none());
        assert_eq!(options.requirement(), None);
    }

    #[test]
    fn builder_sets_fields() {
        let options = FormatOptions::new()
            .with_include_format(false)
            .with_formats(["json", "xml"])
            .with_default_format("json");
        assert!(!options.include_format);
        assert_eq!(options.requirement(), Some("json|xml".to_string()));
        assert_eq!(options.default_format.as_deref(), Some("json"));
    }

    #[test]
    fn parse_partial_config() {
        let content = r#"
formats: [json, html]
default_format: html
"#;
        let config = LoaderConfig::parse(content, Path::new("restroute.yaml")).unwrap();
        assert!(config.format.include_format);
        assert_eq!(config.format.formats, vec!["json", "html"]);
        assert_eq!(config.format.default_format.as_deref(), Some("html"));
        assert!(config.paths.is_empty());
    }

    #[test]
    fn parse_empty_config() {
        let config = LoaderConfig::parse("   \n", Path::new("restroute.yaml")).unwrap();
        assert_eq!(config, LoaderConfig::default());
    }

    #[test]
    fn parse_invalid_config() {
        let result = LoaderConfig::parse("include_format: [1, 2", Path::new("restroute.yaml"));
        assert!(matches!(result, Err(RouteError::ConfigError(msg)) if msg.contains("restroute.yaml")));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("restroute.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "include_format: false\npaths:\n  - routes\n  - /abs/routes").unwrap();

        let config = LoaderConfig::load(&path).unwrap();
        assert!(!config.format.include_format);
        assert_eq!(config.paths[0], dir.path().join("routes"));
        assert_eq!(config.paths[1], PathBuf::from("/abs/routes"));
    }

    #[test]
    fn load_missing_file() {
        let result = LoaderConfig::load(Path::new("/nonexistent/restroute.yaml"));
        assert!(matches!(result, Err(RouteError::ConfigError(_))));
    }
}
