//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check against [`LoaderOptions::max_config_size`]
//! 2. YAML parsing into [`GameConfigFile`]
//! 3. Merge over the built-in defaults
//! 4. Validation (all issues collected)
//! 5. Freeze with `Arc`

use std::path::Path;
use std::sync::Arc;

use crate::config::schema::{GameConfig, GameConfigFile};
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum configuration file size in bytes.
    pub max_config_size: u64,

    /// Treat validation warnings as errors.
    pub strict: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("EMOSPY_MAX_CONFIG_SIZE", 1024 * 1024),
            strict: false,
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<GameConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<ValidationIssue>,
}

/// Configuration loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Loads, merges, and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingFile` if the file does not exist,
    /// `ConfigError::FileTooLarge` if it exceeds the size limit,
    /// `ConfigError::ParseError` on malformed YAML, and
    /// `ConfigError::ValidationError` if validation finds errors (or
    /// warnings, in strict mode).
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        if metadata.len() > self.options.max_config_size {
            return Err(ConfigError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit: self.options.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: None,
            message: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), bytes = raw.len(), "parsing configuration");
        self.load_str(&raw, path)
    }

    /// Parses and validates configuration text. `origin` is used in
    /// error messages only.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file-system errors.
    pub fn load_str(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        // An empty document means "all defaults".
        let file: GameConfigFile = if raw.trim().is_empty() {
            GameConfigFile::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        let config = GameConfig::from_file(file);
        self.finish(config, &origin.display().to_string())
    }

    /// Validates an already-built configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if validation fails.
    pub fn finish(&self, config: GameConfig, origin: &str) -> Result<LoadResult, ConfigError> {
        let result = Validator::new().validate(&config);

        let mut errors = result.errors;
        let mut warnings = result.warnings;
        if self.options.strict {
            errors.append(&mut warnings);
        }

        if !errors.is_empty() {
            return Err(ConfigError::ValidationError {
                path: origin.to_string(),
                errors,
            });
        }

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

fn env_or(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = write_config("");
        let result = ConfigLoader::default().load(file.path()).unwrap();
        assert_eq!(*result.config, GameConfig::default());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn overrides_discussion() {
        let file = write_config("discussion: 2m\n");
        let result = ConfigLoader::default().load(file.path()).unwrap();
        assert_eq!(result.config.discussion, Duration::from_secs(120));
    }

    #[test]
    fn missing_file() {
        let err = ConfigLoader::default()
            .load(Path::new("/definitely/not/here.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn too_large() {
        let file = write_config("discussion: 2m\n");
        let loader = ConfigLoader::new(LoaderOptions {
            max_config_size: 4,
            strict: false,
        });
        let err = loader.load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::FileTooLarge { limit: 4, .. }));
    }

    #[test]
    fn parse_error_reports_line() {
        let file = write_config("discussion: 2m\ncatalog: [unclosed\n");
        let err = ConfigLoader::default().load(file.path()).unwrap_err();
        match err {
            ConfigError::ParseError { line, .. } => assert!(line.is_some()),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn empty_theme_list_fails_validation() {
        let file = write_config("catalog:\n  themes: []\n");
        let err = ConfigLoader::default().load(file.path()).unwrap_err();
        match err {
            ConfigError::ValidationError { errors, .. } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "catalog.themes");
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn strict_promotes_warnings() {
        let yaml = "catalog:\n  contexts:\n    - id: a\n    - id: b\n    - id: c\n";
        let lenient = ConfigLoader::default()
            .load_str(yaml, Path::new("inline"))
            .unwrap();
        assert_eq!(lenient.warnings.len(), 1);

        let strict = ConfigLoader::new(LoaderOptions {
            strict: true,
            ..LoaderOptions::default()
        });
        assert!(matches!(
            strict.load_str(yaml, Path::new("inline")),
            Err(ConfigError::ValidationError { .. })
        ));
    }
}
