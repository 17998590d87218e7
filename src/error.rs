//! Error types for `EmoSpy`
//!
//! Every rejected operation is reported through one of these types; the
//! game engine never degrades silently to a default behavior.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::schema::{ContextId, ThemeId};
use crate::game::state::Phase;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `EmoSpy` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Game engine error (bad roster, illegal intent)
    pub const GAME_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `EmoSpy` operations.
///
/// Aggregates the domain-specific errors and maps each one to an exit code.
#[derive(Debug, Error)]
pub enum EmoSpyError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Game engine error
    #[error(transparent)]
    Game(#[from] GameError),

    /// Invalid command-line usage that clap cannot express
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl EmoSpyError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Game(_) => ExitCode::GAME_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize(errors))]
    ValidationError {
        /// Path (or name) of the validated configuration
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("configuration file {path} is {size} bytes (limit: {limit})")]
    FileTooLarge {
        /// Path to the oversized file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "catalog.themes[2].id")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Game Engine Errors
// ============================================================================

/// Which half of the catalog an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// The emotion list
    Themes,
    /// The situation list
    Contexts,
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Themes => f.write_str("theme"),
            Self::Contexts => f.write_str("context"),
        }
    }
}

/// Phase state machine errors.
///
/// A call that returns one of these has left the machine exactly as it
/// was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Player count outside the supported range
    #[error("invalid player count {count}: a round needs {min} to {max} players")]
    InvalidPlayerCount {
        /// Number of players supplied
        count: usize,
        /// Smallest supported table
        min: usize,
        /// Largest supported table
        max: usize,
    },

    /// The roster supplies a different number of names than it declares
    #[error("invalid player count: {declared} players declared but {supplied} names supplied")]
    MissingPlayerNames {
        /// Declared table size
        declared: usize,
        /// Names actually supplied
        supplied: usize,
    },

    /// Operation invoked outside the phase it belongs to
    #[error("illegal phase transition: cannot {operation} during {phase}")]
    IllegalPhaseTransition {
        /// The rejected intent
        operation: &'static str,
        /// The phase the machine was in
        phase: Phase,
    },

    /// Theme or context list has no entries
    #[error("{kind} catalog is empty")]
    EmptyCatalog {
        /// Which list is empty
        kind: CatalogKind,
    },

    /// Not enough distinct contexts for every player
    #[error("context catalog has {available} entries but {needed} players need distinct contexts")]
    InsufficientContexts {
        /// Contexts required (the player count)
        needed: usize,
        /// Contexts available in the catalog
        available: usize,
    },

    /// Two context entries share an id, so players could be dealt the
    /// same situation
    #[error("duplicate context id '{id}' in catalog")]
    DuplicateContext {
        /// The repeated id
        id: ContextId,
    },

    /// Guess names a theme that is not in the round's catalog
    #[error("unknown theme '{id}'")]
    UnknownTheme {
        /// The rejected guess
        id: ThemeId,
    },
}

impl GameError {
    /// Returns `true` for the invalid-player-count category.
    #[must_use]
    pub const fn is_invalid_player_count(&self) -> bool {
        matches!(
            self,
            Self::InvalidPlayerCount { .. } | Self::MissingPlayerNames { .. }
        )
    }

    /// Returns `true` for the illegal-phase-transition category.
    #[must_use]
    pub const fn is_illegal_transition(&self) -> bool {
        matches!(self, Self::IllegalPhaseTransition { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_per_variant() {
        let game = EmoSpyError::from(GameError::EmptyCatalog {
            kind: CatalogKind::Themes,
        });
        assert_eq!(game.exit_code(), ExitCode::GAME_ERROR);

        let io = EmoSpyError::from(std::io::Error::other("boom"));
        assert_eq!(io.exit_code(), ExitCode::IO_ERROR);

        let usage = EmoSpyError::Usage("bad".to_string());
        assert_eq!(usage.exit_code(), ExitCode::USAGE_ERROR);

        let config = EmoSpyError::from(ConfigError::MissingFile {
            path: PathBuf::from("game.yaml"),
        });
        assert_eq!(config.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn illegal_transition_message_names_phase() {
        let err = GameError::IllegalPhaseTransition {
            operation: "submit a guess",
            phase: Phase::Discussion,
        };
        assert_eq!(
            err.to_string(),
            "illegal phase transition: cannot submit a guess during discussion"
        );
        assert!(err.is_illegal_transition());
        assert!(!err.is_invalid_player_count());
    }

    #[test]
    fn missing_names_is_player_count_category() {
        let err = GameError::MissingPlayerNames {
            declared: 4,
            supplied: 3,
        };
        assert!(err.is_invalid_player_count());
    }

    #[test]
    fn validation_error_lists_issues() {
        let err = ConfigError::ValidationError {
            path: "game.yaml".to_string(),
            errors: vec![ValidationIssue {
                path: "catalog.themes".to_string(),
                message: "theme list is empty".to_string(),
                severity: Severity::Error,
            }],
        };
        let msg = err.to_string();
        assert!(msg.contains("game.yaml"));
        assert!(msg.contains("error: theme list is empty at catalog.themes"));
    }
}
