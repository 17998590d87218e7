//! Catalog command handlers
//!
//! Implements `catalog validate` and `catalog show`.

use serde::Serialize;

use crate::cli::args::{CatalogShowArgs, CatalogValidateArgs, OutputFormat};
use crate::config::loader::{ConfigLoader, LoaderOptions};
use crate::config::schema::Catalog;
use crate::error::{ConfigError, EmoSpyError, Severity, ValidationIssue};
use crate::game::state::format_clock;

use super::play::load_config;

/// Validation report for one file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Validate configuration files.
///
/// Every file is checked and reported before returning.
///
/// # Errors
///
/// Returns the first file's config error if any file fails validation.
pub fn validate(args: &CatalogValidateArgs) -> Result<(), EmoSpyError> {
    let loader = ConfigLoader::new(LoaderOptions {
        strict: args.strict,
        ..LoaderOptions::default()
    });

    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_error: Option<ConfigError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let file = path.display().to_string();
        let report = match loader.load(path) {
            Ok(result) => FileReport {
                file,
                valid: true,
                errors: Vec::new(),
                warnings: messages(&result.warnings),
            },
            Err(err) => {
                let (errors, warnings) = match &err {
                    ConfigError::ValidationError { errors, .. } => split(errors),
                    other => (vec![other.to_string()], Vec::new()),
                };
                if first_error.is_none() {
                    first_error = Some(err);
                }
                FileReport {
                    file,
                    valid: false,
                    errors,
                    warnings,
                }
            }
        };
        reports.push(report);
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                let mark = if report.valid { "ok" } else { "FAILED" };
                println!("{}: {mark}", report.file);
                for error in &report.errors {
                    println!("  {error}");
                }
                for warning in &report.warnings {
                    println!("  {warning}");
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    first_error.map_or(Ok(()), |err| Err(err.into()))
}

/// Print the effective catalog.
///
/// # Errors
///
/// Returns a config error if the configuration cannot be loaded.
pub fn show(args: &CatalogShowArgs) -> Result<(), EmoSpyError> {
    let config = load_config(args.config.as_deref(), None)?;

    match args.format {
        OutputFormat::Human => print!("{}", render(&config.catalog, config.discussion_seconds())),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct Effective<'a> {
                discussion_seconds: u64,
                catalog: &'a Catalog,
            }
            let effective = Effective {
                discussion_seconds: config.discussion_seconds(),
                catalog: &config.catalog,
            };
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
    }
    Ok(())
}

fn render(catalog: &Catalog, discussion_seconds: u64) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(out, "Discussion: {}", format_clock(discussion_seconds));

    let _ = writeln!(out, "\nThemes ({}):", catalog.themes.len());
    for theme in &catalog.themes {
        let _ = writeln!(out, "  {:<20} {}", theme.id, theme.label());
    }

    let _ = writeln!(out, "\nContexts ({}):", catalog.contexts.len());
    for context in &catalog.contexts {
        let _ = writeln!(out, "  {:<20} {}", context.id, context.label());
    }

    if !catalog.prompts.is_empty() {
        let _ = writeln!(out, "\nDiscussion prompts:");
        for prompt in &catalog.prompts {
            let _ = writeln!(out, "  - {prompt}");
        }
    }
    if let Some(review) = &catalog.review_prompt {
        let _ = writeln!(out, "\nSelf-review: \"{review}\"");
    }
    out
}

fn messages(issues: &[ValidationIssue]) -> Vec<String> {
    issues.iter().map(ToString::to_string).collect()
}

fn split(issues: &[ValidationIssue]) -> (Vec<String>, Vec<String>) {
    let (errors, warnings): (Vec<_>, Vec<_>) = issues
        .iter()
        .partition(|issue| issue.severity == Severity::Error);
    (
        errors.iter().map(ToString::to_string).collect(),
        warnings.iter().map(ToString::to_string).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn validate_args(files: Vec<std::path::PathBuf>, strict: bool) -> CatalogValidateArgs {
        CatalogValidateArgs {
            files,
            format: OutputFormat::Json,
            strict,
        }
    }

    #[test]
    fn valid_file_passes() {
        let file = write_config("discussion: 2m\n");
        assert!(validate(&validate_args(vec![file.path().to_path_buf()], false)).is_ok());
    }

    #[test]
    fn invalid_file_fails_with_config_error() {
        let good = write_config("");
        let bad = write_config("catalog:\n  themes: []\n");
        let err = validate(&validate_args(
            vec![good.path().to_path_buf(), bad.path().to_path_buf()],
            false,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            EmoSpyError::Config(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn missing_file_reported() {
        let err = validate(&validate_args(
            vec![std::path::PathBuf::from("/nonexistent/game.yaml")],
            false,
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            EmoSpyError::Config(ConfigError::MissingFile { .. })
        ));
    }

    #[test]
    fn strict_promotes_warnings() {
        // Two hours of discussion is only a warning.
        let file = write_config("discussion: 2h\n");
        let path = file.path().to_path_buf();
        assert!(validate(&validate_args(vec![path.clone()], false)).is_ok());
        assert!(validate(&validate_args(vec![path], true)).is_err());
    }

    #[test]
    fn render_lists_builtin_catalog() {
        let text = render(&Catalog::default(), 420);
        assert!(text.starts_with("Discussion: 7:00"));
        assert!(text.contains("Themes (6):"));
        assert!(text.contains("Contexts (11):"));
        assert!(text.contains("Scared"));
    }

    #[test]
    fn split_separates_severities() {
        let issues = vec![
            ValidationIssue {
                path: "a".into(),
                message: "bad".into(),
                severity: Severity::Error,
            },
            ValidationIssue {
                path: "b".into(),
                message: "meh".into(),
                severity: Severity::Warning,
            },
        ];
        let (errors, warnings) = split(&issues);
        assert_eq!(errors, ["error: bad at a"]);
        assert_eq!(warnings, ["warning: meh at b"]);
    }
}
