//! Logging initialization.
//!
//! Logs go to stderr; stdout belongs to the game screen. Verbosity only
//! raises the level of this crate's own targets, so `-vv` shows ticks and
//! turn changes without flooding the output with the metrics exporter's
//! internals. `EMOSPY_LOG_LEVEL` replaces the computed filter entirely.
//!
//! Nothing logged before a round resolves names the outsider or the theme.

use std::io::IsTerminal;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::args::ColorChoice;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_LEVEL_ENV: &str = "EMOSPY_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines with session uptime.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Everything the subscriber needs, as parsed from the global flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Number of `-v` flags
    pub verbosity: u8,
    /// `-q`: errors only, regardless of verbosity
    pub quiet: bool,
    pub color: ColorChoice,
}

impl LogSettings {
    /// Filter directive used when `EMOSPY_LOG_LEVEL` is unset.
    ///
    /// Other crates stay at `warn` until `-vvv`.
    #[must_use]
    pub fn directive(&self) -> String {
        if self.quiet {
            return "error".to_string();
        }
        match self.verbosity {
            0 => "warn".to_string(),
            1 => format!("warn,{}=info", env!("CARGO_CRATE_NAME")),
            2 => format!("warn,{}=debug", env!("CARGO_CRATE_NAME")),
            _ => "trace".to_string(),
        }
    }

    /// Whether human output should carry ANSI colors.
    #[must_use]
    pub fn ansi(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
            }
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_env(LOG_LEVEL_ENV).unwrap_or_else(|_| EnvFilter::new(self.directive()))
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(settings: &LogSettings) {
    // Targets only help once module-level detail is on.
    let targets = settings.verbosity >= 2;

    let human = (settings.format == LogFormat::Human).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(fmt::time::uptime())
            .with_ansi(settings.ansi())
            .with_target(targets)
    });
    let json = (settings.format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(targets)
    });

    let _ = tracing_subscriber::registry()
        .with(settings.filter())
        .with(human)
        .with(json)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(verbosity: u8, quiet: bool) -> LogSettings {
        LogSettings {
            verbosity,
            quiet,
            ..LogSettings::default()
        }
    }

    #[test]
    fn verbosity_raises_only_own_targets() {
        assert_eq!(settings(0, false).directive(), "warn");
        assert_eq!(settings(1, false).directive(), "warn,emospy=info");
        assert_eq!(settings(2, false).directive(), "warn,emospy=debug");
        assert_eq!(settings(3, false).directive(), "trace");
        assert_eq!(settings(u8::MAX, false).directive(), "trace");
    }

    #[test]
    fn quiet_wins_over_verbosity() {
        assert_eq!(settings(3, true).directive(), "error");
    }

    #[test]
    fn explicit_color_choice_ignores_terminal() {
        let mut s = LogSettings::default();
        s.color = ColorChoice::Always;
        assert!(s.ansi());
        s.color = ColorChoice::Never;
        assert!(!s.ansi());
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(&settings(0, false));
        init_logging(&LogSettings {
            format: LogFormat::Json,
            ..settings(2, false)
        });
    }
}
