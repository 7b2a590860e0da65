//! Tracing subscriber configuration.
//!
//! The engine itself only emits `tracing` events. Hosts (and the demo binary)
//! decide where those events go by building a [`TracingSetup`] and calling
//! [`TracingSetup::init`] once at start-up.
//!
//! # Example
//!
//! ```
//! use storehouse_core::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("storehouse_aggregate=trace")
//!     .init();
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingSetup
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for the global `tracing` subscriber.
///
/// # Environment Filter
///
/// Use `with_env_filter` to set target-specific log levels:
///
/// ```
/// use storehouse_core::TracingSetup;
///
/// TracingSetup::default()
///     .with_env_filter("storehouse_aggregate=debug,storehouse_world=warn")
/// # ;
/// ```
#[derive(Debug, Clone)]
pub struct TracingSetup {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Environment filter (e.g., `"storehouse_aggregate=debug"`).
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// Creates a new `TracingSetup` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`. An unparsable filter falls
    /// back to the configured level.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the configured maximum level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the configured output format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    /// Installs the global subscriber.
    ///
    /// Returns `false` if a subscriber was already installed; the existing
    /// one is kept.
    pub fn init(&self) -> bool {
        let env_filter = match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        };

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let installed = match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
            TracingFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init()
                .is_ok(),
        };

        if installed {
            tracing::info!(
                level = %self.level,
                format = ?self.format,
                "tracing initialized"
            );
        }

        installed
    }
}
