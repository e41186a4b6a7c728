//! Logging setup for Reel hosts.
//!
//! Plugin loading and instantiation emit structured `tracing` events
//! (`reference`, `target`, `plugin`, `mount` fields).  This module installs a
//! `tracing-subscriber` pipeline for them, either from [`LoggingConfig`] or
//! through [`LoggingBuilder`].
//!
//! ```rust,ignore
//! use reel_runtime::config::load_config;
//! use reel_runtime::logging;
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```
//!
//! ```rust,ignore
//! use reel_runtime::logging::{LoggingBuilder, SpanEvents};
//!
//! LoggingBuilder::new()
//!     .directive("reel_framework=debug")
//!     .span_events(SpanEvents::LIFECYCLE)
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

/// Which span lifecycle events are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanEvents {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEvents {
    /// No span events.
    pub const NONE: Self = Self {
        new: false,
        enter: false,
        exit: false,
        close: false,
    };

    /// Span creation and close only.
    pub const LIFECYCLE: Self = Self {
        new: true,
        enter: false,
        exit: false,
        close: true,
    };

    /// Every span event.
    pub const FULL: Self = Self {
        new: true,
        enter: true,
        exit: true,
        close: true,
    };

    fn to_fmt_span(self) -> fmt::format::FmtSpan {
        let mut span = fmt::format::FmtSpan::NONE;
        if self.new {
            span |= fmt::format::FmtSpan::NEW;
        }
        if self.enter {
            span |= fmt::format::FmtSpan::ENTER;
        }
        if self.exit {
            span |= fmt::format::FmtSpan::EXIT;
        }
        if self.close {
            span |= fmt::format::FmtSpan::CLOSE;
        }
        span
    }
}

impl From<&SpanEventConfig> for SpanEvents {
    fn from(config: &SpanEventConfig) -> Self {
        Self {
            new: config.new,
            enter: config.enter,
            exit: config.exit,
            close: config.close,
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

// =============================================================================
// LoggingBuilder
// =============================================================================

/// Builder for the global `tracing` subscriber.
#[derive(Debug, Default)]
pub struct LoggingBuilder {
    directives: Vec<String>,
    level: Option<tracing::Level>,
    span_events: SpanEvents,
    format: LogFormat,
    output: LogOutput,
    with_target: bool,
    with_thread_ids: bool,
    with_file: bool,
    with_line_number: bool,
    file_path: Option<PathBuf>,
}

impl LoggingBuilder {
    /// Creates a builder writing compact lines to stdout.
    pub fn new() -> Self {
        Self {
            with_target: true,
            ..Default::default()
        }
    }

    /// Creates a builder from a [`LoggingConfig`].
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut builder = Self::new()
            .with_level(config.level.to_tracing_level())
            .format(config.format)
            .output(config.output)
            .span_events(SpanEvents::from(&config.span_events))
            .with_thread_ids(config.thread_ids)
            .with_file(config.file_location)
            .with_line_number(config.file_location);
        builder.file_path.clone_from(&config.file_path);

        // Sorted so the resulting filter does not depend on map order.
        let mut filters: Vec<_> = config.filters.iter().collect();
        filters.sort_by(|a, b| a.0.cmp(b.0));
        for (module, level) in filters {
            builder.directives.push(format!("{module}={level}"));
        }

        builder
    }

    /// Sets the global level.
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Adds a filter directive such as `reel_framework=trace`.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    pub fn span_events(mut self, events: SpanEvents) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    pub fn with_file(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self
    }

    pub fn with_line_number(mut self, enabled: bool) -> Self {
        self.with_line_number = enabled;
        self
    }

    /// Sets the log file used with [`LogOutput::File`].
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Filter directives in the order they are applied after the base level.
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    /// `RUST_LOG` wins over the configured base level; directives are
    /// layered on top, invalid ones skipped.
    fn build_filter(&self) -> EnvFilter {
        let base_level = self.level.unwrap_or(tracing::Level::INFO);
        let base_filter = base_level.to_string().to_lowercase();

        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&base_filter));

        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(_) => warn!(directive = %directive, "Ignoring invalid log filter directive"),
            }
        }

        filter
    }

    /// Installs the subscriber, ignoring an already-installed one.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let span_events = self.span_events.to_fmt_span();

        #[cfg(not(feature = "json-log"))]
        {
            if self.format == LogFormat::Json {
                warn!("JSON log format requires the `json-log` feature, using compact");
            }
        }

        macro_rules! configure_layer {
            ($layer:expr) => {
                $layer
                    .with_span_events(span_events)
                    .with_target(self.with_target)
                    .with_thread_ids(self.with_thread_ids)
                    .with_file(self.with_file)
                    .with_line_number(self.with_line_number)
            };
        }

        macro_rules! init_with_writer {
            ($writer:expr) => {
                match self.format {
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => {
                        let layer = fmt::layer()
                            .json()
                            .with_span_events(span_events)
                            .with_writer($writer);
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Full => {
                        let layer = configure_layer!(fmt::layer().with_writer($writer));
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Pretty => {
                        let layer = configure_layer!(fmt::layer().pretty().with_writer($writer));
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    _ => {
                        let layer = configure_layer!(fmt::layer().compact().with_writer($writer));
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                }
            };
        }

        match self.output {
            LogOutput::Stdout => init_with_writer!(std::io::stdout),
            LogOutput::Stderr => init_with_writer!(std::io::stderr),
            LogOutput::File => match self.file_path.as_deref() {
                Some(path) => {
                    let appender = tracing_appender::rolling::never(
                        path.parent()
                            .filter(|p| !p.as_os_str().is_empty())
                            .unwrap_or_else(|| Path::new(".")),
                        path.file_name().unwrap_or_else(|| OsStr::new("reel.log")),
                    );
                    init_with_writer!(appender)
                }
                None => {
                    warn!("File output requested but no file path configured, using stdout");
                    init_with_writer!(std::io::stdout)
                }
            },
        }
    }
}
