//! Core types and engines for the `EcoFind` admin console
//!
//! - [`listing`]: search, filter, sort and page a fetched collection
//! - [`pager`]: numbered page-control windowing
//! - [`dialog`]: the scripted lead-collection chatbot
//! - [`loader`], [`list_page`]: cancellable loading into a page-level holder
//! - [`session`]: the persisted administrator session
//! - [`stats`]: dashboard counters and activity feed

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

pub mod config;
pub mod dialog;
pub mod error;
pub mod list_page;
pub mod listing;
pub mod loader;
pub mod pager;
pub mod presets;
pub mod session;
pub mod stats;
pub mod types;

/// Context-carrying errors for binaries and glue code
pub mod context_error {
    use std::{error::Error as StdError, fmt};

    /// An error message with an optional underlying cause
    #[derive(Debug)]
    pub struct ContextError {
        message: String,
        source: Option<Box<dyn StdError + Send + Sync>>,
    }

    impl ContextError {
        /// Error carrying only a message
        pub fn msg(message: impl Into<String>) -> Self {
            Self {
                message: message.into(),
                source: None,
            }
        }

        /// Wrap `source` under `message`
        pub fn wrap<E>(source: E, message: impl Into<String>) -> Self
        where
            E: StdError + Send + Sync + 'static,
        {
            Self {
                message: message.into(),
                source: Some(Box::new(source)),
            }
        }
    }

    impl fmt::Display for ContextError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match &self.source {
                Some(source) => write!(f, "{}: {source}", self.message),
                None => f.write_str(&self.message),
            }
        }
    }

    impl StdError for ContextError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source
                .as_deref()
                .map(|e| e as &(dyn StdError + 'static))
        }
    }

    /// Result type alias for context errors
    pub type Result<T> = std::result::Result<T, ContextError>;

    /// Build a [`ContextError`] from a format string
    #[macro_export]
    macro_rules! context_error {
        ($msg:literal $(,)?) => {
            $crate::context_error::ContextError::msg(format!($msg))
        };
        ($fmt:expr, $($arg:tt)*) => {
            $crate::context_error::ContextError::msg(format!($fmt, $($arg)*))
        };
    }

    /// Attach context to fallible results
    pub trait ResultExt<T> {
        /// Wrap the error under a fixed message
        fn context(self, message: &str) -> Result<T>;

        /// Wrap the error under a lazily built message
        fn with_context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>;
    }

    impl<T, E> ResultExt<T> for std::result::Result<T, E>
    where
        E: StdError + Send + Sync + 'static,
    {
        fn context(self, message: &str) -> Result<T> {
            self.map_err(|e| ContextError::wrap(e, message))
        }

        fn with_context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>,
        {
            self.map_err(|e| ContextError::wrap(e, f()))
        }
    }

    impl From<crate::Error> for ContextError {
        fn from(err: crate::Error) -> Self {
            Self::wrap(err, "console error")
        }
    }

    impl From<std::io::Error> for ContextError {
        fn from(err: std::io::Error) -> Self {
            Self::wrap(err, "I/O operation failed")
        }
    }

    #[cfg(test)]
    #[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
    mod tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_context_wraps_source() {
            let parsed: std::result::Result<u16, _> = "port".parse::<u16>();
            let err = parsed.context("invalid --port").unwrap_err();

            assert!(err.to_string().starts_with("invalid --port: "));
            assert!(StdError::source(&err).is_some());
        }

        #[test]
        fn test_macro_formats() {
            let port = 8080;
            let err = crate::context_error!("port {} unavailable", port);
            assert_eq!(err.to_string(), "port 8080 unavailable");
            assert!(StdError::source(&err).is_none());
        }
    }
}

pub use config::Config;
pub use dialog::{DialogEngine, LeadSink, SubmissionOutcome};
pub use error::{Error, Result};
pub use listing::{process, FilterState, ListConfig, PageResult, Record};
pub use session::{Session, SessionStore};
pub use types::{Lead, Product, Role, User};

/// Initialize the logging system
///
/// `RUST_LOG` wins over the configured level. The format is JSON unless the
/// configuration asks for `text`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &config::LoggingConfig) -> context_error::Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let json = !config.format.eq_ignore_ascii_case("text");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init()
        .map_err(|e| context_error::ContextError::wrap(e, "failed to install tracing subscriber"))
}
