//! Core types and utilities for the NexusCouncil CMS admin client

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod summary;
pub mod time;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, Config, LoggingConfig, SessionConfig, StoreBackend};
pub use error::{Error, Result};
pub use summary::{CollectionSummary, collection_records};
pub use time::{Clock, FixedClock, SystemClock, extract_updated_label, format_relative};
pub use types::{BgType, Hero, ResourceKind, Session, TokenKind};

/// Initialize the logging system
///
/// `RUST_LOG` overrides the configured level; `format = "json"` selects
/// structured output, anything else the pretty formatter.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| Error::configuration(format!("Failed to initialize logging: {e}")))
}
