//! Error types for the match runner binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and match execution.

/// Top-level error for the match runner binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: bakunawa_core::config::ConfigError,
    },

    /// Effect catalog loading failed.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: bakunawa_core::catalog::CatalogError,
    },

    /// Match runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: bakunawa_core::runner::RunnerError,
    },

    /// Snapshot export failed.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: bakunawa_core::snapshot::SnapshotError,
    },
}
