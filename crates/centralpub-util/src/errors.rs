use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all centralpub operations.
#[derive(Debug, Error, Diagnostic)]
pub enum PublishError {
    /// Local I/O operation failed (checksums, staging, archive writing).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed configuration (Central.toml, global config, CLI flags).
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your Central.toml for syntax errors"))]
    Config { message: String },

    /// Bundle assembly failed.
    #[error("Bundle error: {message}")]
    Bundle { message: String },

    /// Files could not be sent to a remote repository.
    #[error("Network error: {message}")]
    #[diagnostic(help("Check the repository URL and your credentials"))]
    Network { message: String },

    /// The publishing service reported the deployment as failed.
    #[error("Deployment {deployment_id} failed:\n{summary}")]
    #[diagnostic(help("Fix the reported problems and publish a new deployment"))]
    Deployment {
        deployment_id: String,
        summary: String,
    },

    /// The operation was cancelled before reaching a terminal state.
    #[error("Operation cancelled")]
    Cancelled,

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
