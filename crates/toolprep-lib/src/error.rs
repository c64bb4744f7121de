use crate::install::InstallFailure;
use crate::verification::VerificationError;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of failures, used to decide how a failure is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Parse,
    Integrity,
    Filesystem,
    Privilege,
    Usage,
    Config,
    Other,
}

#[derive(Error, Debug)]
pub enum ToolPrepError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Download page {url} changed its syntax or is not parsable: {details}")]
    PageSyntax { url: String, details: String },

    #[error("Checksum verification failed for {url}: {source}")]
    ChecksumMismatch {
        url: String,
        #[source]
        source: VerificationError,
    },

    #[error("Invalid {kind} checksum {digest:?}: {reason}")]
    InvalidChecksum {
        kind: String,
        digest: String,
        reason: String,
    },

    #[error("Failed to extract {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    #[error("Installation in {install_dir} is missing required files: {}", .missing.join(", "))]
    MissingRequiredFiles {
        install_dir: PathBuf,
        missing: Vec<String>,
    },

    #[error("Filesystem operation failed at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    #[error("Privileged operation failed: {action}")]
    Privilege { action: String },

    #[error("Failed to install package dependencies: {details}")]
    PackageDependencies { details: String },

    #[error("{tool} is not available on {architecture}")]
    UnsupportedArchitecture { tool: String, architecture: String },

    #[error("Unknown tool {category}/{tool}")]
    UnknownTool { category: String, tool: String },

    #[error("CLI argument validation failed: {details}")]
    CliArgumentValidation { details: String },

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Install(#[from] Box<InstallFailure>),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

impl ToolPrepError {
    pub fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn page_syntax(url: impl Into<String>, details: impl Into<String>) -> Self {
        Self::PageSyntax {
            url: url.into(),
            details: details.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Filesystem {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Http(_) => ErrorKind::Transport,
            Self::PageSyntax { .. } | Self::Json(_) => ErrorKind::Parse,
            Self::ChecksumMismatch { .. } | Self::InvalidChecksum { .. } => ErrorKind::Integrity,
            Self::Io(_)
            | Self::Extraction { .. }
            | Self::MissingRequiredFiles { .. }
            | Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::Privilege { .. } => ErrorKind::Privilege,
            Self::UnsupportedArchitecture { .. }
            | Self::UnknownTool { .. }
            | Self::CliArgumentValidation { .. } => ErrorKind::Usage,
            Self::Config(_) => ErrorKind::Config,
            Self::Install(failure) => failure.error.kind(),
            Self::PackageDependencies { .. } | Self::Unexpected(_) => ErrorKind::Other,
        }
    }
}
