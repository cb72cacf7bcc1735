//! Error handling for Seedling.
//! Defines the error type shared by the registry, resolver, processor and CLI,
//! plus the stable error codes reported in a generation result.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Every failure a generation run (or the CLI around it) can produce.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// A write under the target directory failed mid-run.
    #[error("Failed to write '{}': {source}.", .path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Template '{name}' not found.")]
    TemplateNotFoundError { name: String },

    /// Two templates share a name at registry construction.
    #[error("Template '{name}' is registered more than once.")]
    DuplicateTemplateError { name: String },

    /// A template manifest lists a file that is not present in its `files/` directory.
    #[error("Template '{template}' references missing file '{}'.", .path.display())]
    MissingTemplateFileError { template: String, path: PathBuf },

    #[error("Invalid project name '{name}': {reason}.")]
    InvalidProjectNameError { name: String, reason: String },

    /// Found by the static placeholder scan, before anything is written.
    #[error("Template '{template}' uses undefined placeholders: {}.", .keys.join(", "))]
    MissingPlaceholdersError { template: String, keys: Vec<String> },

    /// A placeholder slipped past validation and was found while rendering.
    #[error("Unresolved placeholder '{key}' in '{}'.", .file.display())]
    UnresolvedPlaceholderError { key: String, file: PathBuf },

    #[error("Failed to render '{file}': {source}.")]
    RenderError {
        file: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Target directory '{}' is not empty (found: {}).", .target.display(), join_paths(.conflicts))]
    TargetNotEmptyError { target: PathBuf, conflicts: Vec<PathBuf> },

    /// A manifest path would resolve outside the target (or template) root.
    #[error("Path '{}' escapes the target directory.", .path.display())]
    PathTraversalError { path: PathBuf },

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    /// Represents errors that occur during post-generation hook execution
    #[error("Hook '{hook}' failed: {message}.")]
    HookError { hook: String, message: String },

    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),

    #[error("Generation cancelled.")]
    CancelledError,
}

/// Stable, machine-readable identifier for an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Io,
    Write,
    TemplateNotFound,
    DuplicateTemplate,
    MissingTemplateFile,
    InvalidProjectName,
    MissingPlaceholders,
    UnresolvedPlaceholder,
    Render,
    TargetNotEmpty,
    PathTraversal,
    Config,
    Json,
    Git,
    Hook,
    Prompt,
    Cancelled,
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::IoError(_) => ErrorCode::Io,
            Error::WriteError { .. } => ErrorCode::Write,
            Error::TemplateNotFoundError { .. } => ErrorCode::TemplateNotFound,
            Error::DuplicateTemplateError { .. } => ErrorCode::DuplicateTemplate,
            Error::MissingTemplateFileError { .. } => ErrorCode::MissingTemplateFile,
            Error::InvalidProjectNameError { .. } => ErrorCode::InvalidProjectName,
            Error::MissingPlaceholdersError { .. } => ErrorCode::MissingPlaceholders,
            Error::UnresolvedPlaceholderError { .. } => ErrorCode::UnresolvedPlaceholder,
            Error::RenderError { .. } => ErrorCode::Render,
            Error::TargetNotEmptyError { .. } => ErrorCode::TargetNotEmpty,
            Error::PathTraversalError { .. } => ErrorCode::PathTraversal,
            Error::ConfigError(_) => ErrorCode::Config,
            Error::JsonError(_) => ErrorCode::Json,
            Error::Git2Error(_) => ErrorCode::Git,
            Error::HookError { .. } => ErrorCode::Hook,
            Error::PromptError(_) => ErrorCode::Prompt,
            Error::CancelledError => ErrorCode::Cancelled,
        }
    }

    /// Extra structured context for callers that render errors themselves.
    pub fn details(&self) -> Vec<String> {
        match self {
            Error::WriteError { path, .. } => vec![path.display().to_string()],
            Error::MissingPlaceholdersError { keys, .. } => keys.clone(),
            Error::UnresolvedPlaceholderError { key, file } => {
                vec![key.clone(), file.display().to_string()]
            }
            Error::TargetNotEmptyError { conflicts, .. } => {
                conflicts.iter().map(|p| p.display().to_string()).collect()
            }
            Error::PathTraversalError { path } => vec![path.display().to_string()],
            Error::MissingTemplateFileError { path, .. } => vec![path.display().to_string()],
            _ => Vec::new(),
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
