//! Error types for the packaging pipeline.

use std::{fmt::Display, io, path::PathBuf};
use thiserror::Error as DeriveError;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by pipeline components.
///
/// Components return these to the controller; none of them is fatal by itself
/// until the controller folds it into a [`StageOutcome`](super::StageOutcome).
#[derive(DeriveError, Debug)]
pub enum Error {
    /// I/O error annotated with the operation and the path involved
    #[error("{context} `{path}`: {error}")]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path that was being operated on
        path: PathBuf,
        /// Underlying error
        error: io::Error,
    },

    /// External command could not be executed or exited unsuccessfully
    #[error("`{command}` failed: {reason}")]
    CommandFailed {
        /// Command line that failed
        command: String,
        /// Reason for the failure
        reason: String,
    },

    /// A resource bundle record could not be decoded
    #[error("record {index} for `{destination}` is malformed: {reason}")]
    MalformedRecord {
        /// Zero-based line index inside the bundle
        index: usize,
        /// Destination the record was meant for
        destination: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// The resource bundle ran out of lines before every destination was served
    #[error("resource bundle `{path}` holds {found} record(s), {expected} expected")]
    ShortBundle {
        /// Bundle file
        path: PathBuf,
        /// Number of destinations
        expected: usize,
        /// Number of records actually present
        found: usize,
    },

    /// Invalid glob pattern
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    /// Invalid regular expression
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Anything else
    #[error("{0}")]
    GenericError(String),
}

/// Attaches filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps the error with the operation being performed and the path involved.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Turns a missing value into a [`Error::GenericError`].
pub trait Context<T> {
    /// Returns the value, or an error carrying `msg`.
    fn context<C: Display>(self, msg: C) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, msg: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::pipeline::Error::GenericError(format!($($arg)*)))
    };
}
