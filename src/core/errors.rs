//! Error types for the DoD automation engine.
//!
//! Every fallible core operation returns `Result<T>`. Errors are typed by
//! kind rather than by free-form string so callers (CLI, tests) can map them
//! onto the exit codes and taxonomy in the specification without parsing
//! messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main result type for engine operations.
pub type Result<T> = std::result::Result<T, DodError>;

/// Error taxonomy for the DoD engine, matching the kinds (not type names) in
/// the specification's error handling design.
#[derive(Error, Debug)]
pub enum DodError {
    /// Invalid inputs to a core operation: unknown provider/feature/criterion,
    /// malformed config. Surfaced to the caller; counted, not traced as an
    /// exception.
    #[error("input error: {message}")]
    InputError {
        /// Human-readable description.
        message: String,
        /// Offending field or value, when known.
        field: Option<String>,
    },

    /// A validator raised or exited abnormally. Local to one criterion; the
    /// evaluation as a whole continues.
    #[error("validator '{criterion}' failed: {message}")]
    ValidatorError {
        /// Criterion id whose validator failed.
        criterion: String,
        /// Error description.
        message: String,
    },

    /// A per-criterion or run-level deadline was exceeded.
    #[error("timeout for '{criterion}' after {elapsed_ms}ms")]
    Timeout {
        /// Criterion id that timed out.
        criterion: String,
        /// Elapsed time before cancellation.
        elapsed_ms: u64,
    },

    /// User-initiated cancellation or a global deadline expiry that aborted
    /// one or more in-flight criteria.
    #[error("cancelled: {reason}")]
    Cancelled {
        /// Why the run was cancelled.
        reason: String,
    },

    /// Filesystem operation failed during exoskeleton or pipeline
    /// generation. Fatal to the containing operation; no partial state is
    /// left on disk.
    #[error("I/O error at {path}: {message}")]
    IoError {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Human-readable description.
        message: String,
        /// Underlying I/O error, if any.
        #[source]
        source: Option<io::Error>,
    },

    /// An invariant was violated (e.g. W1 failed at registry load). Fatal;
    /// the process should return a distinct exit code.
    #[error("internal error: {message}")]
    Internal {
        /// Error description.
        message: String,
    },

    /// Exoskeleton materialization in `create` mode found one or more target
    /// files that already exist with different content. Carries every
    /// conflicting path found across the full file set, not just the first.
    #[error("refusing to overwrite {} conflicting file(s): {}", paths.len(), paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    ExoskeletonConflict {
        /// Every target path that conflicted.
        paths: Vec<PathBuf>,
    },
}

impl DodError {
    /// Build an input error with no specific field.
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputError {
            message: message.into(),
            field: None,
        }
    }

    /// Build an input error naming the offending field.
    pub fn input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InputError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Build a validator error for the given criterion.
    pub fn validator(criterion: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidatorError {
            criterion: criterion.into(),
            message: message.into(),
        }
    }

    /// Build a timeout error for the given criterion.
    pub fn timeout(criterion: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::Timeout {
            criterion: criterion.into(),
            elapsed_ms,
        }
    }

    /// Build a cancellation error.
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    /// Build an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Build an I/O error without an underlying `io::Error`.
    pub fn io_msg(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Build an internal (invariant violation) error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Build an exoskeleton-conflict error naming every conflicting path.
    pub fn exoskeleton_conflict(paths: Vec<PathBuf>) -> Self {
        Self::ExoskeletonConflict { paths }
    }

    /// The process exit code this error kind should produce when it
    /// terminates a CLI operation, per the specification's CLI contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputError { .. } => 2,
            Self::Internal { .. } => 2,
            Self::ValidatorError { .. } | Self::Timeout { .. } | Self::Cancelled { .. } => 1,
            Self::IoError { .. } => 1,
            Self::ExoskeletonConflict { .. } => 1,
        }
    }
}

impl From<serde_yaml::Error> for DodError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::InputError {
            message: format!("invalid YAML: {err}"),
            field: None,
        }
    }
}

impl From<serde_json::Error> for DodError {
    fn from(err: serde_json::Error) -> Self {
        Self::InputError {
            message: format!("invalid JSON: {err}"),
            field: None,
        }
    }
}

impl From<io::Error> for DodError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Result extension trait for adding operation context to an error without
/// changing its kind.
pub trait ResultExt<T> {
    /// Attach context computed lazily (only on the error path).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Attach static context.
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DodError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            match err {
                DodError::Internal { message } => DodError::Internal {
                    message: format!("{}: {message}", f()),
                },
                other => other,
            }
        })
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_taxonomy() {
        assert_eq!(DodError::input("bad").exit_code(), 2);
        assert_eq!(DodError::internal("bad").exit_code(), 2);
        assert_eq!(DodError::validator("testing", "boom").exit_code(), 1);
        assert_eq!(DodError::timeout("testing", 10).exit_code(), 1);
        assert_eq!(DodError::cancelled("user").exit_code(), 1);
        assert_eq!(DodError::exoskeleton_conflict(vec![PathBuf::from("a"), PathBuf::from("b")]).exit_code(), 1);
    }

    #[test]
    fn exoskeleton_conflict_message_lists_every_path() {
        let err = DodError::exoskeleton_conflict(vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]);
        let message = err.to_string();
        assert!(message.contains("a.yaml"));
        assert!(message.contains("b.yaml"));
    }

    #[test]
    fn context_only_touches_internal_errors() {
        let err: Result<()> = Err(DodError::input("bad field")).context("loading config");
        assert!(matches!(err, Err(DodError::InputError { .. })));
    }
}
