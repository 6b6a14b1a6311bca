// errors.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

use crate::diagnostics::stack::Trace;
use crate::utils::files::display_bytes;
use crate::utils::SliceExt;
use std::fmt;

/// Common error cases that can happen in many different APIs
///
/// Every variant that stands for a failed step records the call stack at
/// the point where it was created, so that the exit trap can show where
/// things went wrong.
#[derive(Debug)]
pub enum LsrevError {
    IoError {
        error: std::io::Error,
        context: IoErrorContext,
        trace: Trace,
    },

    /// An external tool ran but exited unsuccessfully.
    ToolFailed {
        /// Shell-quoted command line, for messages
        command: Vec<u8>,
        /// `None` when the tool was killed by a signal
        code: Option<i32>,
        /// What the tool wrote to its standard error
        stderr: Vec<u8>,
        trace: Trace,
    },

    /// `-r` names neither a local directory nor a remote location.
    RepositoryNotFound { location: String, trace: Trace },

    /// A path pattern that cannot be turned into a matcher.
    InvalidPattern { message: String, trace: Trace },

    /// Operation cannot proceed for some other reason.
    ///
    /// The given string is a short explanation for users, not intended to be
    /// machine-readable.
    Abort { message: String, trace: Trace },
}

/// Details about where an I/O error happened
#[derive(Debug)]
pub enum IoErrorContext {
    ReadingFile(std::path::PathBuf),
    /// Spawning or waiting for an external program
    RunningCommand(String),
}

impl LsrevError {
    #[track_caller]
    pub fn abort(explanation: impl Into<String>) -> Self {
        LsrevError::Abort {
            message: explanation.into(),
            trace: Trace::capture(),
        }
    }

    #[track_caller]
    pub fn tool_failed(
        command: Vec<u8>,
        code: Option<i32>,
        stderr: Vec<u8>,
    ) -> Self {
        LsrevError::ToolFailed {
            command,
            code,
            stderr,
            trace: Trace::capture(),
        }
    }

    #[track_caller]
    pub fn repository_not_found(location: impl Into<String>) -> Self {
        LsrevError::RepositoryNotFound {
            location: location.into(),
            trace: Trace::capture(),
        }
    }

    #[track_caller]
    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        LsrevError::InvalidPattern {
            message: message.into(),
            trace: Trace::capture(),
        }
    }

    /// The call stack recorded when this error was created.
    pub fn trace(&self) -> &Trace {
        match self {
            LsrevError::IoError { trace, .. }
            | LsrevError::ToolFailed { trace, .. }
            | LsrevError::RepositoryNotFound { trace, .. }
            | LsrevError::InvalidPattern { trace, .. }
            | LsrevError::Abort { trace, .. } => trace,
        }
    }
}

// TODO: use `DisplayBytes` instead to show non-Unicode filenames losslessly?
impl fmt::Display for LsrevError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LsrevError::Abort { message, .. } => write!(f, "{}", message),
            LsrevError::IoError { error, context, .. } => {
                write!(f, "abort: {}: {}", context, error)
            }
            LsrevError::ToolFailed {
                command,
                code,
                stderr,
                ..
            } => {
                match code {
                    Some(code) => write!(
                        f,
                        "abort: {} exited with status {}",
                        display_bytes(command),
                        code
                    )?,
                    None => write!(
                        f,
                        "abort: {} was killed by a signal",
                        display_bytes(command)
                    )?,
                }
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, "\n{}", display_bytes(stderr))?;
                }
                Ok(())
            }
            LsrevError::RepositoryNotFound { location, .. } => {
                write!(f, "abort: repository {} not found", location)
            }
            LsrevError::InvalidPattern { message, .. } => {
                write!(f, "abort: invalid pattern: {}", message)
            }
        }
    }
}

impl fmt::Display for IoErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IoErrorContext::ReadingFile(path) => {
                write!(f, "when reading {}", path.display())
            }
            IoErrorContext::RunningCommand(program) => {
                write!(f, "when running {}", program)
            }
        }
    }
}

pub trait IoResultExt<T> {
    /// Annotate a possible I/O error as related to a reading a file at the
    /// given path.
    ///
    /// This allows printing something like “File not found when reading
    /// example.txt” instead of just “File not found”.
    ///
    /// Converts a `Result` with `std::io::Error` into one with `LsrevError`.
    fn when_reading_file(
        self,
        path: &std::path::Path,
    ) -> Result<T, LsrevError>;

    /// Like `when_reading_file`, for a file that may not exist: a "not
    /// found" error becomes `Ok(None)` without building an `LsrevError`.
    fn when_reading_optional_file(
        self,
        path: &std::path::Path,
    ) -> Result<Option<T>, LsrevError>;

    fn with_context(
        self,
        context: impl FnOnce() -> IoErrorContext,
    ) -> Result<T, LsrevError>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    #[track_caller]
    fn when_reading_file(
        self,
        path: &std::path::Path,
    ) -> Result<T, LsrevError> {
        self.with_context(|| IoErrorContext::ReadingFile(path.to_owned()))
    }

    #[track_caller]
    fn when_reading_optional_file(
        self,
        path: &std::path::Path,
    ) -> Result<Option<T>, LsrevError> {
        match self {
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Ok(None)
            }
            other => other.when_reading_file(path).map(Some),
        }
    }

    #[track_caller]
    fn with_context(
        self,
        context: impl FnOnce() -> IoErrorContext,
    ) -> Result<T, LsrevError> {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(LsrevError::IoError {
                error,
                context: context(),
                trace: Trace::capture(),
            }),
        }
    }
}
