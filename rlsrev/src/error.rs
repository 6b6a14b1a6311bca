// error.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

use crate::exitcode;
use crate::ui::UiError;
use format_bytes::format_bytes;
use lsrev::config::{ConfigError, ConfigParseError, ConfigValueParseError};
use lsrev::diagnostics::{RenderError, Trace};
use lsrev::errors::LsrevError;
use std::convert::From;

/// The kind of command error
#[derive(Debug)]
pub enum CommandError {
    /// Exit with an error message and "standard" failure exit code.
    Abort {
        message: Vec<u8>,
        detailed_exit_code: exitcode::ExitCode,
        /// Where the failure happened
        trace: Trace,
    },
}

impl CommandError {
    #[track_caller]
    pub fn abort(message: impl AsRef<str>) -> Self {
        CommandError::abort_with_exit_code(message, exitcode::ABORT)
    }

    #[track_caller]
    pub fn abort_with_exit_code(
        message: impl AsRef<str>,
        detailed_exit_code: exitcode::ExitCode,
    ) -> Self {
        CommandError::Abort {
            message: message.as_ref().as_bytes().to_owned(),
            detailed_exit_code,
            trace: Trace::capture(),
        }
    }

    /// The process exit code for this error
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            CommandError::Abort {
                detailed_exit_code, ..
            } => *detailed_exit_code,
        }
    }

    /// What is printed on stderr before exiting, possibly nothing
    pub fn message(&self) -> &[u8] {
        match self {
            CommandError::Abort { message, .. } => message,
        }
    }

    /// Splits into the exit code and the trace handed to the exit traps
    pub fn into_exit_parts(self) -> (exitcode::ExitCode, Trace) {
        let code = self.exit_code();
        match self {
            CommandError::Abort { trace, .. } => (code, trace),
        }
    }
}

impl From<UiError> for CommandError {
    #[track_caller]
    fn from(_error: UiError) -> Self {
        // If we already failed writing to stdout or stderr,
        // writing an error message to stderr about it would be likely to fail
        // too.
        CommandError::abort("")
    }
}

impl From<LsrevError> for CommandError {
    fn from(error: LsrevError) -> Self {
        let detailed_exit_code = match &error {
            LsrevError::ToolFailed { code, .. } => {
                code.unwrap_or(exitcode::ABORT)
            }
            _ => exitcode::ABORT,
        };
        let message = error.to_string().into_bytes();
        let trace = match error {
            LsrevError::IoError { trace, .. }
            | LsrevError::ToolFailed { trace, .. }
            | LsrevError::RepositoryNotFound { trace, .. }
            | LsrevError::InvalidPattern { trace, .. }
            | LsrevError::Abort { trace, .. } => trace,
        };
        CommandError::Abort {
            message,
            detailed_exit_code,
            trace,
        }
    }
}

/// Keeps the trace of where the value was asked for.
impl From<ConfigValueParseError> for CommandError {
    fn from(error: ConfigValueParseError) -> Self {
        CommandError::Abort {
            message: error.to_string().into_bytes(),
            detailed_exit_code: exitcode::CONFIG_ERROR_ABORT,
            trace: error.trace,
        }
    }
}

impl From<ConfigError> for CommandError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Parse(error) => error.into(),
            ConfigError::Other(error) => error.into(),
        }
    }
}

impl From<ConfigParseError> for CommandError {
    #[track_caller]
    fn from(error: ConfigParseError) -> Self {
        let ConfigParseError {
            origin,
            line,
            message,
        } = error;
        let location = match line {
            Some(line) => format!("{}:{}", origin, line),
            None => origin.to_string(),
        };
        CommandError::Abort {
            message: format_bytes!(
                b"config error at {}: {}",
                location.into_bytes(),
                message
            ),
            detailed_exit_code: exitcode::CONFIG_ERROR_ABORT,
            trace: Trace::capture(),
        }
    }
}

impl From<RenderError> for CommandError {
    #[track_caller]
    fn from(error: RenderError) -> Self {
        match error {
            RenderError::Unreadable(error) => error.into(),
            other => CommandError::abort(format!("abort: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsrev::config::{Config, ConfigLayer, ConfigOrigin, ConfigSource};
    use pretty_assertions::assert_eq;

    #[test]
    fn failed_tools_pass_their_exit_code_on() {
        let error: CommandError =
            LsrevError::tool_failed(b"git ls-tree".to_vec(), Some(128), vec![])
                .into();
        assert_eq!(error.exit_code(), 128);
        let error: CommandError =
            LsrevError::tool_failed(b"git ls-tree".to_vec(), None, vec![])
                .into();
        assert_eq!(error.exit_code(), exitcode::ABORT);
    }

    #[test]
    fn the_trace_of_the_failure_is_kept() {
        let error = LsrevError::repository_not_found("nowhere");
        let trace = error.trace().clone();
        let (code, kept) = CommandError::from(error).into_exit_parts();
        assert_eq!(code, exitcode::ABORT);
        assert_eq!(kept, trace);
    }

    #[test]
    fn messages() {
        let error = CommandError::from(LsrevError::repository_not_found("x"));
        assert_eq!(error.message(), b"abort: repository x not found");
        assert_eq!(CommandError::abort("").message(), b"");
    }

    #[test]
    fn argument_count_is_an_abort() {
        let error =
            CommandError::from(RenderError::ArgumentCount { given: 4 });
        assert_eq!(error.exit_code(), exitcode::ABORT);
        assert!(error.message().starts_with(b"abort: expected LINE"));
    }

    #[test]
    fn invalid_config_values_keep_their_trace() {
        let layer =
            ConfigLayer::parse_cli_args(vec!["trace.max-depth=deep"])
                .unwrap()
                .unwrap();
        let config =
            Config::load_from_explicit_sources(vec![ConfigSource::Parsed(
                layer,
            )])
            .unwrap();
        let line = line!() + 1;
        let error = config.trace_max_depth().unwrap_err();
        let trace = error.trace.clone();
        let error = CommandError::from(error);
        assert_eq!(error.exit_code(), exitcode::CONFIG_ERROR_ABORT);
        assert_eq!(
            error.message(),
            &b"config error at --config: trace.max-depth is not a valid \
               integer ('deep')"[..]
        );
        let (_, kept) = error.into_exit_parts();
        assert_eq!(kept, trace);
        assert_eq!(kept.frames()[0].line_number, line);
        assert!(kept.frames()[0].source_identifier.ends_with("error.rs"));
    }

    #[test]
    fn config_parse_errors_name_the_line() {
        let error = CommandError::from(ConfigParseError {
            origin: ConfigOrigin::File("/home/u/.lsrevrc".into()),
            line: Some(3),
            message: b"expected 'name = value': color".to_vec(),
        });
        assert_eq!(error.exit_code(), exitcode::CONFIG_ERROR_ABORT);
        assert_eq!(
            error.message(),
            &b"config error at /home/u/.lsrevrc:3: expected 'name = value': \
               color"[..]
        );
    }
}
