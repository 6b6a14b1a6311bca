// tool.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Running the external programs that do the actual listing.

use crate::errors::{IoErrorContext, IoResultExt, LsrevError};
use crate::utils::files::{display_bytes, get_bytes_from_os_str};
use crate::utils::shell_quote;
use log::debug;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// An external program and its arguments, run with captured output.
#[derive(Clone, Debug)]
pub struct Tool {
    program: OsString,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl Tool {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args(
        mut self,
        args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    ) -> Self {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_owned());
        self
    }

    /// The command line as a shell would read it back
    pub fn command_line(&self) -> Vec<u8> {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|word| shell_quote(&get_bytes_from_os_str(word)))
            .collect::<Vec<_>>()
            .join(&b' ')
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }

    fn spawn_context(&self) -> IoErrorContext {
        IoErrorContext::RunningCommand(
            display_bytes(&self.command_line()).into_owned(),
        )
    }

    /// Runs the tool to completion and returns what it wrote to stdout.
    ///
    /// A non-zero exit is a `ToolFailed` error holding the tool's stderr.
    pub fn output(&self) -> Result<Vec<u8>, LsrevError> {
        debug!("running {}", display_bytes(&self.command_line()));
        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| self.spawn_context())?;
        self.check(output)
    }

    /// Runs `self | next` and returns what `next` wrote to stdout.
    ///
    /// When both fail, the failure of `self` is the one reported since it
    /// usually explains the other.
    pub fn pipe_into(&self, next: &Tool) -> Result<Vec<u8>, LsrevError> {
        debug!(
            "running {} | {}",
            display_bytes(&self.command_line()),
            display_bytes(&next.command_line())
        );
        let mut upstream = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| self.spawn_context())?;
        let pipe = match upstream.stdout.take() {
            Some(pipe) => Stdio::from(pipe),
            None => Stdio::null(),
        };
        let downstream = next
            .command()
            .stdin(pipe)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| next.spawn_context());
        let downstream = match downstream {
            Ok(child) => child,
            Err(error) => {
                let _ = upstream.kill();
                let _ = upstream.wait();
                return Err(error);
            }
        };
        let downstream_output = downstream
            .wait_with_output()
            .with_context(|| next.spawn_context())?;
        let upstream_output = upstream
            .wait_with_output()
            .with_context(|| self.spawn_context())?;
        self.check(upstream_output)?;
        next.check(downstream_output)
    }

    fn check(&self, output: Output) -> Result<Vec<u8>, LsrevError> {
        if output.status.success() {
            Ok(output.stdout)
        } else {
            debug!(
                "{} failed: {}",
                display_bytes(&self.command_line()),
                output.status
            );
            Err(LsrevError::tool_failed(
                self.command_line(),
                output.status.code(),
                output.stderr,
            ))
        }
    }
}
