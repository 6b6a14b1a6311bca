// context.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Rendering of a source line together with its surroundings.

use crate::diagnostics::stack::{StackFrame, DEFAULT_ROUTINE};
use crate::errors::{IoResultExt, LsrevError};
use std::ffi::OsStr;
use std::fmt::{self, Write};
use std::path::PathBuf;

/// Lines shown on each side of the target line
pub const CONTEXT_LINES: u32 = 3;

/// What to render: `line` of `source`, as seen from `routine`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextRequest {
    /// 1-based
    pub line: u32,
    pub routine: Option<String>,
    pub source: PathBuf,
}

#[derive(Debug)]
pub enum RenderError {
    /// Positional form called with something else than 2 or 3 arguments
    ArgumentCount { given: usize },
    /// The line argument is not a positive integer
    InvalidLineNumber(String),
    Unreadable(LsrevError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RenderError::ArgumentCount { given } => write!(
                f,
                "expected LINE [ROUTINE] SOURCE (2 or 3 arguments), got {}",
                given
            ),
            RenderError::InvalidLineNumber(line) => {
                write!(f, "invalid line number: '{}'", line)
            }
            RenderError::Unreadable(error) => error.fmt(f),
        }
    }
}

impl ContextRequest {
    pub fn new(
        line: u32,
        routine: Option<&str>,
        source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            line,
            routine: routine.map(ToOwned::to_owned),
            source: source.into(),
        }
    }

    /// Builds a request from `LINE SOURCE` or `LINE ROUTINE SOURCE`.
    pub fn from_positional(
        args: &[impl AsRef<OsStr>],
    ) -> Result<Self, RenderError> {
        let (line, routine, source) = match args {
            [line, source] => (line, None, source),
            [line, routine, source] => (line, Some(routine), source),
            _ => return Err(RenderError::ArgumentCount { given: args.len() }),
        };
        let line = line.as_ref();
        let line = line
            .to_str()
            .and_then(|line| line.parse::<u32>().ok())
            .filter(|&line| line > 0)
            .ok_or_else(|| {
                RenderError::InvalidLineNumber(
                    line.to_string_lossy().into_owned(),
                )
            })?;
        Ok(Self {
            line,
            routine: routine.map(|routine| {
                routine.as_ref().to_string_lossy().into_owned()
            }),
            source: PathBuf::from(source.as_ref()),
        })
    }

    pub fn routine(&self) -> &str {
        self.routine.as_deref().unwrap_or(DEFAULT_ROUTINE)
    }

    pub fn header(&self) -> String {
        format!(
            "{}() at {}:{}",
            self.routine(),
            self.source.display(),
            self.line
        )
    }
}

impl From<&StackFrame> for ContextRequest {
    fn from(frame: &StackFrame) -> Self {
        Self::new(
            frame.line_number,
            Some(frame.routine_name.as_str()),
            frame.source_identifier.clone(),
        )
    }
}

/// Reads the source and renders the header and up to seven numbered lines
/// around the target, the target one marked with `>`.
pub fn render_context(
    request: &ContextRequest,
) -> Result<String, RenderError> {
    let text = std::fs::read(&request.source)
        .when_reading_file(&request.source)
        .map_err(RenderError::Unreadable)?;
    Ok(render_source(request, &text))
}

/// Same as `render_context`, with the source text already at hand.
pub fn render_source(request: &ContextRequest, text: &[u8]) -> String {
    let mut lines: Vec<&[u8]> = text.split(|byte| *byte == b'\n').collect();
    if text.is_empty() || text.ends_with(b"\n") {
        lines.pop();
    }

    let first = request.line.saturating_sub(CONTEXT_LINES).max(1);
    let last = request
        .line
        .saturating_add(CONTEXT_LINES)
        .min(lines.len() as u32);
    let width = last.to_string().len();

    let mut rendered = request.header();
    for number in first..=last {
        let text = String::from_utf8_lossy(lines[number as usize - 1]);
        let marker = if number == request.line { '>' } else { ' ' };
        // Writing into a `String` cannot fail
        let _ = write!(
            rendered,
            "\n{} {:>width$} | {}",
            marker,
            number,
            text.trim_end_matches('\r'),
            width = width
        );
    }
    rendered
}
