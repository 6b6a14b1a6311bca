// stack.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Structured call stacks recorded at the point of failure.

use std::panic::Location;
use std::path::{Path, PathBuf};

/// Routine name used when a frame cannot be symbolized.
pub const DEFAULT_ROUTINE: &str = "call";

/// Symbols from these crates are runtime or capture plumbing, never the
/// code that failed.
const HIDDEN_CRATES: &[&str] = &["backtrace", "std", "core", "alloc", "test"];

/// Entry points of the C runtime and the Rust start-up code
const HIDDEN_SYMBOL_PREFIXES: &[&str] = &["__rust", "__libc_start", "_start"];

/// Sources of the standard library (`/rustc/<commit>/library/...` in
/// release toolchains) and of registry dependencies.
const HIDDEN_SOURCE_MARKERS: &[&str] =
    &["/rustc/", "\\rustc\\", "/.cargo/registry/", "\\.cargo\\registry\\"];

#[cfg(test)]
thread_local! {
    static CAPTURES: std::cell::Cell<usize> = std::cell::Cell::new(0);
}

/// How many times `Trace::capture` ran on this thread
#[cfg(test)]
pub(crate) fn captures_so_far() -> usize {
    CAPTURES.with(|count| count.get())
}

/// One level of the call chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    pub line_number: u32,
    pub routine_name: String,
    pub source_identifier: PathBuf,
}

impl StackFrame {
    pub fn new(
        line_number: u32,
        routine_name: Option<&str>,
        source_identifier: impl Into<PathBuf>,
    ) -> Self {
        Self {
            line_number,
            routine_name: routine_name.unwrap_or(DEFAULT_ROUTINE).to_owned(),
            source_identifier: source_identifier.into(),
        }
    }

    fn from_location(location: &Location) -> Self {
        Self::new(location.line(), None, location.file())
    }

    fn is_at(&self, location: &Location) -> bool {
        self.line_number == location.line() && self.is_in(location)
    }

    fn is_in(&self, location: &Location) -> bool {
        self.source_identifier.ends_with(Path::new(location.file()))
    }
}

/// Answers "which frame is at this depth?", depth 0 being the innermost.
pub trait StackInspector {
    fn frame(&self, depth: usize) -> Option<StackFrame>;
}

impl StackInspector for Vec<StackFrame> {
    fn frame(&self, depth: usize) -> Option<StackFrame> {
        self.get(depth).cloned()
    }
}

/// Frames of the call stack, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    frames: Vec<StackFrame>,
}

impl Trace {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: Vec<StackFrame>) -> Self {
        Self { frames }
    }

    /// Records the native call stack of the caller.
    ///
    /// The innermost frame is the call site of this function, or of the
    /// outermost `#[track_caller]` function leading to it: capture plumbing
    /// and error constructors never show up. Without debug info the trace
    /// still holds that one call site, with an unknown routine name.
    #[track_caller]
    #[inline(never)]
    pub fn capture() -> Self {
        #[cfg(test)]
        CAPTURES.with(|count| count.set(count.get() + 1));
        let location = Location::caller();
        let mut frames = native_frames();

        let caller = frames
            .iter()
            .position(|frame| frame.is_at(location))
            .or_else(|| frames.iter().position(|frame| frame.is_in(location)));
        match caller {
            Some(index) => {
                frames.drain(..index);
                frames[0].line_number = location.line();
            }
            None => frames = vec![StackFrame::from_location(location)],
        }
        Self { frames }
    }

    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl StackInspector for Trace {
    fn frame(&self, depth: usize) -> Option<StackFrame> {
        self.frames.frame(depth)
    }
}

/// Every symbolized frame of the current thread that has a source location.
///
/// Inlined calls show up as several symbols for a single native frame, each
/// becomes its own `StackFrame`.
fn native_frames() -> Vec<StackFrame> {
    let backtrace = backtrace::Backtrace::new();
    let mut frames = Vec::new();
    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            let (file, line) = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => (file, line),
                _ => continue,
            };
            let routine = symbol.name().map(|name| format!("{:#}", name));
            if is_hidden(routine.as_deref(), file) {
                continue;
            }
            frames.push(StackFrame::new(line, routine.as_deref(), file));
        }
    }
    frames
}

fn is_hidden(routine: Option<&str>, file: &Path) -> bool {
    let file = file.to_string_lossy();
    if HIDDEN_SOURCE_MARKERS
        .iter()
        .any(|marker| file.contains(marker))
    {
        return true;
    }
    let routine = match routine {
        Some(routine) => routine,
        None => return false,
    };
    if HIDDEN_SYMBOL_PREFIXES
        .iter()
        .any(|prefix| routine.starts_with(prefix))
    {
        return true;
    }
    HIDDEN_CRATES.contains(&owning_crate(routine))
}

/// The crate of the type or trait a demangled symbol belongs to.
///
/// `<&dyn core::ops::Fn<()> as core::ops::FnOnce<()>>::call_once` belongs
/// to `core`, `rlsrev::main` to `rlsrev`.
fn owning_crate(routine: &str) -> &str {
    let mut path = routine;
    loop {
        let stripped = path
            .trim_start_matches(|c| c == '<' || c == '&' || c == '*')
            .trim_start_matches("mut ")
            .trim_start_matches("const ")
            .trim_start_matches("dyn ");
        if stripped == path {
            break;
        }
        path = stripped;
    }
    path.split("::").next().unwrap_or(path)
}
