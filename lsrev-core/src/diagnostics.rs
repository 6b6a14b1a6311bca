// diagnostics.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Reporting of abnormal termination.
//!
//! A failure records the call stack where it was created ([`stack`]). When
//! the process tears down with a non-zero exit code, the walker ([`walker`])
//! prints the innermost frames of that stack, each with a few lines of
//! surrounding source ([`context`]).

pub mod context;
pub mod stack;
pub mod walker;

pub use context::{render_context, ContextRequest, RenderError};
pub use stack::{StackFrame, StackInspector, Trace};
pub use walker::{log_stack_trace, DEFAULT_MAX_DEPTH};
