// walker.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

use crate::diagnostics::context::{render_context, ContextRequest};
use crate::diagnostics::stack::{StackFrame, StackInspector, DEFAULT_ROUTINE};
use log::{Level, Log, Record};

/// How many frames past the innermost one are shown by default
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Logs the frames of `stack` at ERROR level, innermost first, followed by
/// a one-line summary of the innermost call site and `exit_code`.
///
/// Does nothing when `exit_code` is zero. At most `max_depth + 1` frames are
/// shown; the walk stops early, without complaint, on a shallower stack.
/// Frames whose source cannot be read are shown without their context.
///
/// Meant to run as an exit trap: it does not panic on bad input and only
/// ever talks to `logger`.
pub fn log_stack_trace(
    exit_code: i32,
    stack: &dyn StackInspector,
    max_depth: usize,
    logger: &dyn Log,
) {
    if exit_code == 0 {
        return;
    }

    let mut depth = 0;
    while depth <= max_depth {
        let frame = match stack.frame(depth) {
            Some(frame) => frame,
            None => break,
        };
        emit_error(logger, &render_frame(&frame));
        depth += 1;
    }

    let summary = match stack.frame(0) {
        Some(StackFrame {
            routine_name,
            line_number,
            ..
        }) => {
            format!("{}({}) -> exit {}", routine_name, line_number, exit_code)
        }
        None => format!("{}(?) -> exit {}", DEFAULT_ROUTINE, exit_code),
    };
    emit_error(logger, &summary);
    logger.flush();
}

fn render_frame(frame: &StackFrame) -> String {
    let request = ContextRequest::from(frame);
    match render_context(&request) {
        Ok(rendered) => rendered,
        Err(_) => format!("{}\n  (source unavailable)", request.header()),
    }
}

fn emit_error(logger: &dyn Log, message: &str) {
    logger.log(
        &Record::builder()
            .args(format_args!("{}", message))
            .level(Level::Error)
            .target(module_path!())
            .build(),
    );
}
