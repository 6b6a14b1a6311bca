use crate::error::CommandError;
use format_bytes::format_bytes;
use lsrev::diagnostics::{render_context, ContextRequest};
use log::error;

/// Prints a source line with the lines around it, reading the positional
/// arguments as `LINE [ROUTINE] SOURCE`.
pub fn run(invocation: &crate::CliInvocation) -> Result<(), CommandError> {
    let args: Vec<_> = invocation
        .matches
        .values_of_os("pattern")
        .into_iter()
        .flatten()
        .collect();
    let request = match ContextRequest::from_positional(&args) {
        Ok(request) => request,
        Err(render_error) => {
            error!("{}", render_error);
            // Already reported through the logger
            return Err(CommandError::abort(""));
        }
    };
    let rendered = render_context(&request)?;
    invocation
        .ui
        .write_stdout(&format_bytes!(b"{}\n", rendered.into_bytes()))?;
    Ok(())
}
