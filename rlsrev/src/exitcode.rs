// exitcode.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

pub type ExitCode = i32;

/// Successful exit
pub const OK: ExitCode = 0;

/// Invalid command line: unknown option, missing or repeated value
pub const USAGE: ExitCode = 1;

/// Generic abort
pub const ABORT: ExitCode = 255;

/// Abort when there is a config related error
pub const CONFIG_ERROR_ABORT: ExitCode = 30;
