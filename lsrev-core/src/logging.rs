// logging.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Leveled diagnostics on the standard error stream.
//!
//! Everything goes through the `log` facade. The binary installs a logger
//! whose output lines are built by [`format_record`]: a level tag, colored
//! when enabled, followed by the message.

use log::{Level, LevelFilter};
use std::fmt;
use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";

/// Whether level tags get an ANSI color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// Color when stderr is a terminal and `NO_COLOR` is not set
    Auto,
    Always,
    Never,
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Auto
    }
}

impl ColorMode {
    /// Parses the `ui.color` config value.
    pub fn parse(value: &[u8]) -> Option<Self> {
        match value.to_ascii_lowercase().as_slice() {
            b"auto" => Some(ColorMode::Auto),
            b"always" | b"yes" | b"true" | b"on" | b"1" => {
                Some(ColorMode::Always)
            }
            b"never" | b"no" | b"false" | b"off" | b"0" => {
                Some(ColorMode::Never)
            }
            _ => None,
        }
    }

    pub fn use_color(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::env::var_os("NO_COLOR").is_none()
                    && std::io::stderr().is_terminal()
            }
        }
    }
}

fn tag(level: Level) -> &'static str {
    match level {
        Level::Error => "[ERROR]",
        Level::Warn => "[WARN]",
        Level::Info => "[INFO]",
        Level::Debug | Level::Trace => "[DEBUG]",
    }
}

/// ANSI foreground color code of each level.
fn color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m",
        Level::Warn => "\x1b[33m",
        Level::Info => "\x1b[32m",
        Level::Debug | Level::Trace => "\x1b[34m",
    }
}

/// One diagnostic line, without the trailing newline.
pub fn format_record(
    level: Level,
    message: impl fmt::Display,
    colored: bool,
) -> String {
    if colored {
        format!("{}{}{} {}", color(level), tag(level), RESET, message)
    } else {
        format!("{} {}", tag(level), message)
    }
}

/// Level filter for the number of `-v` flags.
pub fn level_filter_for_verbosity(verbosity: u64) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn log_debug(message: &str) {
    log::debug!("{}", message)
}

pub fn log_info(message: &str) {
    log::info!("{}", message)
}

pub fn log_warn(message: &str) {
    log::warn!("{}", message)
}

pub fn log_error(message: &str) {
    log::error!("{}", message)
}
