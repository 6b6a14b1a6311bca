// testing.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Fixtures shared by unit and integration tests.

use crate::diagnostics::stack::StackFrame;
use log::{Level, Log, Metadata, Record};
use std::sync::Mutex;

/// A `log::Log` that keeps every record instead of printing it.
#[derive(Debug, Default)]
pub struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl CapturingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything logged so far, in order
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .map(|(_, message)| message)
            .collect()
    }
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// `count` frames named `frame0`, `frame1`, … at lines 10, 11, … of a
/// source file that does not exist.
pub fn sample_frames(count: usize) -> Vec<StackFrame> {
    (0..count)
        .map(|depth| {
            StackFrame::new(
                10 + depth as u32,
                Some(format!("frame{}", depth).as_str()),
                "/nonexistent/lsrev/sample.rs",
            )
        })
        .collect()
}
