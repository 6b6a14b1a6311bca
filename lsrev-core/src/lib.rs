// lib.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Listing the files a git repository tracks at a revision, and reporting
//! failures with the call stack that led to them.

extern crate log;

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod filepatterns;
pub mod lifecycle;
pub mod logging;
pub mod matchers;
pub mod operations;
pub mod repo;
pub mod testing; // unconditionally built, for use from integration tests
pub mod tool;
pub mod utils;

pub use errors::LsrevError;
pub use filepatterns::{PathPattern, PatternSyntax};
