// repo.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

use crate::errors::LsrevError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// The repository given with `-r` when there is none.
pub const DEFAULT_REPOSITORY: &str = ".";

/// Where the tracked files are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepoSource {
    /// A directory on this machine, read with `git ls-tree`
    Local(PathBuf),
    /// A URL or `host:path` location, read with `git archive --remote`
    Remote(String),
}

impl RepoSource {
    /// Decides how to reach the repository at `location`.
    ///
    /// An existing directory is always local, even when its name contains a
    /// colon.
    pub fn locate(location: impl AsRef<OsStr>) -> Result<Self, LsrevError> {
        let location = location.as_ref();
        let path = Path::new(location);
        if path.is_dir() {
            return Ok(RepoSource::Local(path.to_owned()));
        }
        match location.to_str() {
            Some(location) if looks_remote(location) => {
                Ok(RepoSource::Remote(location.to_owned()))
            }
            _ => Err(LsrevError::repository_not_found(
                location.to_string_lossy(),
            )),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, RepoSource::Remote(_))
    }
}

/// `scheme://…` URLs and scp-like `[user@]host:path` locations.
fn looks_remote(location: &str) -> bool {
    if location.contains("://") {
        return true;
    }
    match location.find(':') {
        // A slash before the colon makes it a local path
        Some(colon) => colon > 0 && !location[..colon].contains('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn existing_directories_are_local() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().to_str().unwrap();
        assert_eq!(
            RepoSource::locate(location).unwrap(),
            RepoSource::Local(dir.path().to_owned())
        );
    }

    #[test]
    fn urls_and_scp_locations_are_remote() {
        for location in &[
            "https://example.com/repo.git",
            "ssh://git@example.com/repo",
            "git@example.com:team/repo.git",
            "host:repo",
        ] {
            let source = RepoSource::locate(location).unwrap();
            assert!(source.is_remote(), "{}", location);
        }
    }

    #[test]
    fn anything_else_is_not_found() {
        for location in &["/nonexistent/lsrev/repo", "./a:b", ":repo"] {
            let error = RepoSource::locate(location).unwrap_err();
            assert_eq!(
                error.to_string(),
                format!("abort: repository {} not found", location)
            );
        }
    }
}
