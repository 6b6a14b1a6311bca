// list_tree_files.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

use crate::errors::LsrevError;
use crate::matchers::Matcher;
use crate::repo::RepoSource;
use crate::tool::Tool;
use log::info;
use micro_timer::timed;
use std::ffi::OsString;

/// The revision listed when none is given.
pub const DEFAULT_TREE_ISH: &str = "HEAD";

/// The external programs doing the listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingTools {
    pub git: OsString,
    pub tar: OsString,
}

impl Default for ListingTools {
    fn default() -> Self {
        Self {
            git: OsString::from("git"),
            tar: OsString::from("tar"),
        }
    }
}

impl ListingTools {
    /// `git -C <repo> ls-tree -r -z --name-only <tree-ish>`
    fn ls_tree(&self, repo: &std::path::Path, tree_ish: &str) -> Tool {
        Tool::new(&self.git)
            .arg("-C")
            .arg(repo)
            .args(&["ls-tree", "-r", "-z", "--name-only"])
            .arg(tree_ish)
    }

    /// `git archive --format=tar --remote=<repo> <tree-ish>`
    fn archive(&self, remote: &str, tree_ish: &str) -> Tool {
        Tool::new(&self.git)
            .arg("archive")
            .arg("--format=tar")
            .arg(format!("--remote={}", remote))
            .arg(tree_ish)
    }

    /// `tar -tf -`
    fn tar_list(&self) -> Tool {
        Tool::new(&self.tar).args(&["-tf", "-"])
    }
}

/// Lists the files tracked at `tree_ish` in the repository at `source`
/// that `matcher` accepts, in the order git gives them.
#[timed]
pub fn list_tree_files(
    source: &RepoSource,
    tree_ish: &str,
    tools: &ListingTools,
    matcher: &dyn Matcher,
) -> Result<FilesForTree, LsrevError> {
    info!("listing {:?} at {}", source, tree_ish);
    let (output, separator) = match source {
        RepoSource::Local(path) => {
            (tools.ls_tree(path, tree_ish).output()?, b'\0')
        }
        RepoSource::Remote(location) => {
            let archive = tools.archive(location, tree_ish);
            (archive.pipe_into(&tools.tar_list())?, b'\n')
        }
    };
    Ok(FilesForTree::parse(&output, separator, matcher))
}

/// Repository-relative paths of tracked files.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FilesForTree {
    paths: Vec<Vec<u8>>,
}

impl FilesForTree {
    /// Splits tool output into paths, dropping empty records and directory
    /// entries.
    fn parse(output: &[u8], separator: u8, matcher: &dyn Matcher) -> Self {
        let paths = output
            .split(|byte| *byte == separator)
            .filter(|path| !path.is_empty() && !path.ends_with(b"/"))
            .filter(|path| matcher.matches(path))
            .map(|path| path.to_owned())
            .collect();
        Self { paths }
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.paths.iter().map(|path| path.as_slice())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filepatterns::PathPattern;
    use crate::matchers::{AlwaysMatcher, PatternMatcher};
    use pretty_assertions::assert_eq;

    fn paths(files: &FilesForTree) -> Vec<&[u8]> {
        files.iter().collect()
    }

    #[test]
    fn nul_separated_output() {
        let output = b"Cargo.toml\0src/lib.rs\0";
        let files = FilesForTree::parse(output, b'\0', &AlwaysMatcher);
        assert_eq!(paths(&files), vec![&b"Cargo.toml"[..], b"src/lib.rs"]);
    }

    #[test]
    fn directory_entries_are_dropped() {
        let files = FilesForTree::parse(
            b"repo/\nrepo/a.txt\nrepo/docs/\nrepo/docs/b.md\n",
            b'\n',
            &AlwaysMatcher,
        );
        assert_eq!(
            paths(&files),
            vec![&b"repo/a.txt"[..], b"repo/docs/b.md"]
        );
    }

    #[test]
    fn the_matcher_filters() {
        let matcher =
            PatternMatcher::new(&[PathPattern::parse(b"**.rs")]).unwrap();
        let files =
            FilesForTree::parse(b"a.rs\0b.c\0src/c.rs\0", b'\0', &matcher);
        assert_eq!(paths(&files), vec![&b"a.rs"[..], b"src/c.rs"]);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn git_command_lines() {
        let tools = ListingTools::default();
        assert_eq!(
            tools
                .ls_tree(std::path::Path::new("/srv/repo"), "v1.0")
                .command_line(),
            b"git -C /srv/repo ls-tree -r -z --name-only v1.0".to_vec()
        );
        assert_eq!(
            tools.archive("host:repo", "HEAD").command_line(),
            b"git archive --format=tar --remote=host:repo HEAD".to_vec()
        );
        assert_eq!(tools.tar_list().command_line(), b"tar -tf -".to_vec());
    }
}
