// matchers.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Structs and types for matching repository paths.

use crate::errors::LsrevError;
use crate::filepatterns::PathPattern;
use regex::bytes::{Regex, RegexBuilder};
use std::fmt::{Debug, Error, Formatter};

pub trait Matcher: Debug {
    /// Returns whether `filename` is matched by this matcher
    fn matches(&self, filename: &[u8]) -> bool;
}

/// Matches everything.
///```
/// use lsrev::matchers::{AlwaysMatcher, Matcher};
///
/// let matcher = AlwaysMatcher;
///
/// assert_eq!(matcher.matches(b"whatever"), true);
/// assert_eq!(matcher.matches(b"b.txt"), true);
/// assert_eq!(matcher.matches(b"main.c"), true);
/// ```
#[derive(Debug)]
pub struct AlwaysMatcher;

impl Matcher for AlwaysMatcher {
    fn matches(&self, _filename: &[u8]) -> bool {
        true
    }
}

/// Matches the paths matched by any of the given patterns.
///
///```
/// use lsrev::filepatterns::PathPattern;
/// use lsrev::matchers::{PatternMatcher, Matcher};
///
/// let patterns = [PathPattern::parse(b"src/*.rs")];
/// let matcher = PatternMatcher::new(&patterns).unwrap();
///
/// assert_eq!(matcher.matches(b"src/lib.rs"), true);
/// assert_eq!(matcher.matches(b"src/lib.c"), false);
/// assert_eq!(matcher.matches(b"tests/lib.rs"), false);
/// ```
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    pub fn new(patterns: &[PathPattern]) -> Result<Self, LsrevError> {
        let alternatives: Vec<Vec<u8>> = patterns
            .iter()
            .map(|pattern| {
                [b"(?:", pattern.to_regex().as_slice(), b")"].concat()
            })
            .collect();
        let source =
            [b"^(?:", alternatives.join(&b'|').as_slice(), b")"].concat();
        let built = RegexBuilder::new(&escape_non_ascii(&source))
            .unicode(false)
            .build();
        match built {
            Ok(regex) => Ok(Self { regex }),
            Err(error) => Err(LsrevError::invalid_pattern(error.to_string())),
        }
    }
}

impl Matcher for PatternMatcher {
    fn matches(&self, filename: &[u8]) -> bool {
        self.regex.is_match(filename)
    }
}

impl Debug for PatternMatcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        f.debug_struct("PatternMatcher")
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

/// The matcher for positional `PATTERN` arguments: everything when there are
/// none.
pub fn build_matcher(
    patterns: &[PathPattern],
) -> Result<Box<dyn Matcher>, LsrevError> {
    if patterns.is_empty() {
        Ok(Box::new(AlwaysMatcher))
    } else {
        Ok(Box::new(PatternMatcher::new(patterns)?))
    }
}

/// Regex sources are `str`, paths are bytes: non-ASCII bytes become `\xNN`
/// escapes so that they match byte for byte.
fn escape_non_ascii(source: &[u8]) -> String {
    let mut escaped = String::with_capacity(source.len());
    for byte in source {
        if byte.is_ascii() {
            escaped.push(*byte as char);
        } else {
            escaped.push_str(&format!("\\x{:02x}", byte));
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matcher(args: &[&str]) -> PatternMatcher {
        let patterns: Vec<_> = args
            .iter()
            .map(|arg| PathPattern::parse(arg.as_bytes()))
            .collect();
        PatternMatcher::new(&patterns).unwrap()
    }

    #[test]
    fn globs_are_rooted_and_match_below_directories() {
        let m = matcher(&["src"]);
        assert!(m.matches(b"src/lib.rs"));
        assert!(m.matches(b"src/deep/mod.rs"));
        assert!(!m.matches(b"srcs/lib.rs"));
        assert!(!m.matches(b"lib/src/a.rs"));
    }

    #[test]
    fn star_stays_in_its_directory() {
        let m = matcher(&["*.toml"]);
        assert!(m.matches(b"Cargo.toml"));
        assert!(!m.matches(b"crate/Cargo.toml"));
        let m = matcher(&["**.toml"]);
        assert!(m.matches(b"crate/Cargo.toml"));
        let m = matcher(&["**/Cargo.toml"]);
        assert!(m.matches(b"Cargo.toml"));
        assert!(m.matches(b"a/b/Cargo.toml"));
    }

    #[test]
    fn braces_and_classes() {
        let m = matcher(&["{src,tests}/[a-c]*.rs"]);
        assert!(m.matches(b"src/base.rs"));
        assert!(m.matches(b"tests/cli.rs"));
        assert!(!m.matches(b"src/main.rs"));
        assert!(!m.matches(b"docs/a.rs"));
    }

    #[test]
    fn regexes_are_anchored_at_the_start() {
        let m = matcher(&[r"re:.*\.md$"]);
        assert!(m.matches(b"README.md"));
        assert!(m.matches(b"docs/guide.md"));
        assert!(!m.matches(b"README.md.orig"));
        let m = matcher(&["re:test"]);
        assert!(m.matches(b"tests/a.rs"));
        assert!(!m.matches(b"src/tests/a.rs"));
    }

    #[test]
    fn prefixes_other_than_re_and_glob_are_part_of_the_glob() {
        let m = matcher(&["path:docs"]);
        assert!(m.matches(b"path:docs/a.txt"));
        assert!(!m.matches(b"docs/a.txt"));
        let m = matcher(&["glob:docs"]);
        assert!(m.matches(b"docs/a.txt"));
    }

    #[test]
    fn any_pattern_may_match() {
        let m = matcher(&["Cargo.toml", "re:src/.*"]);
        assert!(m.matches(b"Cargo.toml"));
        assert!(m.matches(b"src/x"));
        assert!(!m.matches(b"README"));
    }

    #[test]
    fn non_ascii_paths() {
        let m = matcher(&["caf\u{e9}/*"]);
        assert!(m.matches("caf\u{e9}/menu".as_bytes()));
        assert!(!m.matches(b"cafe/menu"));
        assert_eq!(escape_non_ascii(b"a\xe9"), r"a\xe9");
    }

    #[test]
    fn invalid_regex_is_an_invalid_pattern() {
        let error = PatternMatcher::new(&[PathPattern::parse(b"re:(unclosed")])
            .unwrap_err();
        assert!(matches!(error, LsrevError::InvalidPattern { .. }));
        assert!(error.to_string().starts_with("abort: invalid pattern: "));
    }

    #[test]
    fn no_pattern_matches_everything() {
        let m = build_matcher(&[]).unwrap();
        assert!(m.matches(b"anything/at/all"));
        let m = build_matcher(&[PathPattern::parse(b"a")]).unwrap();
        assert!(m.matches(b"a/b"));
        assert!(!m.matches(b"b"));
    }
}
