// filepatterns.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Path patterns given on the command line, and their translation to regular
//! expressions.

use crate::utils::SliceExt;

/// Appended to the regex of a glob, so that naming a directory selects
/// everything below it
const GLOB_SUFFIX: &[u8] = b"(?:/|$)";

/// Bytes that stand for themselves in a glob but not in a regex
const REGEX_SPECIAL: &[u8] = b"\\.+*?()|[]{}^$#&-~";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PatternSyntax {
    /// The default: a glob rooted at the top of the repository
    Glob,
    /// `re:`, a regex anchored at the start of the path
    Regexp,
}

/// One path pattern from the command line.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct PathPattern {
    pub syntax: PatternSyntax,
    pub pattern: Vec<u8>,
}

impl PathPattern {
    pub fn new(syntax: PatternSyntax, pattern: &[u8]) -> Self {
        Self {
            syntax,
            pattern: pattern.to_owned(),
        }
    }

    /// `re:` makes a regex, an optional `glob:` is dropped.
    ///
    /// Any other argument is a glob as a whole, colons included.
    pub fn parse(arg: &[u8]) -> Self {
        if let Some(regex) = arg.drop_prefix(b"re:") {
            Self::new(PatternSyntax::Regexp, regex)
        } else {
            let glob = arg.drop_prefix(b"glob:").unwrap_or(arg);
            Self::new(PatternSyntax::Glob, glob)
        }
    }

    /// The unanchored regex for this pattern. The matcher anchors it at the
    /// start of the repository path.
    pub fn to_regex(&self) -> Vec<u8> {
        match self.syntax {
            PatternSyntax::Regexp => self.pattern.clone(),
            PatternSyntax::Glob => {
                let mut glob = self.pattern.as_slice();
                while let Some(rest) = glob.drop_prefix(b"./") {
                    glob = rest;
                }
                [glob_to_regex(glob).as_slice(), GLOB_SUFFIX].concat()
            }
        }
    }
}

/// `*` and `?` stay within one directory, `**` crosses them.
fn glob_to_regex(glob: &[u8]) -> Vec<u8> {
    let mut regex = Vec::with_capacity(glob.len() * 2);
    let mut input = glob;
    let mut open_braces = 0;

    while let Some((byte, rest)) = input.split_first() {
        input = rest;
        match byte {
            b'*' => {
                if let Some(rest) = input.drop_prefix(b"*/") {
                    input = rest;
                    regex.extend_from_slice(b"(?:.*/)?");
                } else if let Some(rest) = input.drop_prefix(b"*") {
                    input = rest;
                    regex.extend_from_slice(b".*");
                } else {
                    regex.extend_from_slice(b"[^/]*");
                }
            }
            b'?' => regex.extend_from_slice(b"[^/]"),
            b'[' => match bracket_class(input) {
                Some((class, rest)) => {
                    input = rest;
                    regex.extend(class);
                }
                None => push_literal(&mut regex, b'['),
            },
            b'{' => {
                open_braces += 1;
                regex.extend_from_slice(b"(?:");
            }
            b'}' if open_braces > 0 => {
                open_braces -= 1;
                regex.push(b')');
            }
            b',' if open_braces > 0 => regex.push(b'|'),
            b'\\' => match input.split_first() {
                Some((escaped, rest)) => {
                    input = rest;
                    push_literal(&mut regex, *escaped);
                }
                None => push_literal(&mut regex, b'\\'),
            },
            _ => push_literal(&mut regex, *byte),
        }
    }
    for _ in 0..open_braces {
        regex.push(b')');
    }
    regex
}

/// Translates the `[...]` class that `input` starts right after the `[`,
/// returning it and what follows. `None` when it is never closed.
///
/// A `]` right after the opening bracket is part of the class.
fn bracket_class(input: &[u8]) -> Option<(Vec<u8>, &[u8])> {
    let end = 1 + input.get(1..)?.iter().position(|byte| *byte == b']')?;
    let mut class = vec![b'['];
    for (index, byte) in input[..end].iter().enumerate() {
        match byte {
            b'!' if index == 0 => class.push(b'^'),
            b'^' if index == 0 => class.extend_from_slice(b"\\^"),
            b'\\' | b'[' => class.extend_from_slice(&[b'\\', *byte]),
            _ => class.push(*byte),
        }
    }
    class.push(b']');
    Some((class, &input[end + 1..]))
}

fn push_literal(regex: &mut Vec<u8>, byte: u8) {
    if REGEX_SPECIAL.contains(&byte) {
        regex.push(b'\\');
    }
    regex.push(byte);
}
