// utils.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Small helpers shared across the crate.

use crate::utils::files::{get_bytes_from_os_str, get_os_str_from_bytes};
use lazy_static::lazy_static;
use regex::bytes::{Captures, Regex};
use std::borrow::Cow;

pub mod files;

pub trait SliceExt {
    fn trim_end(&self) -> &Self;
    fn trim_start(&self) -> &Self;
    fn trim(&self) -> &Self;
    fn drop_prefix(&self, needle: &Self) -> Option<&Self>;
    fn split_2(&self, separator: u8) -> Option<(&[u8], &[u8])>;
}

fn is_not_whitespace(c: &u8) -> bool {
    !(*c as char).is_whitespace()
}

impl SliceExt for [u8] {
    fn trim_end(&self) -> &[u8] {
        if let Some(last) = self.iter().rposition(is_not_whitespace) {
            &self[..=last]
        } else {
            &[]
        }
    }
    fn trim_start(&self) -> &[u8] {
        if let Some(first) = self.iter().position(is_not_whitespace) {
            &self[first..]
        } else {
            &[]
        }
    }

    /// ```
    /// use lsrev::utils::SliceExt;
    /// assert_eq!(
    ///     b"  to trim  ".trim(),
    ///     b"to trim"
    /// );
    /// assert_eq!(
    ///     b"to trim  ".trim(),
    ///     b"to trim"
    /// );
    /// assert_eq!(
    ///     b"  to trim".trim(),
    ///     b"to trim"
    /// );
    /// ```
    fn trim(&self) -> &[u8] {
        self.trim_start().trim_end()
    }

    fn drop_prefix(&self, needle: &Self) -> Option<&Self> {
        if self.starts_with(needle) {
            Some(&self[needle.len()..])
        } else {
            None
        }
    }

    /// Splits on the first occurrence of `separator`, which is excluded from
    /// both halves.
    fn split_2(&self, separator: u8) -> Option<(&[u8], &[u8])> {
        let mut iter = self.splitn(2, |&byte| byte == separator);
        let a = iter.next()?;
        let b = iter.next()?;
        Some((a, b))
    }
}

/// Expands `$FOO` and `${FOO}` environment variables. Unknown variables are
/// left untouched.
pub fn expand_vars(s: &[u8]) -> Cow<[u8]> {
    lazy_static! {
        static ref VARIABLE_RE: Regex =
            Regex::new(r"\$(\w+|\{(\w+)\})").expect("expected a valid regex");
    }
    VARIABLE_RE.replace_all(s, |captures: &Captures| {
        let name = captures
            .get(2)
            .or_else(|| captures.get(1))
            .map(|m| m.as_bytes())
            .unwrap_or_default();
        std::env::var_os(get_os_str_from_bytes(name))
            .map(get_bytes_from_os_str)
            .unwrap_or_else(|| captures[0].to_owned())
    })
}

/// Quotes `value` so that a POSIX shell reads it back as a single word.
///
/// Only used to make logged command lines copy-pastable.
pub fn shell_quote(value: &[u8]) -> Vec<u8> {
    let is_safe = |byte: &u8| match byte {
        b'a'..=b'z'
        | b'A'..=b'Z'
        | b'0'..=b'9'
        | b'.'
        | b'_'
        | b'/'
        | b'+'
        | b'-'
        | b'='
        | b':'
        | b'@' => true,
        _ => false,
    };
    if !value.is_empty() && value.iter().all(is_safe) {
        return value.to_owned();
    }
    let mut quoted = Vec::with_capacity(value.len() + 2);
    quoted.push(b'\'');
    for &byte in value {
        if byte == b'\'' {
            quoted.extend_from_slice(b"'\\''");
        } else {
            quoted.push(byte);
        }
    }
    quoted.push(b'\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_2() {
        assert_eq!(
            b"ui.color=always".split_2(b'='),
            Some((&b"ui.color"[..], &b"always"[..]))
        );
        assert_eq!(b"a=b=c".split_2(b'='), Some((&b"a"[..], &b"b=c"[..])));
        assert_eq!(b"nothing".split_2(b'='), None);
    }

    #[test]
    fn test_drop_prefix() {
        assert_eq!(b"glob:*.rs".drop_prefix(b"glob:"), Some(&b"*.rs"[..]));
        assert_eq!(b"re:x".drop_prefix(b"glob:"), None);
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote(b"ls-tree"), b"ls-tree".to_vec());
        assert_eq!(shell_quote(b""), b"''".to_vec());
        assert_eq!(shell_quote(b"a b"), b"'a b'".to_vec());
        assert_eq!(shell_quote(b"it's"), b"'it'\\''s'".to_vec());
    }

    #[test]
    fn test_expand_vars() {
        std::env::set_var("LSREV_TEST_EXPAND", "value");
        assert_eq!(
            expand_vars(b"$LSREV_TEST_EXPAND/a/${LSREV_TEST_EXPAND}"),
            &b"value/a/value"[..]
        );
        assert_eq!(
            expand_vars(b"$LSREV_TEST_UNSET_VARIABLE"),
            &b"$LSREV_TEST_UNSET_VARIABLE"[..]
        );
    }
}
