// files.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Functions for converting between paths and bytes.

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::path::Path;

pub fn get_path_from_bytes(bytes: &[u8]) -> &Path {
    Path::new(get_os_str_from_bytes(bytes))
}

pub fn get_os_str_from_bytes(bytes: &[u8]) -> &OsStr {
    let os_str;
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        os_str = OsStr::from_bytes(bytes);
    }
    // TODO: convert from WTF8 on Windows instead of requiring valid UTF-8.
    #[cfg(not(unix))]
    {
        os_str = OsStr::new(std::str::from_utf8(bytes).unwrap_or_default());
    }
    os_str
}

pub fn get_bytes_from_path(path: impl AsRef<Path>) -> Vec<u8> {
    get_bytes_from_os_str(path.as_ref())
}

pub fn get_bytes_from_os_str(str: impl AsRef<OsStr>) -> Vec<u8> {
    get_bytes_from_os_string(str.as_ref().to_owned())
}

pub fn get_bytes_from_os_string(os_string: OsString) -> Vec<u8> {
    let bytes;
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStringExt;
        bytes = os_string.into_vec();
    }
    #[cfg(not(unix))]
    {
        bytes = os_string.to_string_lossy().into_owned().into_bytes();
    }
    bytes
}

/// Lossy display of a raw repository path, for messages.
pub fn display_bytes(bytes: &[u8]) -> Cow<str> {
    String::from_utf8_lossy(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_bytes_round_trip_on_plain_names() {
        let path = get_path_from_bytes(b"src/main.rs");
        assert_eq!(path, Path::new("src/main.rs"));
        assert_eq!(get_bytes_from_path(path), b"src/main.rs".to_vec());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_bytes_survive() {
        let raw = b"caf\xe9.txt";
        let path = get_path_from_bytes(raw);
        assert_eq!(get_bytes_from_path(path), raw.to_vec());
        assert_eq!(display_bytes(raw), "caf\u{fffd}.txt");
    }
}
