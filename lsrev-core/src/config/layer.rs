// layer.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

use super::item::ConfigItem;
use crate::errors::LsrevError;
use crate::utils::expand_vars;
use crate::utils::files::{display_bytes, get_path_from_bytes};
use crate::utils::SliceExt;
use format_bytes::format_bytes;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The values set by one config source.
///
/// A file with `%include` directives gives several layers: the part before
/// the directive, the included file, and the part after it.
#[derive(Clone, Debug)]
pub struct ConfigLayer {
    values: HashMap<ConfigItem, ConfigValue>,
    pub origin: ConfigOrigin,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfigValue {
    pub bytes: Vec<u8>,
    /// 1-based, for values read from a file
    pub line: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// `--config` arguments
    CommandLine,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
            ConfigOrigin::CommandLine => write!(f, "--config"),
        }
    }
}

/// A config file that is not well-formed.
#[derive(Debug)]
pub struct ConfigParseError {
    pub origin: ConfigOrigin,
    pub line: Option<usize>,
    pub message: Vec<u8>,
}

#[derive(Debug, derive_more::From)]
pub enum ConfigError {
    Parse(ConfigParseError),
    Other(LsrevError),
}

/// One line of a config file.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    /// Empty, or a `#` or `;` comment
    Blank,
    Section(&'a [u8]),
    Item { name: &'a [u8], value: &'a [u8] },
    Include(&'a [u8]),
}

impl<'a> Line<'a> {
    /// Reads one line, or returns what is wrong with it.
    fn read(line: &'a [u8]) -> Result<Self, Vec<u8>> {
        let line = line.trim_end();
        match line.first() {
            None | Some(b'#') | Some(b';') => return Ok(Line::Blank),
            Some(first) if first.is_ascii_whitespace() => {
                return Err(format_bytes!(
                    b"unexpected leading whitespace: {}",
                    line
                ))
            }
            _ => {}
        }

        if let Some(header) = line.drop_prefix(b"[") {
            return match header.split_2(b']') {
                Some((name, _)) if !name.trim().is_empty() => {
                    Ok(Line::Section(name.trim()))
                }
                _ => Err(format_bytes!(b"invalid section header: {}", line)),
            };
        }
        if let Some(file) = line.drop_prefix(b"%include") {
            let separated =
                file.first().map_or(false, u8::is_ascii_whitespace);
            return if separated && !file.trim().is_empty() {
                Ok(Line::Include(file.trim()))
            } else {
                Err(format_bytes!(b"invalid include directive: {}", line))
            };
        }
        match line.split_2(b'=') {
            Some((name, value)) if !name.trim().is_empty() => Ok(Line::Item {
                name: name.trim(),
                value: value.trim(),
            }),
            _ => Err(format_bytes!(b"expected 'name = value': {}", line)),
        }
    }
}

impl ConfigLayer {
    pub fn new(origin: ConfigOrigin) -> Self {
        ConfigLayer {
            values: HashMap::new(),
            origin,
        }
    }

    /// Reads `section.name=value` arguments into one layer, or `None` when
    /// there are no arguments.
    pub fn parse_cli_args(
        cli_config_args: impl IntoIterator<Item = impl AsRef<[u8]>>,
    ) -> Result<Option<Self>, ConfigError> {
        let mut layer = Self::new(ConfigOrigin::CommandLine);
        for arg in cli_config_args {
            let arg = arg.as_ref();
            let parsed = arg.split_2(b'=').and_then(|(key, value)| {
                let (section, name) = key.trim().split_2(b'.')?;
                Some((section, name, value.trim()))
            });
            match parsed {
                Some((section, name, value))
                    if !section.is_empty() && !name.is_empty() =>
                {
                    layer.set_known(section, name, value, None)
                }
                _ => {
                    return Err(LsrevError::abort(format!(
                        "abort: malformed --config option: '{}' \
                         (use --config section.name=value)",
                        display_bytes(arg),
                    ))
                    .into())
                }
            }
        }
        Ok(if layer.is_empty() { None } else { Some(layer) })
    }

    /// Reads the config file `src` whose contents are `data`, followed by
    /// the files it includes, in precedence order.
    ///
    /// Included files are relative to the including one. A missing included
    /// file is skipped.
    pub fn parse(src: &Path, data: &[u8]) -> Result<Vec<Self>, ConfigError> {
        let data = data.drop_prefix(b"\xef\xbb\xbf").unwrap_or(data);
        let origin = ConfigOrigin::File(src.to_owned());
        let mut layers = Vec::new();
        let mut current = Self::new(origin.clone());
        let mut section: &[u8] = b"";

        for (index, bytes) in data.split(|byte| *byte == b'\n').enumerate() {
            let line = Some(index + 1);
            let parse_error = |message: Vec<u8>| ConfigParseError {
                origin: origin.clone(),
                line,
                message,
            };
            match Line::read(bytes).map_err(parse_error)? {
                Line::Blank => {}
                Line::Section(name) => section = name,
                Line::Item { name, value } => {
                    current.set_known(section, name, value, line)
                }
                Line::Include(file) => {
                    let file = expand_vars(file);
                    let dir = src.parent().unwrap_or_else(|| Path::new(""));
                    let path = dir.join(get_path_from_bytes(&file));
                    match std::fs::read(&path) {
                        Ok(included) => {
                            let before = std::mem::replace(
                                &mut current,
                                Self::new(origin.clone()),
                            );
                            if !before.is_empty() {
                                layers.push(before);
                            }
                            layers.extend(Self::parse(&path, &included)?);
                        }
                        Err(error)
                            if error.kind() == std::io::ErrorKind::NotFound =>
                        {
                            debug!("skipping missing {}", path.display())
                        }
                        Err(error) => {
                            return Err(parse_error(format_bytes!(
                                b"cannot include {} ({})",
                                file,
                                format_bytes::Utf8(error)
                            ))
                            .into())
                        }
                    }
                }
            }
        }
        if !current.is_empty() {
            layers.push(current);
        }
        Ok(layers)
    }

    /// Sets `section.name` if it is a known item, warns otherwise.
    fn set_known(
        &mut self,
        section: &[u8],
        name: &[u8],
        value: &[u8],
        line: Option<usize>,
    ) {
        match ConfigItem::lookup(section, name) {
            Some(item) => self.set(item, value.to_owned(), line),
            None => warn!(
                "{}{}: ignoring unknown config item {}.{}",
                self.origin,
                line.map(|line| format!(":{}", line)).unwrap_or_default(),
                display_bytes(section),
                display_bytes(name)
            ),
        }
    }

    /// Sets `item`, replacing an earlier value from the same layer.
    pub fn set(
        &mut self,
        item: ConfigItem,
        bytes: Vec<u8>,
        line: Option<usize>,
    ) {
        self.values.insert(item, ConfigValue { bytes, line });
    }

    pub fn get(&self, item: ConfigItem) -> Option<&ConfigValue> {
        self.values.get(&item)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
