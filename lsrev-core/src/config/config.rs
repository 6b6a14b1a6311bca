// config.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

use super::item::{parse_bool, parse_u32, ConfigItem};
use super::layer::{ConfigError, ConfigLayer, ConfigOrigin, ConfigValue};
use crate::diagnostics::{Trace, DEFAULT_MAX_DEPTH};
use crate::errors::IoResultExt;
use crate::logging::ColorMode;
use crate::utils::files::{display_bytes, get_os_str_from_bytes};
use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;

/// Environment variable naming the user config file, replacing `~/.lsrevrc`
pub const CONFIG_PATH_VAR: &str = "LSREVRC";

/// Holds the config values of the current invocation, from every source
pub struct Config {
    layers: Vec<ConfigLayer>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.layers.iter().rev()).finish()
    }
}

pub enum ConfigSource {
    /// Path to a config file, skipped when missing
    AbsPath(PathBuf),
    /// Already parsed (from the CLI)
    Parsed(ConfigLayer),
}

/// A value that is not of the type its item expects.
#[derive(Debug)]
pub struct ConfigValueParseError {
    pub origin: ConfigOrigin,
    pub line: Option<usize>,
    pub item: ConfigItem,
    pub value: Vec<u8>,
    /// Where the value was asked for
    pub trace: Trace,
}

impl fmt::Display for ConfigValueParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "config error at {}", self.origin)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        write!(
            f,
            ": {} is not a valid {} ('{}')",
            self.item,
            self.item.expected_type(),
            display_bytes(&self.value),
        )
    }
}

impl Config {
    /// Later sources take precedence over earlier ones.
    pub fn load_from_explicit_sources(
        sources: Vec<ConfigSource>,
    ) -> Result<Self, ConfigError> {
        let mut layers = vec![];
        for source in sources {
            match source {
                ConfigSource::Parsed(layer) => layers.push(layer),
                ConfigSource::AbsPath(path) => {
                    let data = std::fs::read(&path)
                        .when_reading_optional_file(&path)?;
                    if let Some(data) = data {
                        layers.extend(ConfigLayer::parse(&path, &data)?)
                    }
                }
            }
        }
        Ok(Config { layers })
    }

    /// Loads the user config file, then the `--config` arguments which take
    /// precedence over it.
    ///
    /// The user config file is `$LSREVRC` if set, `~/.lsrevrc` otherwise.
    pub fn load(
        cli_config_args: impl IntoIterator<Item = impl AsRef<[u8]>>,
    ) -> Result<Self, ConfigError> {
        let mut sources = Vec::new();
        if let Some(path) = user_config_path() {
            sources.push(ConfigSource::AbsPath(path));
        }
        if let Some(layer) = ConfigLayer::parse_cli_args(cli_config_args)? {
            sources.push(ConfigSource::Parsed(layer));
        }
        Self::load_from_explicit_sources(sources)
    }

    /// An empty config: every item has its default value.
    pub fn empty() -> Self {
        Config { layers: Vec::new() }
    }

    /// `ui.color`, `auto` by default
    #[track_caller]
    pub fn color_mode(&self) -> Result<ColorMode, ConfigValueParseError> {
        Ok(self
            .get_parse(ConfigItem::UiColor, ColorMode::parse)?
            .unwrap_or_default())
    }

    /// `trace.enabled`, on by default
    #[track_caller]
    pub fn trace_enabled(&self) -> Result<bool, ConfigValueParseError> {
        Ok(self
            .get_parse(ConfigItem::TraceEnabled, parse_bool)?
            .unwrap_or(true))
    }

    /// `trace.max-depth`
    #[track_caller]
    pub fn trace_max_depth(&self) -> Result<usize, ConfigValueParseError> {
        Ok(self
            .get_parse(ConfigItem::TraceMaxDepth, parse_u32)?
            .map_or(DEFAULT_MAX_DEPTH, |depth| depth as usize))
    }

    /// The program configured for `tools.git` or `tools.tar`, if any.
    pub fn program(&self, item: ConfigItem) -> Option<&OsStr> {
        let (_, value) = self.get_inner(item)?;
        Some(get_os_str_from_bytes(&value.bytes)).filter(|p| !p.is_empty())
    }

    #[track_caller]
    fn get_parse<T>(
        &self,
        item: ConfigItem,
        parse: impl Fn(&[u8]) -> Option<T>,
    ) -> Result<Option<T>, ConfigValueParseError> {
        let (layer, value) = match self.get_inner(item) {
            Some(found) => found,
            None => return Ok(None),
        };
        match parse(&value.bytes) {
            Some(parsed) => Ok(Some(parsed)),
            None => Err(ConfigValueParseError {
                origin: layer.origin.clone(),
                line: value.line,
                item,
                value: value.bytes.clone(),
                trace: Trace::capture(),
            }),
        }
    }

    /// The layer and value with the highest precedence.
    fn get_inner(
        &self,
        item: ConfigItem,
    ) -> Option<(&ConfigLayer, &ConfigValue)> {
        self.layers
            .iter()
            .rev()
            .find_map(|layer| Some((layer, layer.get(item)?)))
    }

    /// Every value of `item`, highest precedence first.
    #[cfg(test)]
    fn get_all(&self, item: ConfigItem) -> Vec<&[u8]> {
        self.layers
            .iter()
            .rev()
            .filter_map(|layer| layer.get(item))
            .map(|value| value.bytes.as_slice())
            .collect()
    }
}

fn user_config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_PATH_VAR) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs::home_dir().map(|home| home.join(".lsrevrc")),
    }
}
