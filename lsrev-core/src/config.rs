// config.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Configuration files and `--config` overrides.

mod config;
mod item;
mod layer;
pub use config::{Config, ConfigSource, ConfigValueParseError};
pub use item::ConfigItem;
pub use layer::{
    ConfigError, ConfigLayer, ConfigOrigin, ConfigParseError, ConfigValue,
};
