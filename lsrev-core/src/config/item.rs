// item.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

use std::fmt;

/// Every configuration item `rlsrev` reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigItem {
    /// `ui.color`: `auto`, `always` or `never`
    UiColor,
    /// `trace.enabled`: print the stack of a failure when exiting
    TraceEnabled,
    /// `trace.max-depth`: how many frames past the innermost one
    TraceMaxDepth,
    /// `tools.git`
    ToolsGit,
    /// `tools.tar`
    ToolsTar,
}

const ALL_ITEMS: [ConfigItem; 5] = [
    ConfigItem::UiColor,
    ConfigItem::TraceEnabled,
    ConfigItem::TraceMaxDepth,
    ConfigItem::ToolsGit,
    ConfigItem::ToolsTar,
];

impl ConfigItem {
    /// Section and name, as written in config files
    pub fn key(self) -> (&'static [u8], &'static [u8]) {
        match self {
            ConfigItem::UiColor => (b"ui", b"color"),
            ConfigItem::TraceEnabled => (b"trace", b"enabled"),
            ConfigItem::TraceMaxDepth => (b"trace", b"max-depth"),
            ConfigItem::ToolsGit => (b"tools", b"git"),
            ConfigItem::ToolsTar => (b"tools", b"tar"),
        }
    }

    pub fn lookup(section: &[u8], name: &[u8]) -> Option<Self> {
        ALL_ITEMS.iter().copied().find(|item| {
            let (item_section, item_name) = item.key();
            item_section == section && item_name == name
        })
    }

    /// Shown in messages about a value that does not parse
    pub fn expected_type(self) -> &'static str {
        match self {
            ConfigItem::UiColor => "color mode",
            ConfigItem::TraceEnabled => "boolean",
            ConfigItem::TraceMaxDepth => "integer",
            ConfigItem::ToolsGit | ConfigItem::ToolsTar => "program",
        }
    }
}

impl fmt::Display for ConfigItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (section, name) = self.key();
        write!(
            f,
            "{}.{}",
            String::from_utf8_lossy(section),
            String::from_utf8_lossy(name)
        )
    }
}

pub(super) fn parse_bool(value: &[u8]) -> Option<bool> {
    const TRUE: &[&[u8]] = &[b"1", b"yes", b"true", b"on"];
    const FALSE: &[&[u8]] = &[b"0", b"no", b"false", b"off"];
    let value = value.to_ascii_lowercase();
    if TRUE.iter().any(|word| *word == value.as_slice()) {
        Some(true)
    } else if FALSE.iter().any(|word| *word == value.as_slice()) {
        Some(false)
    } else {
        None
    }
}

pub(super) fn parse_u32(value: &[u8]) -> Option<u32> {
    std::str::from_utf8(value).ok()?.parse().ok()
}
