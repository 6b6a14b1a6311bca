use crate::error::CommandError;
use crate::ui::RecordSeparator;
use lsrev::config::ConfigItem;
use lsrev::filepatterns::PathPattern;
use lsrev::matchers::build_matcher;
use lsrev::operations::{list_tree_files, ListingTools, DEFAULT_TREE_ISH};
use lsrev::repo::{RepoSource, DEFAULT_REPOSITORY};
use lsrev::utils::files::get_bytes_from_os_str;
use std::ffi::OsStr;

pub const HELP_TEXT: &str = "
List the files tracked by a git repository at a given revision.

Returns 0 on success, or the exit code of the failing git or tar command.
";

pub fn run(invocation: &crate::CliInvocation) -> Result<(), CommandError> {
    let args = invocation.matches;
    let location = args
        .value_of_os("repository")
        .unwrap_or_else(|| OsStr::new(DEFAULT_REPOSITORY));
    let tree_ish = args
        .value_of_os("tree-ish")
        .map(|tree_ish| tree_ish.to_string_lossy())
        .unwrap_or_else(|| DEFAULT_TREE_ISH.into());
    let patterns: Vec<PathPattern> = args
        .values_of_os("pattern")
        .into_iter()
        .flatten()
        .map(|arg| PathPattern::parse(&get_bytes_from_os_str(arg)))
        .collect();
    let separator = if args.is_present("null") {
        RecordSeparator::Nul
    } else {
        RecordSeparator::Newline
    };

    let source = RepoSource::locate(location)?;
    let matcher = build_matcher(&patterns)?;
    let tools = listing_tools(invocation);
    let files = list_tree_files(&source, &tree_ish, &tools, &*matcher)?;

    let mut stdout = invocation.ui.stdout_buffer();
    for file in files.iter() {
        stdout.write_record(file, separator)?;
    }
    stdout.flush()?;
    Ok(())
}

/// `tools.git` and `tools.tar`, when configured
fn listing_tools(invocation: &crate::CliInvocation) -> ListingTools {
    let config = invocation.config;
    let mut tools = ListingTools::default();
    if let Some(git) = config.program(ConfigItem::ToolsGit) {
        tools.git = git.to_owned();
    }
    if let Some(tar) = config.program(ConfigItem::ToolsTar) {
        tools.tar = tar.to_owned();
    }
    tools
}
