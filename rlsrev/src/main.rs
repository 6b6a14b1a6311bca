// main.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

extern crate log;
use crate::error::CommandError;
use crate::ui::Ui;
use clap::App;
use clap::AppSettings;
use clap::Arg;
use clap::ArgMatches;
use lsrev::config::Config;
use lsrev::diagnostics::log_stack_trace;
use lsrev::lifecycle::{ExitContext, Lifecycle, LifecycleEvent};
use lsrev::logging::{format_record, level_filter_for_verbosity, ColorMode};
use lsrev::utils::files::get_bytes_from_os_str;
use std::io::Write;

mod commands;
mod error;
mod exitcode;
mod ui;

/// Overrides the level set with `-v`, with `env_logger` filter syntax
const LOG_ENV_VAR: &str = "RLSREV_LOG";

fn app() -> App<'static, 'static> {
    App::new("rlsrev")
        .setting(AppSettings::AllowInvalidUtf8)
        .setting(AppSettings::DisableVersion)
        .about(commands::files::HELP_TEXT)
        .arg(
            Arg::with_name("verbose")
                .help("log more (repeat for even more)")
                .short("v")
                .multiple(true),
        )
        .arg(
            Arg::with_name("null")
                .help("end each file name with NUL instead of newline")
                .short("z"),
        )
        .arg(
            Arg::with_name("repository")
                .help("repository directory or remote location [default: .]")
                .short("r")
                .value_name("REPOSITORY")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("tree-ish")
                .help("revision to list [default: HEAD]")
                .short("t")
                .value_name("TREE-ISH")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("config")
                .help("set a configuration item")
                .long("config")
                .value_name("SECTION.NAME=VALUE")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(Arg::with_name("show-context").long("show-context").hidden(true))
        .arg(
            Arg::with_name("pattern")
                .help("only list files matching these patterns")
                .value_name("PATTERN")
                .multiple(true),
        )
}

/// What every command gets to work with
pub struct CliInvocation<'a> {
    ui: &'a Ui,
    matches: &'a ArgMatches<'a>,
    config: &'a Config,
}

fn main() {
    let ui = Ui::new();
    let matches = app().get_matches_safe().unwrap_or_else(|error| {
        exit_for_usage_error(&ui, error)
    });

    let config_args = matches
        .values_of_os("config")
        .into_iter()
        .flatten()
        .map(get_bytes_from_os_str);
    let config = Config::load(config_args)
        .unwrap_or_else(|error| exit_before_traps(&ui, error.into()));
    let color = config
        .color_mode()
        .unwrap_or_else(|error| exit_before_traps(&ui, error.into()));
    init_logger(matches.occurrences_of("verbose"), color);

    let lifecycle = setup_lifecycle(&config)
        .unwrap_or_else(|error| exit_before_traps(&ui, error));

    let invocation = CliInvocation {
        ui: &ui,
        matches: &matches,
        config: &config,
    };
    let result = if matches.is_present("show-context") {
        commands::show_context::run(&invocation)
    } else {
        commands::files::run(&invocation)
    };
    exit(&ui, lifecycle, result)
}

/// Installs the stack trace walker as an exit trap, unless disabled with
/// `trace.enabled`.
fn setup_lifecycle(config: &Config) -> Result<Lifecycle, CommandError> {
    let mut lifecycle = Lifecycle::new();
    if config.trace_enabled()? {
        let max_depth = config.trace_max_depth()?;
        lifecycle.append_trap(
            LifecycleEvent::Exit,
            "stack trace",
            move |context: &ExitContext| {
                log_stack_trace(
                    context.exit_code,
                    &context.trace,
                    max_depth,
                    log::logger(),
                )
            },
        );
    }
    Ok(lifecycle)
}

fn init_logger(verbosity: u64, color: ColorMode) {
    let colored = color.use_color();
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_filter_for_verbosity(verbosity))
        .parse_env(LOG_ENV_VAR)
        .target(env_logger::Target::Stderr)
        .format(move |buf, record| {
            writeln!(
                buf,
                "{}",
                format_record(record.level(), record.args(), colored)
            )
        });
    // Only fails when a logger is already installed
    let _ = builder.try_init();
}

fn exit_for_usage_error(ui: &Ui, error: clap::Error) -> ! {
    let message = format!("{}\n", error.message);
    if error.kind == clap::ErrorKind::HelpDisplayed {
        let _ = ui.write_stdout(message.as_bytes());
        std::process::exit(exitcode::OK)
    }
    let _ = ui.write_stderr(message.as_bytes());
    std::process::exit(exitcode::USAGE)
}

/// For failures that happen before the exit traps are in place
fn exit_before_traps(ui: &Ui, error: CommandError) -> ! {
    exit(ui, Lifecycle::new(), Err(error))
}

fn exit(
    ui: &Ui,
    lifecycle: Lifecycle,
    result: Result<(), CommandError>,
) -> ! {
    let context = match result {
        Ok(()) => ExitContext::success(),
        Err(error) => {
            // A failure to report the error does not change the exit code
            let _ = ui.write_stderr_line(error.message());
            let (exit_code, trace) = error.into_exit_parts();
            ExitContext::failure(exit_code, trace)
        }
    };
    std::process::exit(lifecycle.terminate(&context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<ArgMatches<'static>, clap::Error> {
        app().get_matches_from_safe(
            std::iter::once("rlsrev").chain(args.iter().copied()),
        )
    }

    #[test]
    fn defaults() {
        let matches = parse(&[]).unwrap();
        assert_eq!(matches.occurrences_of("verbose"), 0);
        assert!(!matches.is_present("null"));
        assert_eq!(matches.value_of("repository"), None);
        assert_eq!(matches.value_of("tree-ish"), None);
    }

    #[test]
    fn all_options() {
        let matches = parse(&[
            "-vv",
            "-z",
            "-r",
            "/srv/repo",
            "-t",
            "v1.0",
            "--config",
            "ui.color=never",
            "--config",
            "trace.max-depth=5",
            "src/*.rs",
            "re:.*\\.toml$",
        ])
        .unwrap();
        assert_eq!(matches.occurrences_of("verbose"), 2);
        assert!(matches.is_present("null"));
        assert_eq!(matches.value_of("repository"), Some("/srv/repo"));
        assert_eq!(matches.value_of("tree-ish"), Some("v1.0"));
        assert_eq!(
            matches.values_of("config").unwrap().collect::<Vec<_>>(),
            vec!["ui.color=never", "trace.max-depth=5"]
        );
        assert_eq!(
            matches.values_of("pattern").unwrap().collect::<Vec<_>>(),
            vec!["src/*.rs", "re:.*\\.toml$"]
        );
    }

    #[test]
    fn help_is_not_an_error_exit() {
        let error = parse(&["-h"]).unwrap_err();
        assert_eq!(error.kind, clap::ErrorKind::HelpDisplayed);
        assert!(error.message.contains("-z"));
        assert!(!error.message.contains("show-context"));
    }

    #[test]
    fn usage_errors() {
        assert_eq!(
            parse(&["--bogus"]).unwrap_err().kind,
            clap::ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["-r"]).unwrap_err().kind,
            clap::ErrorKind::EmptyValue
        );
        assert_eq!(
            parse(&["-t", "a", "-t", "b"]).unwrap_err().kind,
            clap::ErrorKind::UnexpectedMultipleUsage
        );
    }

    #[test]
    fn hidden_show_context_flag() {
        let matches =
            parse(&["--show-context", "10", "main", "a.rs"]).unwrap();
        assert!(matches.is_present("show-context"));
        assert_eq!(matches.values_of("pattern").unwrap().count(), 3);
    }

    #[test]
    fn trace_config() {
        let config = Config::load_from_explicit_sources(vec![]).unwrap();
        let lifecycle = setup_lifecycle(&config).unwrap();
        assert_eq!(
            lifecycle.handler_names(LifecycleEvent::Exit),
            vec!["stack trace"]
        );

        let layer = lsrev::config::ConfigLayer::parse_cli_args(vec![
            "trace.enabled=no",
        ])
        .unwrap()
        .unwrap();
        let config = Config::load_from_explicit_sources(vec![
            lsrev::config::ConfigSource::Parsed(layer),
        ])
        .unwrap();
        let lifecycle = setup_lifecycle(&config).unwrap();
        assert!(lifecycle.handler_names(LifecycleEvent::Exit).is_empty());
    }

    #[test]
    fn bad_trace_config_is_a_config_error() {
        let layer = lsrev::config::ConfigLayer::parse_cli_args(vec![
            "trace.max-depth=deep",
        ])
        .unwrap()
        .unwrap();
        let config = Config::load_from_explicit_sources(vec![
            lsrev::config::ConfigSource::Parsed(layer),
        ])
        .unwrap();
        let error = setup_lifecycle(&config).unwrap_err();
        assert_eq!(error.exit_code(), exitcode::CONFIG_ERROR_ABORT);
    }
}
