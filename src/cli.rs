//! # CLI Module / 命令行模块
//!
//! Builds the command line of a harness binary and turns it into [`CliArgs`].
//! The verbosity flags override each other, so the last one given wins.
//! Repeating a flag is allowed.
//!
//! 构建测试程序的命令行并将其解析为 [`CliArgs`]。详细程度标志相互覆盖，
//! 以最后一个为准；标志可以重复。

pub mod commands;

use crate::infra::logging::{LogDirective, Verbosity};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

/// Printed after the option list of `--help`.
const TAGS_HELP: &str = "\
By default this runs all tests in all available \"test_*\" modules.
Tags can be specified to control which tests are run. For example:

    test python         # run tests with the 'python' tag
    test python cpln    # run tests with both 'python' and 'cpln' tags
    test -- -python     # exclude tests with the 'python' tag
                        # (the '--' is necessary to end the option list)

The full name and base name of a test module are implicit tags for that
module, e.g. module \"test_xdebug.rs\" has tags \"test_xdebug\" and \"xdebug\".
A case class name (with and without \"TestCase\") is an implicit tag for
its test functions. A \"test_foo\" function also has \"test_foo\" and \"foo\"
implicit tags.

Tags can be added explicitly to modules, case classes and individual test
functions when they are registered. A short name printed by --list, e.g.
python/basic/def, can be passed back as a filter.";

/// Appended to usage errors; a leading `-` makes a tag look like an option.
pub const DASH_TAG_HINT: &str = "(did you need a '--' before a '-TAG' argument?)";

/// What the harness should do. / 测试程序应执行的操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Run,
    List,
}

/// Parsed command line. / 解析后的命令行。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub action: Action,
    pub verbosity: Verbosity,
    pub log: Vec<LogDirective>,
    pub config: Option<PathBuf>,
    pub tags: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CliError {
    /// `--help` or `--version`: print the text and exit successfully.
    #[error("{0}")]
    Display(String),
    #[error("{}", usage_message(.0))]
    Usage(clap::Error),
}

fn usage_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

pub fn build_cli(name: &str) -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .bin_name(name.to_string())
        .version(env!("CARGO_PKG_VERSION"))
        .about("Test suite harness: run or list the tests of all \"test_*\" modules.")
        .after_help(TAGS_HELP)
        .args_override_self(true)
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("Just list the available tests. Tags filter the listing too.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("More verbose output")
                .action(ArgAction::SetTrue)
                .overrides_with_all(["quiet", "debug"]),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Don't print anything except if a test fails")
                .action(ArgAction::SetTrue)
                .overrides_with_all(["verbose", "debug"]),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Log debug information")
                .action(ArgAction::SetTrue)
                .overrides_with_all(["verbose", "quiet"]),
        )
        .arg(
            Arg::new("log")
                .short('L')
                .value_name("NAME:LEVEL")
                .help("Set the level of one log channel, e.g. tagtest::core::discovery:DEBUG. Repeatable.")
                .value_parser(|s: &str| s.parse::<LogDirective>())
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("CONFIG")
                .help("Read harness settings from a TOML file")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("tags")
                .value_name("TAGS")
                .help("Tags selecting the tests; prefix with '-' to exclude")
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// Parses `argv` (program name first).
pub fn parse_args<I, T>(argv: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut argv = argv.into_iter().map(Into::into).peekable();
    let name = argv
        .peek()
        .and_then(|arg0| PathBuf::from(arg0).file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

    match build_cli(&name).try_get_matches_from(argv) {
        Ok(matches) => Ok(args_from_matches(&matches)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                Err(CliError::Display(err.render().to_string()))
            }
            _ => Err(CliError::Usage(err)),
        },
    }
}

fn args_from_matches(matches: &ArgMatches) -> CliArgs {
    let verbosity = if matches.get_flag("debug") {
        Verbosity::Debug
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };

    CliArgs {
        action: if matches.get_flag("list") {
            Action::List
        } else {
            Action::Run
        },
        verbosity,
        log: matches
            .get_many::<LogDirective>("log")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        tags: matches
            .get_many::<String>("tags")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracing::level_filters::LevelFilter;

    fn parse(args: &[&str]) -> Result<CliArgs, CliError> {
        parse_args(std::iter::once("test").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_run_everything_at_normal_verbosity() {
        assert_eq!(parse(&[]).unwrap(), CliArgs::default());
    }

    #[test]
    fn last_verbosity_flag_wins() {
        assert_eq!(parse(&["-v", "-q"]).unwrap().verbosity, Verbosity::Quiet);
        assert_eq!(parse(&["-q", "-d"]).unwrap().verbosity, Verbosity::Debug);
        assert_eq!(parse(&["-d", "-v"]).unwrap().verbosity, Verbosity::Verbose);
        assert_eq!(parse(&["-v", "-q", "-v"]).unwrap().verbosity, Verbosity::Verbose);
    }

    #[test]
    fn repeated_flags_are_accepted() {
        assert_eq!(parse(&["-v", "-v"]).unwrap().verbosity, Verbosity::Verbose);
        assert_eq!(parse(&["-d", "-d"]).unwrap().verbosity, Verbosity::Debug);
        assert_eq!(parse(&["-q", "--quiet"]).unwrap().verbosity, Verbosity::Quiet);
        assert_eq!(parse(&["-l", "-l"]).unwrap().action, Action::List);

        let args = parse(&["-c", "first.toml", "-c", "second.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("second.toml")));
    }

    #[test]
    fn list_log_and_tags_are_collected() {
        let args = parse(&["-l", "-L", "tagtest:DEBUG", "-L", "other:warning", "python", "cpln"]).unwrap();
        assert_eq!(args.action, Action::List);
        assert_eq!(args.tags, vec!["python", "cpln"]);
        assert_eq!(args.log.len(), 2);
        assert_eq!(args.log[1].channel, "other");
        assert_eq!(args.log[1].level, LevelFilter::WARN);
    }

    #[test]
    fn exclusion_tags_need_double_dash() {
        let args = parse(&["--", "-python"]).unwrap();
        assert_eq!(args.tags, vec!["-python"]);
        assert!(matches!(parse(&["-python"]), Err(CliError::Usage(_))));
    }

    #[test]
    fn help_is_displayed_not_an_error() {
        match parse(&["--help"]) {
            Err(CliError::Display(text)) => {
                assert!(text.contains("--list"));
                assert!(text.contains("exclude tests with the 'python' tag"));
            }
            other => panic!("expected help text, got {other:?}"),
        }
    }

    #[test]
    fn bad_log_directive_is_a_usage_error() {
        assert!(matches!(parse(&["-L", "nolevel"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["-L", "x:LOUD"]), Err(CliError::Usage(_))));
    }
}
