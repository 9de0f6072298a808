//! # Harness Module / 测试程序模块
//!
//! The mainline of a test binary: parse the command line, set up logging,
//! discover and select the tests, then list or run them.
//!
//! 测试程序的主流程：解析命令行、设置日志、发现并选择测试，然后列出或运行它们。
//!
//! ```no_run
//! use tagtest::{CaseClass, Harness, Registry};
//!
//! let mut registry = Registry::new();
//! registry.register("test_python", |m| {
//!     m.declare_tags(["guido"]);
//!     m.case(CaseClass::of::<()>("BasicTestCase").test("test_def", |_| Ok(())));
//!     Ok(())
//! });
//!
//! let status = Harness::new(registry).dir("tests/suite").run_from_env();
//! std::process::exit(status.into());
//! ```

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

use crate::{
    cli::{self, Action, CliArgs, CliError, DASH_TAG_HINT, commands},
    core::{
        config::{HarnessConfig, load_config},
        discovery::{ModuleLoader, enumerate_descriptors},
        models::TestDescriptor,
        selection::{normalize_tokens, select},
    },
    infra::logging::{LogConfig, LogDirective},
};

pub use crate::cli::commands::run::SetupHook;

/// Exit status of a harness run. / 测试运行的退出状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Help, a listing, or a run without failures or errors.
    Success,
    /// A test failed or errored.
    TestsFailed,
    /// Bad command line or configuration, or the run could not complete.
    Error,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::TestsFailed | Status::Error => 1,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        i32::from(status.code())
    }
}

/// Builder for a test binary's mainline.
pub struct Harness {
    loader: Box<dyn ModuleLoader>,
    dirs: Vec<PathBuf>,
    config: HarnessConfig,
    setup: Option<SetupHook>,
}

impl Harness {
    pub fn new(loader: impl ModuleLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            dirs: Vec::new(),
            config: HarnessConfig::default(),
            setup: None,
        }
    }

    /// Adds a directory searched for test modules.
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    pub fn dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Settings used when no `--config` file is given.
    pub fn config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    /// Prepares the suite once before the first test. Not called when no
    /// test is selected.
    pub fn setup<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() -> Result<()> + 'static,
    {
        self.setup = Some(Box::new(hook));
        self
    }

    pub fn run_from_env(self) -> Status {
        self.run(std::env::args_os())
    }

    /// Runs with `argv` (program name first), reporting to stdout.
    pub fn run<I, T>(self, argv: I) -> Status
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.run_with_output(argv, io::stdout().lock())
    }

    /// Runs with `argv`, writing help, listings and reports to `out`.
    /// Diagnostics go to the log.
    pub fn run_with_output<I, T, W>(self, argv: I, mut out: W) -> Status
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
        W: Write,
    {
        let args = match cli::parse_args(argv) {
            Ok(args) => args,
            Err(CliError::Display(text)) => {
                return match write!(out, "{text}").and_then(|()| out.flush()) {
                    Ok(()) => Status::Success,
                    Err(_) => Status::Error,
                };
            }
            Err(err @ CliError::Usage(_)) => {
                let _ = LogConfig::default().init();
                error!("{} {}", err, DASH_TAG_HINT);
                return Status::Error;
            }
        };

        match self.execute(args, &mut out) {
            Ok(status) => status,
            Err(err) => {
                let _ = LogConfig::default().init();
                error!("{err:#}");
                Status::Error
            }
        }
    }

    fn execute<W: Write>(self, args: CliArgs, out: &mut W) -> Result<Status> {
        let config = match &args.config {
            Some(path) => load_config(path)?,
            None => self.config,
        };

        log_config(&args, &config)?.init()?;
        debug!("command line: {:?}", args);

        let mut dirs = self.dirs;
        dirs.extend(config.dirs.iter().cloned());
        if dirs.is_empty() {
            dirs.push(PathBuf::from("."));
        }

        let layout = config.layout();
        let tokens = normalize_tokens(&args.tags, &layout.extensions);
        debug!("selecting tests in {:?} with tags {:?}", dirs, tokens);
        let tests: Vec<TestDescriptor> =
            select(enumerate_descriptors(&dirs, &layout, self.loader.as_ref()), &tokens[..]).collect();

        match args.action {
            Action::List => {
                commands::list::execute(out, &tests, args.verbosity)?;
                Ok(Status::Success)
            }
            Action::Run => {
                let color = config.color && io::stdout().is_terminal();
                let result = commands::run::execute(out, tests, self.setup, color)?;
                Ok(if result.was_successful() {
                    Status::Success
                } else {
                    Status::TestsFailed
                })
            }
        }
    }
}

/// Verbosity from the command line; channel levels from the config file
/// first, then from `-L`.
fn log_config(args: &CliArgs, config: &HarnessConfig) -> Result<LogConfig> {
    let mut log = LogConfig::new(args.verbosity);
    for raw in &config.log {
        let directive: LogDirective = raw
            .parse()
            .with_context(|| format!("Invalid log directive in config: '{raw}'"))?;
        log.directive(directive);
    }
    for directive in &args.log {
        log.directive(directive.clone());
    }
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discovery::{LoadOutcome, ModuleCandidate};
    use crate::core::models::{CaseClass, Module, TestError};
    use std::fs;
    use tempfile::tempdir;

    fn demo_loader(candidate: &ModuleCandidate) -> LoadOutcome {
        let mut module = Module::new(candidate.name(), candidate.source());
        module.case(
            CaseClass::of::<()>("DemoTestCase")
                .test("test_pass", |_| Ok(()))
                .test("test_fail", |_| Err(TestError::fail("broken"))),
        );
        LoadOutcome::Loaded(module)
    }

    fn plain() -> HarnessConfig {
        HarnessConfig {
            color: false,
            ..HarnessConfig::default()
        }
    }

    fn run(dir: &std::path::Path, args: &[&str]) -> (Status, String) {
        let mut out = Vec::new();
        let argv = std::iter::once("test").chain(args.iter().copied());
        let status = Harness::new(demo_loader)
            .dir(dir)
            .config(plain())
            .run_with_output(argv, &mut out);
        (status, String::from_utf8(out).unwrap())
    }

    #[test]
    fn failures_give_a_failing_status() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("test_demo.rs"), "").unwrap();

        let (status, output) = run(dir.path(), &[]);
        assert_eq!(status, Status::TestsFailed);
        assert!(output.contains("demo/demo/fail ... FAIL"));

        let (status, _) = run(dir.path(), &["--", "-fail"]);
        assert_eq!(status, Status::Success);
    }

    #[test]
    fn list_and_help_succeed() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("test_demo.rs"), "").unwrap();

        let (status, output) = run(dir.path(), &["--list", "pass"]);
        assert_eq!(status, Status::Success);
        assert_eq!(output, "demo/demo/pass\n");

        let (status, output) = run(dir.path(), &["--help"]);
        assert_eq!(status, Status::Success);
        assert!(output.contains("Usage:"));
    }

    #[test]
    fn bad_options_are_usage_errors() {
        let dir = tempdir().unwrap();
        let (status, output) = run(dir.path(), &["-knownfailure"]);
        assert_eq!(status, Status::Error);
        assert!(output.is_empty());
        assert_eq!(i32::from(status), 1);
    }

    #[test]
    fn setup_hook_is_not_called_without_tests() {
        let dir = tempdir().unwrap();
        let mut out = Vec::new();
        let status = Harness::new(demo_loader)
            .dir(dir.path())
            .config(plain())
            .setup(|| anyhow::bail!("setup must not run"))
            .run_with_output(["test"], &mut out);
        assert_eq!(status, Status::Success);
        assert!(String::from_utf8(out).unwrap().contains("Ran 0 tests"));
    }
}
