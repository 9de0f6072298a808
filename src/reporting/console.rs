//! # Console Reporting Module / 控制台报告模块
//!
//! A result collector that prints each test as it runs and a summary at
//! the end, plus the runner that drives a batch of selected tests through
//! it. Skips are reported as skips, never as failures.
//!
//! 一个结果收集器：在测试运行时逐个打印，并在结束时打印摘要；以及驱动
//! 一批选中测试通过它的运行器。跳过的测试被报告为跳过，而不是失败。
//!
//! ## Output Format / 输出格式
//! ```text
//! python/basic/def ... ok
//! perl/eclectic/foo ... skipped (needs a camel)
//! perl/eclectic/bar ... FAIL
//!
//! ======================================================================
//! FAIL: perl/eclectic/bar
//! ----------------------------------------------------------------------
//! <cause>
//! ----------------------------------------------------------------------
//! Ran 3 tests in 0.002s
//!
//! FAILED (1 failure, 1 skip)
//! ```

use crate::core::execution::{Outcome, execute};
use crate::core::models::TestDescriptor;
use colored::*;
use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

const RULE_WIDTH: usize = 70;

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// `1 failure`, `2 failures`, `0 skips`.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Lifecycle of one batch run. / 一次批量运行的生命周期。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Running,
    Finished,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::NotStarted => "not started",
            RunPhase::Running => "running",
            RunPhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("reporter is {found}, expected it to be {expected}")]
    InvalidState { expected: RunPhase, found: RunPhase },
}

/// Everything collected during one batch run.
/// 一次批量运行期间收集的所有内容。
#[derive(Debug, Default)]
pub struct RunResult {
    tests_run: usize,
    passes: usize,
    failures: Vec<(TestDescriptor, String)>,
    errors: Vec<(TestDescriptor, String)>,
    skips: Vec<(TestDescriptor, String)>,
    elapsed: Duration,
}

impl RunResult {
    pub fn tests_run(&self) -> usize {
        self.tests_run
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn failures(&self) -> &[(TestDescriptor, String)] {
        &self.failures
    }

    pub fn errors(&self) -> &[(TestDescriptor, String)] {
        &self.errors
    }

    pub fn skips(&self) -> &[(TestDescriptor, String)] {
        &self.skips
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// No failures and no errors. Skips do not count against success.
    pub fn was_successful(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }

    fn add(&mut self, test: TestDescriptor, outcome: Outcome) {
        self.tests_run += 1;
        match outcome {
            Outcome::Pass => self.passes += 1,
            Outcome::Fail(cause) => self.failures.push((test, cause)),
            Outcome::Error(cause) => self.errors.push((test, cause)),
            Outcome::Skip(reason) => self.skips.push((test, reason)),
        }
    }

    /// `OK`, `OK (2 skips)` or `FAILED (1 failure, 1 skip)`.
    pub fn status_line(&self) -> String {
        let mut details = Vec::new();
        if !self.failures.is_empty() {
            details.push(pluralize(self.failures.len(), "failure"));
        }
        if !self.errors.is_empty() {
            details.push(pluralize(self.errors.len(), "error"));
        }
        if !self.skips.is_empty() {
            details.push(pluralize(self.skips.len(), "skip"));
        }

        if !self.was_successful() {
            format!("FAILED ({})", details.join(", "))
        } else if details.is_empty() {
            "OK".to_string()
        } else {
            format!("OK ({})", details.join(", "))
        }
    }

    /// `Ran 3 tests in 0.002s`
    pub fn totals_line(&self) -> String {
        let noun = if self.tests_run == 1 { "test" } else { "tests" };
        format!(
            "Ran {} {} in {:.3}s",
            self.tests_run,
            noun,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Streams per-test lines to `out` and renders the final report.
pub struct ConsoleReporter<W: Write> {
    out: W,
    color: bool,
    phase: RunPhase,
    started: Option<Instant>,
    result: RunResult,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            phase: RunPhase::NotStarted,
            started: None,
            result: RunResult::default(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn result(&self) -> &RunResult {
        &self.result
    }

    pub fn into_result(self) -> RunResult {
        self.result
    }

    fn expect_phase(&self, expected: RunPhase) -> Result<(), ReportError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ReportError::InvalidState {
                expected,
                found: self.phase,
            })
        }
    }

    fn paint(&self, text: String, color: Color) -> String {
        if self.color {
            text.as_str().color(color).bold().to_string()
        } else {
            text
        }
    }

    pub fn start(&mut self) -> Result<(), ReportError> {
        self.expect_phase(RunPhase::NotStarted)?;
        self.result = RunResult::default();
        self.started = Some(Instant::now());
        self.phase = RunPhase::Running;
        Ok(())
    }

    pub fn start_test(&mut self, test: &TestDescriptor) -> Result<(), ReportError> {
        self.expect_phase(RunPhase::Running)?;
        write!(self.out, "{} ... ", test.short_name())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn record(&mut self, test: TestDescriptor, outcome: Outcome) -> Result<(), ReportError> {
        self.expect_phase(RunPhase::Running)?;
        let word = match &outcome {
            Outcome::Pass => self.paint(outcome.to_string(), Color::Green),
            Outcome::Fail(_) | Outcome::Error(_) => self.paint(outcome.to_string(), Color::Red),
            Outcome::Skip(_) => self.paint(outcome.to_string(), Color::Yellow),
        };
        writeln!(self.out, "{word}")?;
        self.out.flush()?;
        self.result.add(test, outcome);
        Ok(())
    }

    pub fn finish(&mut self) -> Result<&RunResult, ReportError> {
        self.expect_phase(RunPhase::Running)?;
        self.result.elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        self.phase = RunPhase::Finished;

        writeln!(self.out)?;
        write_details(&mut self.out, "FAIL", &self.result.failures)?;
        write_details(&mut self.out, "ERROR", &self.result.errors)?;

        writeln!(self.out, "{}", light_rule())?;
        writeln!(self.out, "{}", self.result.totals_line())?;
        writeln!(self.out)?;

        let status = self.result.status_line();
        let status = if self.result.was_successful() {
            self.paint(status, Color::Green)
        } else {
            self.paint(status, Color::Red)
        };
        writeln!(self.out, "{status}")?;
        self.out.flush()?;
        Ok(&self.result)
    }
}

fn write_details<W: Write>(
    out: &mut W,
    flavour: &str,
    entries: &[(TestDescriptor, String)],
) -> io::Result<()> {
    for (test, cause) in entries {
        writeln!(out, "{}", heavy_rule())?;
        writeln!(out, "{flavour}: {}", test.short_name())?;
        writeln!(out, "{}", light_rule())?;
        writeln!(out, "{}", cause.trim_end())?;
    }
    Ok(())
}

/// Runs a batch of tests, in order, through a [`ConsoleReporter`].
/// 按顺序通过 [`ConsoleReporter`] 运行一批测试。
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRunner {
    color: bool,
}

impl ConsoleRunner {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Executes every test exactly once and returns the collected result.
    pub fn run<W, I>(&self, out: W, tests: I) -> Result<RunResult, ReportError>
    where
        W: Write,
        I: IntoIterator<Item = TestDescriptor>,
    {
        let mut reporter = ConsoleReporter::new(out, self.color);
        reporter.start()?;
        for test in tests {
            reporter.start_test(&test)?;
            let outcome = execute(&test);
            debug!("test '{}' finished: {:?}", test.short_name(), outcome);
            reporter.record(test, outcome)?;
        }
        reporter.finish()?;
        Ok(reporter.into_result())
    }
}
