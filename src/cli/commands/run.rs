//! # Run Command Module / 运行命令模块
//!
//! Runs the selected tests with the console reporter, after calling the
//! optional setup hook.
//!
//! 调用可选的准备钩子后，使用控制台报告器运行选中的测试。

use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info};

use crate::{
    core::models::TestDescriptor,
    reporting::console::{ConsoleRunner, RunResult},
};

/// Called once before the first test runs.
pub type SetupHook = Box<dyn FnOnce() -> Result<()>>;

/// Executes the run command.
///
/// The setup hook is only called when at least one test was selected.
///
/// # Returns
/// The collected result; the caller decides the exit status from it.
pub fn execute<W: Write>(
    out: W,
    tests: Vec<TestDescriptor>,
    setup: Option<SetupHook>,
    color: bool,
) -> Result<RunResult> {
    debug!("running {} selected test(s)", tests.len());
    if !tests.is_empty() {
        if let Some(setup) = setup {
            info!("preparing the test suite");
            setup().context("Test suite setup failed")?;
        }
    }

    let result = ConsoleRunner::new(color)
        .run(out, tests)
        .context("Failed to write the test report")?;
    Ok(result)
}
