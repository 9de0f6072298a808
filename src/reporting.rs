//! # Reporting Module / 报告模块
//!
//! This module handles what the user sees of a run: the streaming console
//! report with its final summary, and the test listing printed by `--list`.
//!
//! 此模块处理用户看到的运行结果：带最终摘要的流式控制台报告，
//! 以及 `--list` 打印的测试列表。

pub mod console;
pub mod listing;

// Re-export common reporting items
pub use console::{ConsoleReporter, ConsoleRunner, RunResult};
pub use listing::{ListStyle, render_listing};
