//! # Commands Module / 命令模块
//!
//! The two things a harness run can do with the selected tests.
//!
//! 测试运行可以对选中测试执行的两种操作。

pub mod list;
pub mod run;
