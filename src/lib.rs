//! # tagtest Library / tagtest 库
//!
//! A small test-suite harness. Test modules named `test_*` are discovered in
//! one or more directories, every test function gets a set of tags derived
//! from its module, case class and function names (plus any declared
//! explicitly), and the command line selects what to run or list by tag.
//!
//! 一个小型测试套件框架。在一个或多个目录中发现名为 `test_*` 的测试模块，
//! 每个测试函数都会从其模块、用例类和函数名称派生出一组标签（以及显式声明的
//! 标签），命令行按标签选择要运行或列出的测试。
//!
//! ## Modules / 模块
//!
//! - `core` - Tags, descriptors, discovery, selection and execution
//! - `infra` - Path handling and logging setup
//! - `reporting` - Console report and test listing
//! - `cli` - Command-line interface and commands
//! - `harness` - The mainline tying everything together
//!
//! - `core` - 标签、描述符、发现、选择和执行
//! - `infra` - 路径处理和日志设置
//! - `reporting` - 控制台报告和测试列表
//! - `cli` - 命令行接口和命令
//! - `harness` - 将所有部分串联起来的主流程

pub mod cli;
pub mod core;
pub mod harness;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config::HarnessConfig;
pub use crate::core::discovery::{
    CandidateKind, LoadError, LoadOutcome, ModuleCandidate, ModuleLayout, ModuleLoader, Registry,
};
pub use crate::core::execution::Outcome;
pub use crate::core::models::{
    CaseClass, CaseResult, Module, RunnableCase, TestCase, TestDescriptor, TestError, TestSpec,
};
pub use crate::harness::{Harness, Status};
