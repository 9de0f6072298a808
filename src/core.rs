//! # Core Module / 核心模块
//!
//! This module contains the core functionality of tagtest: the tag model,
//! test descriptors, module discovery, tag selection, single-test execution
//! and configuration.
//!
//! 此模块包含 tagtest 的核心功能：标签模型、测试描述符、模块发现、
//! 标签选择、单个测试的执行以及配置。

pub mod config;
pub mod discovery;
pub mod execution;
pub mod models;
pub mod selection;
pub mod tags;

// Re-exports
pub use config::HarnessConfig;
pub use discovery::{LoadError, ModuleLayout, ModuleLoader, Registry, enumerate_descriptors};
pub use execution::{Outcome, execute};
pub use models::{CaseClass, Module, TestCase, TestDescriptor, TestError, TestSpec};
pub use selection::select;
