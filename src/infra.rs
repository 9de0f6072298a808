//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for tagtest: path handling
//! and the logging setup.
//!
//! 此模块为 tagtest 提供基础设施服务：路径处理和日志设置。

pub mod fs;
pub mod logging;
