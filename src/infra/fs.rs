//! # File System Operations Module / 文件系统操作模块
//!
//! Path helpers used by discovery.

use std::path::{Path, PathBuf};

/// Makes `dir` absolute and drops any trailing separator or `.` component.
/// Falls back to the path as given when the current directory is unknown.
///
/// 将目录转换为绝对路径并去掉末尾的分隔符。
pub fn normalize_dir(dir: &Path) -> PathBuf {
    match std::path::absolute(dir) {
        Ok(path) => path.components().collect(),
        Err(_) => dir.to_path_buf(),
    }
}
