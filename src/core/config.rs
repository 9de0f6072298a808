//! # Configuration Module / 配置模块
//!
//! Optional TOML configuration for a harness run. Everything in it can also
//! be set in code through [`crate::harness::Harness`]; command-line `-L`
//! directives are applied after the ones listed here.
//!
//! 测试运行的可选 TOML 配置。
//!
//! ```toml
//! dirs = ["tests/suite"]
//! extensions = ["rs"]
//! entry_point = "mod.rs"
//! log = ["tagtest::core::discovery:DEBUG"]
//! color = false
//! ```

use crate::core::discovery::ModuleLayout;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from a harness configuration file.
/// 从配置文件读取的设置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HarnessConfig {
    /// Directories searched for test modules, in order.
    /// 按顺序搜索测试模块的目录。
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
    /// Extensions of single-file test modules.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// File marking a `test_<name>/` directory as a test module.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    /// `name:LEVEL` log directives.
    #[serde(default)]
    pub log: Vec<String>,
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            extensions: default_extensions(),
            entry_point: default_entry_point(),
            log: Vec::new(),
            color: default_color(),
        }
    }
}

impl HarnessConfig {
    pub fn layout(&self) -> ModuleLayout {
        ModuleLayout {
            extensions: self.extensions.clone(),
            entry_point: self.entry_point.clone(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["rs".to_string()]
}

fn default_entry_point() -> String {
    "mod.rs".to_string()
}

fn default_color() -> bool {
    true
}

/// Reads and parses a configuration file. Relative `dirs` are resolved
/// against the directory holding the file.
pub fn load_config(path: &Path) -> Result<HarnessConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let mut config: HarnessConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for dir in &mut config.dirs {
        if dir.is_relative() {
            *dir = base.join(&*dir);
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn empty_file_gives_defaults() {
        let config: HarnessConfig = toml::from_str("").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.layout(), ModuleLayout::default());
        assert!(config.color);
    }

    #[test]
    fn relative_dirs_follow_the_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tagtest.toml");
        fs::write(
            &path,
            r#"
dirs = ["suite", "/abs/suite"]
extensions = ["rs", "txt"]
log = ["tagtest:DEBUG"]
color = false
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(
            config.dirs,
            vec![dir.path().join("suite"), PathBuf::from("/abs/suite")]
        );
        assert_eq!(config.extensions, vec!["rs", "txt"]);
        assert_eq!(config.entry_point, "mod.rs");
        assert_eq!(config.log, vec!["tagtest:DEBUG"]);
        assert!(!config.color);
    }

    #[test]
    fn missing_and_malformed_files_are_errors_with_context() {
        let dir = tempdir().unwrap();
        let missing = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read config file"));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "dirs = 42").unwrap();
        let err = load_config(&bad).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
