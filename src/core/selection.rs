//! # Test Selection Module / 测试选择模块
//!
//! Filters the discovered tests by include/exclude tag tokens.
//!
//! A plain token includes, a token starting with `-` excludes. Exclusion
//! always wins, and several include tokens must all match (AND, not OR).
//! Matching is case-insensitive.
//!
//! 按包含/排除标签过滤已发现的测试。排除总是优先；多个包含标签必须全部匹配。

use crate::core::models::TestDescriptor;
use crate::core::tags::{EXCLUDE_MARKER, TAG_SEPARATOR, lowercased};
use std::path::Path;
use tracing::debug;

/// Include and exclude tags parsed from raw tokens.
/// 从原始标记解析出的包含和排除标签。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCriteria {
    include: Vec<String>,
    exclude: Vec<String>,
    raw: Vec<String>,
}

impl SelectionCriteria {
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut criteria = SelectionCriteria::default();
        for token in tokens {
            let token = token.as_ref();
            match token.strip_prefix(EXCLUDE_MARKER) {
                Some(tag) => criteria.exclude.push(tag.to_lowercase()),
                None => criteria.include.push(token.to_lowercase()),
            }
            criteria.raw.push(token.to_string());
        }
        criteria
    }

    pub fn include_tags(&self) -> &[String] {
        &self.include
    }

    pub fn exclude_tags(&self) -> &[String] {
        &self.exclude
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Decides whether one descriptor is selected.
    pub fn accepts(&self, test: &TestDescriptor) -> bool {
        let test_tags = lowercased(&test.tags());

        let matching_exclude: Vec<&str> = self
            .exclude
            .iter()
            .filter(|tag| test_tags.contains(*tag))
            .map(String::as_str)
            .collect();
        if !matching_exclude.is_empty() {
            debug!(
                "test '{}' matches exclude tag(s) '{}': skipping",
                test.short_name(),
                matching_exclude.join("', '")
            );
            return false;
        }

        if let Some(missing) = self.include.iter().find(|tag| !test_tags.contains(*tag)) {
            debug!(
                "test '{}' does not match tag '{}': skipping",
                test.short_name(),
                missing
            );
            return false;
        }

        if !self.include.is_empty() {
            debug!(
                "test '{}' matches tags: {}",
                test.short_name(),
                self.raw.join(" ")
            );
        }
        true
    }
}

/// Lazily keeps the descriptors accepted by `tokens`, in input order.
///
/// Like discovery, the result can be consumed once.
pub fn select<I, S>(descriptors: I, tokens: &[S]) -> impl Iterator<Item = TestDescriptor> + use<I, S>
where
    I: IntoIterator<Item = TestDescriptor>,
    S: AsRef<str>,
{
    let criteria = SelectionCriteria::parse(tokens);
    descriptors
        .into_iter()
        .filter(move |test| criteria.accepts(test))
}

/// Cleans up raw command-line tokens before selection.
///
/// A token naming an existing file with one of `extensions` loses the
/// extension (shell expansion of `test_foo.rs`). Otherwise a token with
/// `/` is split at the first `/` and the rest is cleaned again, so a short
/// name printed by the listing can be pasted back as a filter.
///
/// 在选择之前清理命令行原始标记。
pub fn normalize_tokens<I, S>(raw: I, extensions: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = Vec::new();
    for token in raw {
        push_token(token.as_ref(), extensions, &mut tokens);
    }
    tokens
}

fn push_token(token: &str, extensions: &[String], tokens: &mut Vec<String>) {
    let path = Path::new(token);
    let has_source_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known == ext));

    if has_source_ext && path.exists() {
        let stem_len = token.len() - path.extension().map_or(0, |ext| ext.len() + 1);
        tokens.push(token[..stem_len].to_string());
    } else if let Some((head, rest)) = token.split_once(TAG_SEPARATOR) {
        tokens.push(head.to_string());
        push_token(rest, extensions, tokens);
    } else {
        tokens.push(token.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{CaseClass, Module, RunnableCase, TestSpec};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn corpus() -> Vec<TestDescriptor> {
        let mut python = Module::new("test_python", "test_python.rs");
        python.declare_tags(["guido"]);
        let python = Rc::new(python);
        let mut perl = Module::new("test_perl", "test_perl");
        perl.declare_tags(["larry", "wall"]);
        let perl = Rc::new(perl);

        let basic = CaseClass::of::<()>("BasicTestCase")
            .test("test_def", |_| Ok(()))
            .test(TestSpec::new("test_class").tag("cpln"), |_| Ok(()))
            .build();
        let eclectic = CaseClass::of::<()>("EclecticTestCase")
            .test(TestSpec::new("test_foo").tag("knownfailure"), |_| Ok(()))
            .build();

        let mut tests = Vec::new();
        for instance in basic.instances() {
            let case: Box<dyn RunnableCase> = Box::new(instance);
            tests.extend(TestDescriptor::from_case(Rc::clone(&python), case));
        }
        for instance in eclectic.instances() {
            let case: Box<dyn RunnableCase> = Box::new(instance);
            tests.extend(TestDescriptor::from_case(Rc::clone(&perl), case));
        }
        tests
    }

    fn names(tokens: &[&str]) -> Vec<String> {
        select(corpus(), tokens)
            .map(|t| t.short_name().to_string())
            .collect()
    }

    #[test]
    fn no_tokens_selects_everything() {
        assert_eq!(
            names(&[]),
            vec!["python/basic/def", "python/basic/class", "perl/eclectic/foo"]
        );
    }

    #[test]
    fn include_tags_are_conjunctive() {
        assert_eq!(names(&["python", "cpln"]), vec!["python/basic/class"]);
        assert!(names(&["python", "larry"]).is_empty());
    }

    #[test]
    fn exclusion_wins_over_inclusion() {
        assert_eq!(names(&["basic", "-def"]), vec!["python/basic/class"]);
        assert!(names(&["knownfailure", "-knownfailure"]).is_empty());
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(names(&["GUIDO", "-CPLN", "DEF"]), vec!["python/basic/def"]);
    }

    #[test]
    fn criteria_split_include_and_exclude() {
        let criteria = SelectionCriteria::parse(["Python", "-Perl"]);
        assert_eq!(criteria.include_tags(), ["python"]);
        assert_eq!(criteria.exclude_tags(), ["perl"]);
        assert!(!criteria.is_empty());
    }

    #[test]
    fn short_name_round_trips_through_tokens() {
        let tokens = normalize_tokens(["python/basic/def"], &["rs".to_string()]);
        assert_eq!(tokens, vec!["python", "basic", "def"]);
        assert_eq!(names(&["python", "basic", "def"]), vec!["python/basic/def"]);
    }

    #[test]
    fn existing_source_files_lose_their_extension() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("test_python.rs");
        fs::write(&file, "").unwrap();
        let token = file.to_string_lossy().to_string();
        let exts = ["rs".to_string()];

        let tokens = normalize_tokens([token.as_str()], &exts);
        assert_eq!(tokens, vec![token.trim_end_matches(".rs").to_string()]);

        let missing = normalize_tokens(["nothere.rs"], &exts);
        assert_eq!(missing, vec!["nothere.rs"]);
    }

    #[test]
    fn exclusion_token_with_separator_splits() {
        let tokens = normalize_tokens(["-python/basic"], &[]);
        assert_eq!(tokens, vec!["-python", "basic"]);
    }
}
