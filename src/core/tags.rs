//! # Tag Model / 标签模型
//!
//! Pure helpers for turning names into tags. Every discovered test carries
//! tags derived from its module, case and function names; these helpers
//! define how those names are normalized and how compound tags are split.
//!
//! 将名称转换为标签的纯函数。每个被发现的测试都带有从其模块、用例和
//! 函数名称派生的标签；这些函数定义了名称如何规范化以及复合标签如何拆分。

/// The reserved tag separator. A tag containing it can never be selected
/// as a whole, so it is always split into its parts.
/// 保留的标签分隔符。
pub const TAG_SEPARATOR: char = '/';

/// The prefix marking an exclusion token on the command line.
pub const EXCLUDE_MARKER: char = '-';

/// Normalizes a module, case or function name into its tag form.
///
/// A leading `test_` (preferred) or `test` is stripped, otherwise a trailing
/// `TestCase` is stripped. The remainder is lower-cased.
///
/// 去掉 `test_`（优先）或 `test` 前缀，否则去掉 `TestCase` 后缀，然后转为小写。
///
/// ```
/// use tagtest::core::tags::normalize;
///
/// assert_eq!(normalize("test_Foo"), "foo");
/// assert_eq!(normalize("FooTestCase"), "foo");
/// assert_eq!(normalize("bar"), "bar");
/// ```
pub fn normalize(name: &str) -> String {
    let stripped = name
        .strip_prefix("test_")
        .or_else(|| name.strip_prefix("test"))
        .or_else(|| name.strip_suffix("TestCase"))
        .unwrap_or(name);
    stripped.to_lowercase()
}

/// Splits every tag containing [`TAG_SEPARATOR`] into its parts, keeping
/// relative order and duplicates.
///
/// ```
/// use tagtest::core::tags::flatten;
///
/// assert_eq!(flatten(["a/b", "c"]), vec!["a", "b", "c"]);
/// ```
pub fn flatten<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .flat_map(|tag| {
            tag.as_ref()
                .split(TAG_SEPARATOR)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Lower-cases every tag, the form in which tags are compared.
pub fn lowercased<'a, I>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    tags.into_iter().map(|t| t.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_prefers_test_underscore_prefix() {
        assert_eq!(normalize("test_Foo"), "foo");
        assert_eq!(normalize("test_test_x"), "test_x");
        assert_eq!(normalize("testFoo"), "foo");
    }

    #[test]
    fn normalize_strips_testcase_suffix() {
        assert_eq!(normalize("FooTestCase"), "foo");
        assert_eq!(normalize("BasicTestCase"), "basic");
    }

    #[test]
    fn normalize_prefix_wins_over_suffix() {
        assert_eq!(normalize("test_FooTestCase"), "footestcase");
    }

    #[test]
    fn normalize_without_affix_lowercases() {
        assert_eq!(normalize("bar"), "bar");
        assert_eq!(normalize("Bar"), "bar");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn flatten_splits_and_keeps_duplicates() {
        assert_eq!(flatten(["a/b", "c"]), vec!["a", "b", "c"]);
        assert_eq!(flatten(["x", "x/y", "x"]), vec!["x", "x", "y", "x"]);
        assert!(flatten(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn flatten_keeps_empty_segments() {
        assert_eq!(flatten(["a//b"]), vec!["a", "", "b"]);
    }
}
