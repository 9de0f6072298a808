//! # Test Listing Module / 测试列表模块
//!
//! Prints the selected tests instead of running them.
//!
//! The short form is one line per test: the short name padded to a common
//! width, the explicit tags and the first line of the description. The long
//! form adds the source path, the full tag list and the whole description.
//!
//! 打印选中的测试而不运行它们。短格式每个测试一行；长格式额外显示
//! 源文件路径、完整标签列表和完整描述。

use crate::core::models::TestDescriptor;
use std::io::{self, Write};

/// Column budget of a listing line.
pub const DISPLAY_WIDTH: usize = 78;

/// Hanging indent of wrapped tag lines in the long form (`    tags: `).
const TAGS_INDENT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStyle {
    Long,
    #[default]
    Short,
}

/// Writes the listing of `tests`. Nothing is written for an empty list.
pub fn render_listing<W: Write>(
    out: &mut W,
    tests: &[TestDescriptor],
    style: ListStyle,
) -> io::Result<()> {
    if tests.is_empty() {
        return Ok(());
    }
    match style {
        ListStyle::Long => render_long(out, tests),
        ListStyle::Short => render_short(out, tests),
    }
}

fn render_long<W: Write>(out: &mut W, tests: &[TestDescriptor]) -> io::Result<()> {
    for (i, test) in tests.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(
            out,
            "{}: {}()",
            test.module().path().display(),
            test.qualified_name()
        )?;
        writeln!(out, "    name: {}", test.short_name())?;

        let wrapped = textwrap::fill(&test.tags().join(" "), DISPLAY_WIDTH - TAGS_INDENT);
        writeln!(out, "    tags: {}", indent(&wrapped, TAGS_INDENT, true))?;

        let doc = test.documentation();
        if !doc.is_empty() {
            writeln!(out, "{}", indent(doc, 4, false).trim_end_matches('\n'))?;
        }
    }
    Ok(())
}

fn render_short<W: Write>(out: &mut W, tests: &[TestDescriptor]) -> io::Result<()> {
    let width = tests
        .iter()
        .map(|t| t.short_name().chars().count())
        .max()
        .unwrap_or_default();

    for test in tests {
        let mut line = format!("{:<width$}  ", test.short_name());
        let tags = test.explicit_tags();
        if !tags.is_empty() {
            line.push_str(&format!("[{}]", tags.join(" ")));
        }
        if let Some(first) = test.documentation().lines().next() {
            if !tags.is_empty() {
                line.push(' ');
            }
            line.push_str(first);
        }
        writeln!(out, "{}", one_line_summary(line.trim_end(), DISPLAY_WIDTH))?;
    }
    Ok(())
}

/// Indents every line of `s` by `width` spaces, optionally leaving the first
/// line alone.
///
/// ```
/// use tagtest::reporting::listing::indent;
///
/// assert_eq!(indent("a\nb", 2, false), "  a\n  b");
/// assert_eq!(indent("a\nb", 2, true), "a\n  b");
/// ```
pub fn indent(s: &str, width: usize, skip_first_line: bool) -> String {
    let pad = " ".repeat(width);
    let mut indented = String::with_capacity(s.len());
    for (i, line) in s.split_inclusive('\n').enumerate() {
        if i > 0 || !skip_first_line {
            indented.push_str(&pad);
        }
        indented.push_str(line);
    }
    indented
}

/// Makes control characters visible: line endings as `\r\n`, `\n`, `\r`,
/// tabs as `\t`, anything else as a `\xNN` or `\u{..}` escape.
/// 使控制字符可见。
pub fn escape_control(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                escaped.push_str("\\r\\n");
            }
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() && (c as u32) < 0x100 => {
                escaped.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => escaped.push_str(&c.escape_unicode().to_string()),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Shortens `text` to a single escaped line of at most `length` columns,
/// ending in `...` when something was cut.
pub fn one_line_summary(text: &str, length: usize) -> String {
    let escaped = escape_control(text);
    if escaped.chars().count() <= length {
        return escaped;
    }
    let keep = length.saturating_sub(3);
    let mut summary: String = escaped.chars().take(keep).collect();
    summary.push_str("...");
    summary
}
