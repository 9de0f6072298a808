//! # List Command Module / 列表命令模块
//!
//! Prints the selected tests without running them. The long form is used
//! when the verbosity is INFO or more detailed.
//!
//! 打印选中的测试而不运行它们。

use anyhow::{Context, Result};
use std::io::Write;

use crate::{
    core::models::TestDescriptor,
    infra::logging::Verbosity,
    reporting::listing::{ListStyle, render_listing},
};

pub fn execute<W: Write>(out: &mut W, tests: &[TestDescriptor], verbosity: Verbosity) -> Result<()> {
    let style = if verbosity.is_verbose() {
        ListStyle::Long
    } else {
        ListStyle::Short
    };
    render_listing(out, tests, style).context("Failed to write the test listing")?;
    out.flush().context("Failed to write the test listing")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{CaseClass, Module};
    use std::rc::Rc;

    #[test]
    fn verbosity_picks_the_listing_form() {
        let module = Rc::new(Module::new("test_cmd", "/suite/test_cmd.rs"));
        let tests: Vec<TestDescriptor> = CaseClass::of::<()>("CmdTestCase")
            .test("test_a", |_| Ok(()))
            .build()
            .instances()
            .filter_map(|i| TestDescriptor::from_case(Rc::clone(&module), Box::new(i)))
            .collect();

        let mut short = Vec::new();
        execute(&mut short, &tests, Verbosity::Normal).unwrap();
        assert_eq!(String::from_utf8(short).unwrap(), "cmd/cmd/a\n");

        let mut long = Vec::new();
        execute(&mut long, &tests, Verbosity::Debug).unwrap();
        let long = String::from_utf8(long).unwrap();
        assert!(long.starts_with("/suite/test_cmd.rs: CmdTestCase.test_a()\n"));
        assert!(long.contains("    name: cmd/cmd/a\n"));
    }
}
