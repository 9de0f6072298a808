//! Demo tests tagged `guido`.

use tagtest::{CaseClass, CaseResult, LoadError, Module, TestCase, TestSpec, fail};

pub fn register(module: &mut Module) -> Result<(), LoadError> {
    module.declare_tags(["guido"]);

    module.case(
        CaseClass::of::<()>("BasicTestCase")
            .test(
                TestSpec::new("test_def").doc("Splitting a `def` header yields its name."),
                |_| {
                    let header = "def main(argv):";
                    let name = header
                        .strip_prefix("def ")
                        .and_then(|rest| rest.split('(').next());
                    assert_eq!(name, Some("main"));
                    Ok(())
                },
            )
            .test(TestSpec::new("test_class").tag("cpln"), |_| {
                let header = "class Foo(Bar):";
                if !header.ends_with(':') {
                    fail!("class header '{header}' is not terminated");
                }
                Ok(())
            }),
    );

    module.case(
        CaseClass::of::<Interpreter>("ComplexTestCase")
            .test("test_foo", |interp| {
                interp.feed("x = 1");
                assert_eq!(interp.lines(), 1);
                Ok(())
            })
            .test("test_bar", |interp| {
                interp.feed("y = 2\nz = 3");
                assert_eq!(interp.lines(), 2);
                Ok(())
            }),
    );

    Ok(())
}

/// A fresh, empty buffer for every test.
#[derive(Default)]
struct Interpreter {
    source: Vec<String>,
}

impl Interpreter {
    fn feed(&mut self, code: &str) {
        self.source.extend(code.lines().map(str::to_string));
    }

    fn lines(&self) -> usize {
        self.source.len()
    }
}

impl TestCase for Interpreter {
    fn tear_down(&mut self) -> CaseResult {
        self.source.clear();
        Ok(())
    }
}
