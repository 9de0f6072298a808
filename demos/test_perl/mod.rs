//! Demo tests tagged `larry` and `wall`, registered through a case factory.

use tagtest::{CaseClass, LoadError, Module, TestSpec, skip};

pub fn register(module: &mut Module) -> Result<(), LoadError> {
    module.declare_tags(["larry", "wall"]);
    module.with_case_factory(|| {
        vec![
            CaseClass::of::<()>("_SigilHelper")
                .test("test_never_listed", |_| Ok(()))
                .build(),
            CaseClass::of::<()>("EclecticTestCase")
                .test(
                    TestSpec::new("test_foo").doc("Needs a perl interpreter on PATH."),
                    |_| skip!("needs a camel"),
                )
                .test(
                    TestSpec::new("test_bar")
                        .tag("knownfailure")
                        .doc("Sigils are not stripped yet."),
                    |_| {
                        let sigiled = "$scalar";
                        assert_eq!(sigiled.trim_start_matches('@'), "scalar");
                        Ok(())
                    },
                )
                .build(),
        ]
    });
    Ok(())
}
