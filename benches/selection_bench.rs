use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::rc::Rc;
use tagtest::core::selection::select;
use tagtest::{CaseClass, Module, TestDescriptor, TestSpec};

fn suite() -> Vec<TestDescriptor> {
    let mut tests = Vec::new();
    for m in 0..20 {
        let mut module = Module::new(format!("test_mod{m}"), format!("test_mod{m}.rs"));
        module.declare_tags(["suite/bench"]);
        let module = Rc::new(module);
        let mut class = CaseClass::of::<()>(format!("Case{m}TestCase"));
        for f in 0..25 {
            let spec = TestSpec::new(format!("test_fn{f}")).tag(if f % 5 == 0 { "slow" } else { "fast" });
            class = class.test(spec, |_| Ok(()));
        }
        let class = class.build();
        for instance in class.instances() {
            tests.extend(TestDescriptor::from_case(Rc::clone(&module), Box::new(instance)));
        }
    }
    tests
}

fn bench_select(c: &mut Criterion) {
    c.bench_function("select_include_exclude", |b| {
        b.iter_batched(
            suite,
            |tests| select(tests, black_box(&["bench", "-slow"])).count(),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_select);
criterion_main!(benches);
