//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures of the harness: the error a
//! test function raises, the fixture trait, the case/method registration
//! builders, loaded modules and the `TestDescriptor` that everything
//! downstream (selection, listing, reporting) works with.
//!
//! 此模块定义了测试框架的核心数据结构：测试函数抛出的错误、夹具 trait、
//! 用例/方法注册构建器、已加载的模块，以及下游（选择、列表、报告）
//! 所使用的 `TestDescriptor`。

use crate::core::tags::{flatten, normalize};
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Case class names starting with this marker are private and never enumerated.
/// 以此标记开头的用例类名称是私有的，永远不会被枚举。
pub const PRIVATE_MARKER: char = '_';

/// Slack granted to a timed test before it is failed for running too long.
pub const TIME_TOLERANCE: Duration = Duration::from_millis(50);

/// The condition a test function (or its fixture) ends with when it does not pass.
///
/// The variant decides how the reporter accounts for it: `Skipped` is not a
/// failure at all, `Failed` is an assertion-style failure and anything else
/// is an error.
///
/// 测试函数（或其夹具）未通过时的结束条件。变体决定了报告器如何统计它。
#[derive(Debug, Error)]
pub enum TestError {
    /// The test opted out of running. / 测试选择跳过。
    #[error("{0}")]
    Skipped(String),
    /// An explicit failure, same accounting as a failed assertion.
    /// 显式失败，与断言失败的统计方式相同。
    #[error("{0}")]
    Failed(String),
    /// Any other condition raised while running. / 运行时抛出的任何其他条件。
    #[error(transparent)]
    Error(#[from] anyhow::Error),
}

impl TestError {
    pub fn skip(reason: impl Into<String>) -> Self {
        TestError::Skipped(reason.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        TestError::Failed(message.into())
    }

    pub fn error(message: impl fmt::Display) -> Self {
        TestError::Error(anyhow::anyhow!("{message}"))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, TestError::Skipped(_))
    }
}

/// What every test function, `set_up` and `tear_down` returns.
pub type CaseResult = Result<(), TestError>;

/// Returns early from a test function with a skip.
///
/// ```
/// use tagtest::{skip, CaseResult};
///
/// fn test_needs_network() -> CaseResult {
///     skip!("no network in this sandbox");
/// }
/// assert!(test_needs_network().unwrap_err().is_skip());
/// ```
#[macro_export]
macro_rules! skip {
    ($($arg:tt)*) => {
        return Err($crate::core::models::TestError::skip(format!($($arg)*)))
    };
}

/// Returns early from a test function with a failure.
#[macro_export]
macro_rules! fail {
    ($($arg:tt)*) => {
        return Err($crate::core::models::TestError::fail(format!($($arg)*)))
    };
}

/// A fixture shared by the test functions of one case class.
///
/// A fresh fixture is created (via `Default`) for every test function, then
/// `set_up` runs, then the function, then `tear_down`. `tear_down` runs
/// whenever `set_up` succeeded, even when the test function panicked.
///
/// 一个用例类中测试函数共享的夹具。每个测试函数都会创建一个新的夹具。
pub trait TestCase: Default + 'static {
    fn set_up(&mut self) -> CaseResult {
        Ok(())
    }

    fn tear_down(&mut self) -> CaseResult {
        Ok(())
    }
}

/// The unit fixture, for case classes without any state.
impl TestCase for () {}

/// Name, explicit tags and description of one test function.
///
/// `&str` converts into a spec with just a name, so plain registrations stay short:
///
/// ```
/// use tagtest::{CaseClass, TestSpec};
///
/// let class = CaseClass::of::<()>("BasicTestCase")
///     .test("test_def", |_| Ok(()))
///     .test(TestSpec::new("test_class").tag("knownfailure").doc("Classes work."), |_| Ok(()))
///     .build();
/// assert_eq!(class.methods().count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSpec {
    name: String,
    tags: Option<Vec<String>>,
    doc: Option<String>,
    time_limit: Option<Duration>,
}

impl TestSpec {
    pub fn new(name: impl Into<String>) -> Self {
        TestSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .get_or_insert_with(Vec::new)
            .extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Fails the test when it runs longer than `limit` (plus [`TIME_TOLERANCE`]).
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for TestSpec {
    fn from(name: &str) -> Self {
        TestSpec::new(name)
    }
}

impl From<String> for TestSpec {
    fn from(name: String) -> Self {
        TestSpec::new(name)
    }
}

type Body = Rc<dyn Fn() -> CaseResult>;

/// A registered test function with its type-erased body.
pub struct TestMethod {
    spec: TestSpec,
    body: Body,
}

impl TestMethod {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.spec.tags.as_deref()
    }

    pub fn doc(&self) -> Option<&str> {
        self.spec.doc.as_deref()
    }

    /// Runs the full fixture lifecycle for this method.
    pub fn invoke(&self) -> CaseResult {
        (self.body)()
    }
}

impl fmt::Debug for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestMethod")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

/// A named group of test functions sharing one fixture type.
/// 共享同一夹具类型的一组命名测试函数。
#[derive(Debug, Clone)]
pub struct CaseClass {
    name: String,
    tags: Option<Vec<String>>,
    methods: Vec<Rc<TestMethod>>,
}

impl CaseClass {
    /// Starts registering a case class whose test functions run against `T`.
    pub fn of<T: TestCase>(name: impl Into<String>) -> CaseBuilder<T> {
        CaseBuilder {
            class: CaseClass {
                name: name.into(),
                tags: None,
                methods: Vec::new(),
            },
            _fixture: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    pub fn is_private(&self) -> bool {
        self.name.starts_with(PRIVATE_MARKER)
    }

    pub fn methods(&self) -> impl Iterator<Item = &TestMethod> {
        self.methods.iter().map(Rc::as_ref)
    }

    /// One instance per declared test function, in declaration order.
    pub fn instances(&self) -> impl Iterator<Item = CaseInstance> + '_ {
        self.methods.iter().map(|method| CaseInstance {
            class_name: self.name.clone(),
            case_tags: self.tags.clone(),
            method: Rc::clone(method),
        })
    }
}

/// Builder returned by [`CaseClass::of`].
pub struct CaseBuilder<T> {
    class: CaseClass,
    _fixture: PhantomData<fn() -> T>,
}

impl<T: TestCase> CaseBuilder<T> {
    /// Explicit tags shared by every test function of the class.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class
            .tags
            .get_or_insert_with(Vec::new)
            .extend(tags.into_iter().map(Into::into));
        self
    }

    /// Registers a test function.
    pub fn test<F>(mut self, spec: impl Into<TestSpec>, f: F) -> Self
    where
        F: Fn(&mut T) -> CaseResult + 'static,
    {
        let spec = spec.into();
        let time_limit = spec.time_limit;
        let body: Body = Rc::new(move || {
            let mut fixture = T::default();
            fixture.set_up()?;
            let started = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&mut fixture)));
            let elapsed = started.elapsed();
            let teardown = fixture.tear_down();
            let result = match outcome {
                Ok(result) => result.and(teardown),
                Err(payload) => panic::resume_unwind(payload),
            };
            match time_limit {
                Some(limit) if elapsed > limit + TIME_TOLERANCE => Err(TestError::fail(format!(
                    "Test was too long ({:.2} s)",
                    elapsed.as_secs_f64()
                ))),
                _ => result,
            }
        });
        self.class.methods.push(Rc::new(TestMethod { spec, body }));
        self
    }

    pub fn build(self) -> CaseClass {
        self.class
    }
}

impl<T: TestCase> From<CaseBuilder<T>> for CaseClass {
    fn from(builder: CaseBuilder<T>) -> Self {
        builder.build()
    }
}

/// The capability of an instantiated, runnable test case.
///
/// Discovery and reporting only ever see instances through this trait.
/// An instance records the name of the test method it will run; older
/// implementations may only expose it under `legacy_method_name`.
///
/// 已实例化、可运行的测试用例的能力。
pub trait RunnableCase {
    fn class_name(&self) -> &str;

    fn case_tags(&self) -> Option<&[String]>;

    fn method_name(&self) -> Option<&str>;

    fn legacy_method_name(&self) -> Option<&str> {
        None
    }

    fn method_tags(&self) -> Option<&[String]>;

    fn doc(&self) -> Option<&str>;

    fn run(&self) -> CaseResult;
}

/// The instance produced by [`CaseClass::instances`].
#[derive(Debug, Clone)]
pub struct CaseInstance {
    class_name: String,
    case_tags: Option<Vec<String>>,
    method: Rc<TestMethod>,
}

impl RunnableCase for CaseInstance {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn case_tags(&self) -> Option<&[String]> {
        self.case_tags.as_deref()
    }

    fn method_name(&self) -> Option<&str> {
        Some(self.method.name())
    }

    fn method_tags(&self) -> Option<&[String]> {
        self.method.tags()
    }

    fn doc(&self) -> Option<&str> {
        self.method.doc()
    }

    fn run(&self) -> CaseResult {
        self.method.invoke()
    }
}

/// Produces the ordered list of case classes a module exposes, replacing
/// the default enumeration of its registered cases.
pub type CaseFactory = Box<dyn Fn() -> Vec<CaseClass>>;

/// A loaded test module. / 已加载的测试模块。
pub struct Module {
    name: String,
    path: PathBuf,
    tags: Option<Vec<String>>,
    cases: Vec<CaseClass>,
    case_factory: Option<CaseFactory>,
}

impl Module {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Module {
            name: name.into(),
            path: path.into(),
            tags: None,
            cases: Vec::new(),
            case_factory: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file (or package directory) the module was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tags(&self) -> Option<&[String]> {
        self.tags.as_deref()
    }

    /// Declares module-level explicit tags.
    pub fn declare_tags<I, S>(&mut self, tags: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .get_or_insert_with(Vec::new)
            .extend(tags.into_iter().map(Into::into));
        self
    }

    /// Registers a case class for default enumeration.
    pub fn case(&mut self, class: impl Into<CaseClass>) -> &mut Self {
        self.cases.push(class.into());
        self
    }

    /// Lets the module decide exactly which case classes are exposed, and in
    /// which order. Registered cases are ignored once a factory is set.
    pub fn with_case_factory<F>(&mut self, factory: F) -> &mut Self
    where
        F: Fn() -> Vec<CaseClass> + 'static,
    {
        self.case_factory = Some(Box::new(factory));
        self
    }

    pub fn cases(&self) -> &[CaseClass] {
        &self.cases
    }

    pub fn case_factory(&self) -> Option<&CaseFactory> {
        self.case_factory.as_ref()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("tags", &self.tags)
            .field("cases", &self.cases.len())
            .field("case_factory", &self.case_factory.is_some())
            .finish()
    }
}

/// One schedulable test: a (module, case, function) triple.
///
/// The short name is computed once at construction and never changes.
/// 一个可调度的测试：（模块、用例、函数）三元组。
pub struct TestDescriptor {
    module: Rc<Module>,
    case: Box<dyn RunnableCase>,
    function_name: String,
    short_name: String,
}

impl TestDescriptor {
    pub fn new(
        module: Rc<Module>,
        case: Box<dyn RunnableCase>,
        function_name: impl Into<String>,
    ) -> Self {
        let function_name = function_name.into();
        let short_name = [
            normalize(module.name()),
            normalize(case.class_name()),
            normalize(&function_name),
        ]
        .join("/");
        TestDescriptor {
            module,
            case,
            function_name,
            short_name,
        }
    }

    /// Builds a descriptor from an instance, taking the function name from
    /// the instance's recorded method name. `None` when the instance records
    /// none under either name.
    pub fn from_case(module: Rc<Module>, case: Box<dyn RunnableCase>) -> Option<Self> {
        let function_name = case
            .method_name()
            .or_else(|| case.legacy_method_name())?
            .to_string();
        Some(TestDescriptor::new(module, case, function_name))
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn case(&self) -> &dyn RunnableCase {
        self.case.as_ref()
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// `Class.function`, as shown in the long listing.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.case.class_name(), self.function_name)
    }

    /// Module, case and function tags, in that order, flattened.
    pub fn explicit_tags(&self) -> Vec<String> {
        let declared = self
            .module
            .tags()
            .unwrap_or_default()
            .iter()
            .chain(self.case.case_tags().unwrap_or_default())
            .chain(self.case.method_tags().unwrap_or_default());
        flatten(declared)
    }

    /// Tags derived from the module, case and function names.
    pub fn implicit_tags(&self) -> Vec<String> {
        let module = self.module.name();
        let class = self.case.class_name();
        flatten([
            module.to_lowercase(),
            normalize(module),
            class.to_lowercase(),
            normalize(class),
            self.function_name.clone(),
            normalize(&self.function_name),
        ])
    }

    /// Explicit then implicit tags. Duplicates are kept.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = self.explicit_tags();
        tags.extend(self.implicit_tags());
        tags
    }

    pub fn documentation(&self) -> &str {
        self.case.doc().unwrap_or_default()
    }

    pub fn run(&self) -> CaseResult {
        self.case.run()
    }
}

impl fmt::Display for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name)
    }
}

impl fmt::Debug for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Test {}>", self.short_name)
    }
}
