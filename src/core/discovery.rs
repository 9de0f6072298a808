//! # Test Discovery Module / 测试发现模块
//!
//! Finds `test_*` modules in the search directories, loads them through a
//! [`ModuleLoader`] and enumerates the test functions they expose as a flat,
//! lazy stream of [`TestDescriptor`]s.
//!
//! A module that fails to load, or opts out of loading, is logged and left
//! out; it never aborts discovery as a whole.
//!
//! 在搜索目录中查找 `test_*` 模块，通过 [`ModuleLoader`] 加载它们，并将其
//! 暴露的测试函数枚举为扁平、惰性的 [`TestDescriptor`] 流。加载失败的模块
//! 只会被记录并跳过，不会中止整个发现过程。

use crate::core::execution::{PanicCapture, panic_message};
use crate::core::models::{Module, RunnableCase, TestDescriptor};
use crate::infra::fs::normalize_dir;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

/// File and directory names of test modules start with this prefix.
pub const MODULE_PREFIX: &str = "test_";

/// Where test modules live on disk.
/// 测试模块在磁盘上的布局。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLayout {
    /// Extensions of single-file modules (`test_<name>.<ext>`).
    pub extensions: Vec<String>,
    /// File that marks a `test_<name>/` directory as a module.
    pub entry_point: String,
}

impl Default for ModuleLayout {
    fn default() -> Self {
        Self {
            extensions: vec!["rs".to_string()],
            entry_point: "mod.rs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// `test_<name>.<ext>`
    File,
    /// `test_<name>/` with an entry point inside.
    Package,
}

/// A location that looks like a test module and may be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCandidate {
    name: String,
    path: PathBuf,
    kind: CandidateKind,
    source: PathBuf,
}

impl ModuleCandidate {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: CandidateKind) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            source: path.clone(),
            path,
            kind,
        }
    }

    /// Names the file inside a package directory that holds its code.
    pub fn with_entry_point(mut self, entry_point: impl AsRef<Path>) -> Self {
        if self.kind == CandidateKind::Package {
            self.source = self.path.join(entry_point);
        }
        self
    }

    fn file(path: PathBuf) -> Option<Self> {
        let name = path.file_stem()?.to_str()?.to_string();
        Some(Self::new(name, path, CandidateKind::File))
    }

    fn package(path: PathBuf, entry_point: &str) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        Some(Self::new(name, path, CandidateKind::Package).with_entry_point(entry_point))
    }

    /// Module name: the file stem or the directory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file holding the module's code: the file itself, or the entry
    /// point of a package.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn kind(&self) -> CandidateKind {
        self.kind
    }
}

/// Why a candidate did not become a loaded module.
/// 候选项未能成为已加载模块的原因。
#[derive(Debug, Error)]
pub enum LoadError {
    /// The module opted out of being loaded. Logged like
    /// [`LoadOutcome::Skipped`], whichever way a loader reports it.
    #[error("{0}")]
    Skipped(String),
    #[error("no test module registered under '{0}'")]
    NotRegistered(String),
    #[error("module initialisation panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Init(#[from] anyhow::Error),
}

impl LoadError {
    pub fn skip(reason: impl Into<String>) -> Self {
        LoadError::Skipped(reason.into())
    }
}

/// Result of trying to load one candidate.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Module),
    Skipped(String),
    Failed(LoadError),
}

/// Turns a candidate location into a loaded [`Module`].
pub trait ModuleLoader {
    fn load(&self, candidate: &ModuleCandidate) -> LoadOutcome;
}

impl<F> ModuleLoader for F
where
    F: Fn(&ModuleCandidate) -> LoadOutcome,
{
    fn load(&self, candidate: &ModuleCandidate) -> LoadOutcome {
        self(candidate)
    }
}

/// Initialises a freshly created module: declares tags and registers cases.
pub type ModuleInit = Box<dyn Fn(&mut Module) -> Result<(), LoadError>>;

/// The default loader: maps module names found on disk to the code that
/// registers their test cases.
///
/// ```
/// use tagtest::{CaseClass, Registry};
///
/// let mut registry = Registry::new();
/// registry.register("test_python", |m| {
///     m.declare_tags(["guido"]);
///     m.case(CaseClass::of::<()>("BasicTestCase").test("test_def", |_| Ok(())));
///     Ok(())
/// });
/// assert!(registry.contains("test_python"));
/// ```
#[derive(Default)]
pub struct Registry {
    modules: HashMap<String, ModuleInit>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, init: F) -> &mut Self
    where
        F: Fn(&mut Module) -> Result<(), LoadError> + 'static,
    {
        self.modules.insert(name.into(), Box::new(init));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.modules.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("modules", &names).finish()
    }
}

impl ModuleLoader for Registry {
    fn load(&self, candidate: &ModuleCandidate) -> LoadOutcome {
        let Some(init) = self.modules.get(candidate.name()) else {
            return LoadOutcome::Failed(LoadError::NotRegistered(candidate.name().to_string()));
        };

        let mut module = Module::new(candidate.name(), candidate.source());
        let _capture = PanicCapture::install();
        match panic::catch_unwind(AssertUnwindSafe(|| init(&mut module))) {
            Ok(Ok(())) => LoadOutcome::Loaded(module),
            Ok(Err(LoadError::Skipped(reason))) => LoadOutcome::Skipped(reason),
            Ok(Err(err)) => LoadOutcome::Failed(err),
            Err(payload) => LoadOutcome::Failed(LoadError::Panicked(panic_message(payload.as_ref()))),
        }
    }
}

/// Lists the module candidates in `directory`: single-file modules first,
/// then package directories. Each group is in glob order.
///
/// 列出目录中的模块候选项：先是单文件模块，然后是包目录。
pub fn enumerate_module_candidates(
    directory: PathBuf,
    layout: &ModuleLayout,
) -> impl Iterator<Item = ModuleCandidate> + '_ {
    let base = glob::Pattern::escape(&directory.to_string_lossy());

    let files = {
        let base = base.clone();
        layout
            .extensions
            .iter()
            .flat_map(move |ext| glob_paths(&format!("{base}/{MODULE_PREFIX}*.{ext}")))
            .filter(|path| path.is_file())
            .filter_map(ModuleCandidate::file)
    };

    let packages = glob_paths(&format!("{base}/{MODULE_PREFIX}*"))
        .filter(move |path| path.is_dir() && path.join(&layout.entry_point).is_file())
        .filter_map(|path| ModuleCandidate::package(path, &layout.entry_point));

    files.chain(packages)
}

fn glob_paths(pattern: &str) -> impl Iterator<Item = PathBuf> + use<> {
    glob::glob(pattern)
        .inspect_err(|e| warn!("invalid module pattern '{}': {}", pattern, e))
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
}

/// Loads every candidate of every directory, in the order given. Modules
/// that are skipped or fail to load are logged and left out.
pub fn load_modules<'a>(
    directories: &'a [PathBuf],
    layout: &'a ModuleLayout,
    loader: &'a dyn ModuleLoader,
) -> impl Iterator<Item = Rc<Module>> + 'a {
    directories
        .iter()
        .flat_map(move |dir| enumerate_module_candidates(normalize_dir(dir), layout))
        .filter_map(move |candidate| load_candidate(loader, &candidate))
}

fn load_candidate(loader: &dyn ModuleLoader, candidate: &ModuleCandidate) -> Option<Rc<Module>> {
    debug!("import test module '{}'", candidate.path().display());
    match loader.load(candidate) {
        LoadOutcome::Loaded(module) => Some(Rc::new(module)),
        LoadOutcome::Skipped(reason) | LoadOutcome::Failed(LoadError::Skipped(reason)) => {
            warn!("'{}' module skipped: {}", candidate.name(), reason);
            None
        }
        LoadOutcome::Failed(err) => {
            warn!(
                "could not import test module '{}': {} (skipping)",
                candidate.path().display(),
                err
            );
            None
        }
    }
}

/// Enumerates the runnable instances of one module.
///
/// A module with a case factory exposes exactly the (non-private) classes the
/// factory returns. Otherwise its registered classes are walked in order;
/// private class names are remembered for this pass so a repeated one is
/// skipped without logging again.
pub fn enumerate_tests(module: &Module) -> impl Iterator<Item = Box<dyn RunnableCase>> + use<> {
    let mut instances: Vec<Box<dyn RunnableCase>> = Vec::new();

    if let Some(factory) = module.case_factory() {
        for class in factory() {
            if class.is_private() {
                debug!("skip private TestCase class '{}'", class.name());
                continue;
            }
            instances.extend(class.instances().map(|i| Box::new(i) as Box<dyn RunnableCase>));
        }
    } else {
        let mut skipped: HashSet<&str> = HashSet::new();
        for class in module.cases() {
            if skipped.contains(class.name()) {
                continue;
            }
            if class.is_private() {
                debug!("skip private TestCase class '{}'", class.name());
                skipped.insert(class.name());
                continue;
            }
            instances.extend(class.instances().map(|i| Box::new(i) as Box<dyn RunnableCase>));
        }
    }

    instances.into_iter()
}

/// The full discovery pipeline: every test of every loaded module, in
/// module-load order then within-module order.
///
/// The stream is single-pass. Iterating it again re-runs module loading and
/// its logging, so collect it first if you need it twice.
pub fn enumerate_descriptors<'a>(
    directories: &'a [PathBuf],
    layout: &'a ModuleLayout,
    loader: &'a dyn ModuleLoader,
) -> impl Iterator<Item = TestDescriptor> + 'a {
    load_modules(directories, layout, loader).flat_map(|module| {
        enumerate_tests(&module).filter_map(move |case| {
            let class_name = case.class_name().to_string();
            let descriptor = TestDescriptor::from_case(Rc::clone(&module), case);
            if descriptor.is_none() {
                warn!(
                    "'{}' instance in module '{}' records no test method name (skipping)",
                    class_name,
                    module.name()
                );
            }
            descriptor
        })
    })
}
