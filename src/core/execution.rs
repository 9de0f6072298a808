//! # Test Execution Module / 测试执行模块
//!
//! Runs one test function and classifies how it ended. A skip raised by
//! test code, whether returned or thrown with `panic_any`, is classified as
//! a skip here, never as an error.
//!
//! 运行单个测试函数并对其结束方式进行分类。测试代码抛出的跳过信号
//! 在此处被归类为跳过，而不是错误。

use crate::core::models::{TestDescriptor, TestError};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::Once;

/// How a single test ended. / 单个测试的结束方式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    /// An assertion failure or an explicit `TestError::Failed`.
    Fail(String),
    /// Anything else the test raised.
    Error(String),
    Skip(String),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Outcome::Skip(_))
    }

    /// The captured cause, empty for a pass.
    pub fn cause(&self) -> &str {
        match self {
            Outcome::Pass => "",
            Outcome::Fail(cause) | Outcome::Error(cause) | Outcome::Skip(cause) => cause,
        }
    }
}

impl From<TestError> for Outcome {
    fn from(err: TestError) -> Self {
        match err {
            TestError::Skipped(reason) => Outcome::Skip(reason),
            TestError::Failed(message) => Outcome::Fail(message),
            TestError::Error(err) => Outcome::Error(format!("{err:#}")),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => f.write_str("ok"),
            Outcome::Fail(_) => f.write_str("FAIL"),
            Outcome::Error(_) => f.write_str("ERROR"),
            Outcome::Skip(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

/// Runs the descriptor's test function and classifies the result.
///
/// Returned errors are classified by their [`TestError`] kind, and so is a
/// `TestError` thrown with `panic_any`. Any other panic counts as a failed
/// assertion and becomes [`Outcome::Fail`], including panics that are not
/// assertions such as `unwrap()` on `None`. Return `TestError::Error` (or
/// use `?` on an `anyhow` error) to report such a condition as an error.
pub fn execute(descriptor: &TestDescriptor) -> Outcome {
    let _capture = PanicCapture::install();
    match panic::catch_unwind(AssertUnwindSafe(|| descriptor.run())) {
        Ok(Ok(())) => Outcome::Pass,
        Ok(Err(err)) => err.into(),
        Err(payload) => match payload.downcast::<TestError>() {
            Ok(err) => (*err).into(),
            Err(payload) => Outcome::Fail(
                PanicCapture::take_report().unwrap_or_else(|| panic_message(payload.as_ref())),
            ),
        },
    }
}

/// Extracts the message of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "test panicked".to_string()
    }
}

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

static FORWARDING_HOOK: Once = Once::new();

thread_local! {
    static LAST_PANIC: RefCell<Option<String>> = const { RefCell::new(None) };
    static CAPTURE_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Replaces the process hook once with one that records panics on threads
/// holding a [`PanicCapture`] and hands every other panic to the hook it
/// replaced.
fn install_forwarding_hook() {
    FORWARDING_HOOK.call_once(|| {
        let previous: PanicHook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURE_DEPTH.try_with(Cell::get).unwrap_or(0) == 0 {
                previous(info);
                return;
            }
            if info.payload().downcast_ref::<TestError>().is_some() {
                return;
            }
            let report = info.to_string();
            let _ = LAST_PANIC.try_with(|last| *last.borrow_mut() = Some(report));
        }));
    });
}

/// While alive, panics on the current thread are recorded (message and
/// location) instead of being printed. Panics on other threads still reach
/// the previous hook. Captures nest.
///
/// 存活期间，当前线程的 panic 会被记录（消息和位置）而不是被打印；
/// 其他线程的 panic 仍交给原有钩子处理。
pub struct PanicCapture {
    // The depth is per thread, so the guard must be dropped where it was made.
    _thread_bound: PhantomData<*const ()>,
}

impl PanicCapture {
    pub fn install() -> Self {
        install_forwarding_hook();
        LAST_PANIC.with(|last| last.borrow_mut().take());
        CAPTURE_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            _thread_bound: PhantomData,
        }
    }

    /// The report of the last panic on this thread, if any.
    pub fn take_report() -> Option<String> {
        LAST_PANIC.with(|last| last.borrow_mut().take())
    }
}

impl Drop for PanicCapture {
    fn drop(&mut self) {
        let _ = CAPTURE_DEPTH.try_with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
