use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn tagtest() -> Command {
    let mut cmd = Command::cargo_bin("tagtest").unwrap();
    cmd.env_remove("TAGTEST_NETWORK");
    cmd
}

/// Running the whole demo suite reports the known failure and the skip,
/// and exits with a failing status.
///
/// 运行整个演示套件会报告已知失败和跳过，并以失败状态退出。
#[test]
fn test_full_run_reports_failure_and_skip() {
    tagtest()
        .assert()
        .failure()
        .stdout(predicate::str::contains("python/basic/def ... ok"))
        .stdout(predicate::str::contains(
            "perl/eclectic/foo ... skipped (needs a camel)",
        ))
        .stdout(predicate::str::contains("FAIL: perl/eclectic/bar"))
        .stdout(predicate::str::contains("Ran 6 tests in "))
        .stdout(predicate::str::contains("FAILED (1 failure, 1 skip)"));
}

/// Excluding the known failure turns the run green; skips do not count.
///
/// 排除已知失败后运行成功；跳过不计为失败。
#[test]
fn test_excluding_known_failures_succeeds() {
    tagtest()
        .arg("--")
        .arg("-knownfailure")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ran 5 tests in "))
        .stdout(predicate::str::contains("OK (1 skip)"))
        .stdout(predicate::str::contains("perl/eclectic/bar").not());
}

/// Include tags are conjunctive.
#[test]
fn test_include_tags_must_all_match() {
    tagtest()
        .args(["python", "cpln"])
        .assert()
        .success()
        .stdout(predicate::str::contains("python/basic/class ... ok"))
        .stdout(predicate::str::contains("Ran 1 test in "));
}

/// A short name copied from the listing selects exactly that test.
///
/// 从列表中复制的短名称恰好选中该测试。
#[test]
fn test_short_name_round_trips() {
    tagtest()
        .arg("python/complex/bar")
        .assert()
        .success()
        .stdout(predicate::str::contains("python/complex/bar ... ok"))
        .stdout(predicate::str::contains("Ran 1 test in "));
}

#[test]
fn test_short_listing() {
    tagtest()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("python/basic/def    [guido] Splitting"))
        .stdout(predicate::str::contains(
            "perl/eclectic/bar   [larry wall knownfailure]",
        ))
        .stdout(predicate::str::contains("Ran ").not())
        .stdout(predicate::str::contains("_sigil").not())
        .stdout(predicate::str::contains("network").not());
}

#[test]
fn test_long_listing_with_verbose() {
    tagtest()
        .args(["-l", "-v", "perl", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mod.rs: EclecticTestCase.test_foo()"))
        .stdout(predicate::str::contains("    name: perl/eclectic/foo"))
        .stdout(predicate::str::contains(
            "    tags: larry wall test_perl perl eclectictestcase eclectic test_foo foo",
        ))
        .stdout(predicate::str::contains("    Needs a perl interpreter on PATH."));
}

/// Repeating a flag is not an error; the last verbosity flag wins.
#[test]
fn test_repeated_flags_are_accepted() {
    tagtest()
        .args(["-l", "-l", "-v", "-v", "perl", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("    name: perl/eclectic/foo"));

    tagtest()
        .args(["-d", "-q", "-q", "--list", "guido"])
        .assert()
        .success()
        .stderr(predicate::str::contains("module skipped").not());
}

/// A listing that selects nothing prints nothing.
#[test]
fn test_empty_listing_is_silent() {
    tagtest()
        .args(["--list", "no-such-tag"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

/// The module that opts out at load time is logged, never fatal.
///
/// 在加载时选择退出的模块会被记录，但不会导致失败。
#[test]
fn test_skipped_module_is_logged() {
    tagtest()
        .args(["--list", "guido"])
        .assert()
        .success()
        .stderr(predicate::str::contains("'test_network' module skipped"));

    tagtest()
        .args(["-q", "--list", "guido"])
        .assert()
        .success()
        .stderr(predicate::str::contains("module skipped").not());
}

#[test]
fn test_help_exits_zero() {
    tagtest()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("-L <NAME:LEVEL>"))
        .stdout(predicate::str::contains("the '--' is necessary"));
}

/// A tag that looks like an option is a usage error with a hint.
///
/// 看起来像选项的标签是一个用法错误，并附带提示。
#[test]
fn test_dash_tag_without_separator_is_an_error() {
    tagtest()
        .arg("-knownfailure")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "did you need a '--' before a '-TAG' argument?",
        ));
}
