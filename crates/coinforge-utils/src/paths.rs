use camino::Utf8PathBuf;
use std::cell::RefCell;

// Thread-local override used only in tests to avoid process-global env races.
thread_local! {
    static THREAD_HOME: RefCell<Option<Utf8PathBuf>> = const { RefCell::new(None) };
}

/// Resolve coinforge home:
/// 1) thread-local override (tests use this)
/// 2) env `COINFORGE_HOME` (opt-in for users/CI)
/// 3) default ".coinforge"
#[must_use]
pub fn coinforge_home() -> Utf8PathBuf {
    if let Some(tl) = THREAD_HOME.with(|tl| tl.borrow().clone()) {
        return tl;
    }
    if let Ok(p) = std::env::var("COINFORGE_HOME") {
        return Utf8PathBuf::from(p);
    }
    Utf8PathBuf::from(".coinforge")
}

/// Returns `<COINFORGE_HOME>/projects/<owner>`
#[must_use]
pub fn owner_root(owner: &str) -> Utf8PathBuf {
    coinforge_home().join("projects").join(owner)
}

/// Returns the default launch kit output directory for a project,
/// `<COINFORGE_HOME>/kits/<project>`.
#[must_use]
pub fn kit_root(project: &str) -> Utf8PathBuf {
    coinforge_home().join("kits").join(project)
}

/// mkdir -p; treat `AlreadyExists` as success (removes TOCTTOU races)
pub fn ensure_dir_all<P: AsRef<std::path::Path>>(p: P) -> std::io::Result<()> {
    match std::fs::create_dir_all(&p) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// Test helper: provides isolated home directories; not part of public API
/// stability guarantees.
///
/// Give this test a unique home under the system temp dir.
/// Hold the `TempDir` for the test's duration so the directory stays alive.
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(not(test), allow(dead_code))]
#[must_use]
pub fn with_isolated_home() -> tempfile::TempDir {
    let td = tempfile::TempDir::new().expect("create temp home");
    let p = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    THREAD_HOME.with(|tl| *tl.borrow_mut() = Some(p));
    td
}
