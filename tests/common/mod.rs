#![allow(dead_code, unused_imports)]

use std::path::PathBuf;

use tempfile::TempDir;

pub use samlocal_test_utils::builders::{function_map, FunctionConfigBuilder};
pub use samlocal_test_utils::fixtures;
pub use samlocal_test_utils::{init_tracing, with_timeout};

/// Scratch directory holding `first.zip` (the hello-world handler).
pub struct Fixture {
    pub dir: TempDir,
    pub zip: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create fixture dir");
        let zip = fixtures::write_fixture_zip(dir.path(), "first.zip").expect("write fixture zip");
        Self { dir, zip }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}
