// src/workspace.rs

//! Ephemeral per-generator working directory.
//!
//! Holds the unpacked function artifacts (one sub-directory per internal
//! function name) and the generated `template.yml`. The directory is removed
//! by [`Workspace::destroy`], or when the `Workspace` is dropped.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::TempDir;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::errors::Result;

const WORKSPACE_PREFIX: &str = "samlocal-";

#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()
            .context("creating workspace directory")?;
        debug!(path = %dir.path().display(), "workspace created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn function_dir(&self, internal_name: &str) -> PathBuf {
        self.dir.path().join(internal_name)
    }

    /// Extract the zip `archive` into `<workspace>/<internal_name>`.
    pub fn unpack(&self, archive: &Path, internal_name: &str) -> Result<PathBuf> {
        let target = self.function_dir(internal_name);
        fs::create_dir_all(&target)?;

        let file = File::open(archive)
            .with_context(|| format!("opening function artifact {}", archive.display()))?;
        let mut zip = ZipArchive::new(file)?;
        let entries = zip.len();
        zip.extract(&target)?;

        debug!(
            archive = %archive.display(),
            target = %target.display(),
            entries,
            "function artifact unpacked"
        );
        Ok(target)
    }

    /// Remove the directory and everything in it.
    pub fn destroy(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .with_context(|| format!("removing workspace {}", path.display()))?;
        info!(path = %path.display(), "workspace removed");
        Ok(())
    }
}
