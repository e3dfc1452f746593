//! Artifact staging: assembles result files on disk before upload

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::client::SbomArchive;
use crate::error::Result;

/// One staged JSON file: `<stagingDir>/<name>.json`
#[derive(Debug, Clone)]
pub struct ArtifactSpec {
    pub name: String,
    pub content: Value,
}

impl ArtifactSpec {
    pub fn new(name: impl Into<String>, content: Value) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// Writes result artifacts into a flat staging directory.
///
/// The directory is created on first use; re-staging the same specs
/// overwrites the same files with identical content.
pub struct ArtifactStager {
    dir: PathBuf,
}

impl ArtifactStager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Serialize each spec to `<dir>/<name>.json`, returning the written
    /// paths in input order.
    pub fn stage(&self, specs: &[ArtifactSpec]) -> Result<Vec<PathBuf>> {
        self.ensure_dir()?;

        let mut files = Vec::with_capacity(specs.len());
        for spec in specs {
            let path = self.dir.join(format!("{}.json", spec.name));
            fs::write(&path, serde_json::to_vec(&spec.content)?)?;
            files.push(path);
        }
        Ok(files)
    }

    /// Write a downloaded archive under its server-supplied filename.
    pub fn write_archive(&self, archive: &SbomArchive) -> Result<PathBuf> {
        self.ensure_dir()?;

        let path = self.dir.join(&archive.file_name);
        fs::write(&path, &archive.bytes)?;
        Ok(path)
    }
}
