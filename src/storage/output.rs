//! Output directory management

use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Root of the CSV output tree, one subdirectory per table
pub struct OutputDirectory {
    path: PathBuf,
}

impl OutputDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create the root if needed and remove everything inside it.
    ///
    /// Each run overwrites the previous one; runs must not share a root.
    pub fn prepare(path: impl AsRef<Path>) -> Result<Self> {
        let output = Self::new(path);
        std::fs::create_dir_all(&output.path).with_context(|| {
            format!("Failed to create output directory: {}", output.path.display())
        })?;
        output.clear()?;
        Ok(output)
    }

    /// Remove all files and directories under the root
    pub fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        for entry in std::fs::read_dir(&self.path)? {
            let path = entry?.path();
            let removed = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            removed.with_context(|| format!("Failed to remove {}", path.display()))?;
        }

        Ok(())
    }

    pub fn table_dir(&self, table: &str) -> PathBuf {
        self.path.join(table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
