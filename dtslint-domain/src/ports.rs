use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;

/// Read-only access to one package directory.
///
/// dtslint-domain uses this so metadata discovery can be tested against an in-memory implementation.
pub trait PackageView {
    fn root(&self) -> &Utf8Path;

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String>;

    fn exists(&self, rel: &Utf8Path) -> bool;

    /// Names of the immediate subdirectories of the package root, sorted.
    fn subdirectories(&self) -> anyhow::Result<Vec<String>>;
}

/// File-system backed `PackageView`.
#[derive(Debug, Clone)]
pub struct FsPackageView {
    root: Utf8PathBuf,
}

impl FsPackageView {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    fn abs(&self, rel: &Utf8Path) -> Utf8PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl PackageView for FsPackageView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String> {
        let abs = self.abs(rel);
        fs::read_to_string(&abs).with_context(|| format!("read {}", abs))
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).exists()
    }

    fn subdirectories(&self) -> anyhow::Result<Vec<String>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.root).with_context(|| format!("list {}", self.root))? {
            let entry = entry.with_context(|| format!("list {}", self.root))?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => out.push(name),
                Err(name) => anyhow::bail!("non UTF-8 directory name {:?} in {}", name, self.root),
            }
        }
        out.sort();
        Ok(out)
    }
}
