//! Shared utilities for pipeline integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A throwaway tree root with a `projects/` directory.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("projects")).unwrap();
        Self { dir }
    }

    /// A tree root with no `projects/` directory at all.
    #[allow(dead_code)]
    pub fn without_projects() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `projects/<project>/.devkit/devkit.yml` and return its path.
    pub fn declare(&self, project: &str, yaml: &str) -> PathBuf {
        let dir = self.root().join("projects").join(project).join(".devkit");
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("devkit.yml");
        fs::write(&file, yaml).unwrap();
        file
    }

    #[allow(dead_code)]
    pub fn write_env(&self, contents: &str) {
        fs::write(self.root().join(".env"), contents).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }

    #[allow(dead_code)]
    pub fn exists(&self, relative: &str) -> bool {
        self.root().join(relative).exists()
    }

    /// Path of a declaration as it appears in `# Source:` lines.
    #[allow(dead_code)]
    pub fn source_of(&self, project: &str) -> PathBuf {
        self.root()
            .join("projects")
            .join(project)
            .join(".devkit/devkit.yml")
    }
}
