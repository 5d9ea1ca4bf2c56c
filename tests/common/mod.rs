#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    fixture_dir().join(name)
}

/// Folder holding the data table fixtures and their `USA` overrides.
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` under the workspace, creating parent folders, and
    /// returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent folders");
        }
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a data table document whose `<Class>` records carry `records`.
    pub fn write_table<R>(&self, name: &str, records: &[R]) -> PathBuf
    where
        R: AsRef<[(&'static str, &'static str)]>,
    {
        let mut document = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<idspace>\n");
        for record in records {
            document.push_str("  <Class");
            for (attribute, value) in record.as_ref() {
                document.push_str(&format!(" {attribute}=\"{value}\""));
            }
            document.push_str("/>\n");
        }
        document.push_str("</idspace>\n");
        self.write(name, &document)
    }
}
