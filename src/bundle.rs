//! Build output as seen between bundling and writing.
//!
//! A [`Bundle`] is the set of text artifacts a build produced, keyed by file
//! name relative to the output root. The localization pipeline reads the HTML
//! artifact from it, replaces that artifact with the default locale's page and
//! emits new files for every other locale. Only replaced and emitted files are
//! written back to disk.

use crate::error::{LocalizeError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENTRY_FILE: &str = "index.html";

/// Where a bundle file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Produced by the build, untouched since
    Original,
    /// Produced by the build, then rewritten
    Replaced,
    /// Added after the build
    Emitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub file_name: String,
    pub source: String,
    pub state: FileState,
}

/// Insertion-ordered set of text artifacts.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    files: Vec<BundleFile>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a build artifact.
    pub fn add(&mut self, file_name: impl Into<String>, source: impl Into<String>) {
        self.files.push(BundleFile {
            file_name: file_name.into(),
            source: source.into(),
            state: FileState::Original,
        });
    }

    /// Collect the top-level `.html` files of a build directory, sorted by name.
    ///
    /// Other assets are not loaded; the pipeline never touches them.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let io_err = |source| LocalizeError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "html") {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();

        let mut bundle = Self::new();
        for name in names {
            let path = dir.join(&name);
            let source = std::fs::read_to_string(&path)
                .map_err(|source| LocalizeError::Io { path, source })?;
            debug!("Loaded {} ({} bytes)", name, source.len());
            bundle.add(name, source);
        }
        Ok(bundle)
    }

    /// The HTML artifact to localize: `index.html` when present, otherwise
    /// the first HTML artifact.
    pub fn html_entry(&self) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.file_name == ENTRY_FILE)
            .or_else(|| self.files.iter().find(|file| file.file_name.ends_with(".html")))
            .map(|file| file.file_name.as_str())
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.file_name == file_name)
            .map(|file| file.source.as_str())
    }

    /// Replace an existing artifact. Returns `false` if it does not exist.
    pub fn replace(&mut self, file_name: &str, source: String) -> bool {
        match self.files.iter_mut().find(|file| file.file_name == file_name) {
            Some(file) => {
                file.source = source;
                if file.state == FileState::Original {
                    file.state = FileState::Replaced;
                }
                true
            }
            None => false,
        }
    }

    /// Emit a new artifact, overwriting one of the same name.
    pub fn emit(&mut self, file_name: impl Into<String>, source: String) {
        let file_name = file_name.into();
        match self.files.iter_mut().find(|file| file.file_name == file_name) {
            Some(file) => {
                file.source = source;
                file.state = FileState::Emitted;
            }
            None => self.files.push(BundleFile {
                file_name,
                source,
                state: FileState::Emitted,
            }),
        }
    }

    pub fn files(&self) -> &[BundleFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every replaced or emitted file under `dir`, creating parent
    /// directories. Returns the written paths.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut written = Vec::new();

        for file in self.files.iter().filter(|f| f.state != FileState::Original) {
            let path = dir.join(&file.file_name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| LocalizeError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&path, &file.source).map_err(|source| LocalizeError::Io {
                path: path.clone(),
                source,
            })?;
            debug!("Wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}
