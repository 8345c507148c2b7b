//! I/O boundary traits for testability
//!
//! These traits abstract the catalog service, student persistence and the
//! filesystem, allowing services to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Student;

/// Kind of catalog record requested by group id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Module,
    Course,
}

impl RecordType {
    /// Path segment used by the Kori API.
    pub fn api_segment(&self) -> &'static str {
        match self {
            RecordType::Module => "modules",
            RecordType::Course => "course-units",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordType::Module => "module",
            RecordType::Course => "course",
        }
    }
}

/// The catalog could not complete a request.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Catalog service abstraction: maps ids and queries to raw record text.
///
/// `Ok(None)` means the catalog has no such record; `Err` means the request
/// itself failed. Implementations are shared across fetch branches and must
/// tolerate concurrent calls.
pub trait CatalogClient: Send + Sync {
    /// Fetch a record of the given type by group id.
    fn get_record(&self, kind: RecordType, group_id: &str)
        -> Result<Option<String>, TransportError>;

    fn get_module_record(&self, group_id: &str) -> Result<Option<String>, TransportError> {
        self.get_record(RecordType::Module, group_id)
    }

    fn get_course_record(&self, group_id: &str) -> Result<Option<String>, TransportError> {
        self.get_record(RecordType::Course, group_id)
    }

    /// Listing of all degree programmes.
    fn get_degree_programme_list(&self) -> Result<Option<String>, TransportError>;

    /// Full-text course search. Callers validate the keyword first.
    fn search_courses(&self, keyword: &str) -> Result<Option<String>, TransportError>;
}

/// Student persistence failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid student data: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque key-value store of student records keyed by student id.
pub trait StudentStore: Send + Sync {
    /// All stored students; unreadable entries are skipped.
    fn list(&self) -> StoreResult<Vec<Student>>;

    fn load(&self, student_id: &str) -> StoreResult<Option<Student>>;

    /// Insert or overwrite.
    fn save(&self, student: &Student) -> StoreResult<()>;

    /// Returns `false` when nothing was stored under the id.
    fn delete(&self, student_id: &str) -> StoreResult<bool>;

    fn exists(&self, student_id: &str) -> bool;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Files directly inside `dir` with the given extension, sorted.
    fn list_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn list_files(&self, dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        use walkdir::WalkDir;

        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == extension)
            {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}
