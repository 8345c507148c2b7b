//! File-backed student store: one pretty-printed JSON file per student

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::Student;
use crate::infrastructure::traits::{FileSystem, StoreError, StoreResult, StudentStore};

const FILE_PREFIX: &str = "student_";
const FILE_EXTENSION: &str = "json";

/// Stores each student as `{dir}/student_{id}.json`.
pub struct JsonStudentStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl JsonStudentStore {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, student_id: &str) -> PathBuf {
        self.dir
            .join(format!("{FILE_PREFIX}{student_id}.{FILE_EXTENSION}"))
    }

    fn read(&self, path: &Path) -> StoreResult<Student> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| StoreError::io(format!("read {}", path.display()), e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::Serialization {
            context: path.display().to_string(),
            source: e,
        })
    }
}

impl StudentStore for JsonStudentStore {
    fn list(&self) -> StoreResult<Vec<Student>> {
        let files = self
            .fs
            .list_files(&self.dir, FILE_EXTENSION)
            .map_err(|e| StoreError::io(format!("list {}", self.dir.display()), e))?;

        let mut students = Vec::new();
        for path in files {
            let is_student_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(FILE_PREFIX));
            if !is_student_file {
                continue;
            }
            match self.read(&path) {
                Ok(student) => students.push(student),
                Err(e) => warn!("list: skipping {}: {}", path.display(), e),
            }
        }
        debug!("list: dir={}, count={}", self.dir.display(), students.len());
        Ok(students)
    }

    fn load(&self, student_id: &str) -> StoreResult<Option<Student>> {
        let path = self.path_for(student_id);
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        self.read(&path).map(Some)
    }

    fn save(&self, student: &Student) -> StoreResult<()> {
        let path = self.path_for(&student.student_id);
        debug!("save: path={}", path.display());
        let content =
            serde_json::to_string_pretty(student).map_err(|e| StoreError::Serialization {
                context: student.student_id.clone(),
                source: e,
            })?;
        self.fs
            .ensure_parent(&path)
            .map_err(|e| StoreError::io(format!("create {}", self.dir.display()), e))?;
        self.fs
            .write(&path, &content)
            .map_err(|e| StoreError::io(format!("write {}", path.display()), e))
    }

    fn delete(&self, student_id: &str) -> StoreResult<bool> {
        let path = self.path_for(student_id);
        if !self.fs.exists(&path) {
            return Ok(false);
        }
        self.fs
            .remove_file(&path)
            .map_err(|e| StoreError::io(format!("remove {}", path.display()), e))?;
        Ok(true)
    }

    fn exists(&self, student_id: &str) -> bool {
        self.fs.exists(&self.path_for(student_id))
    }
}
