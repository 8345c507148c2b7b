//! Student records: registration, programme assignment and progress edits
//!
//! Every mutating operation loads the student from the store, applies the
//! change to its programme tree and saves it back.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::TreeFetcher;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::validate::{validate_name, validate_student_id};
use crate::domain::{delete_course, find_node_mut, DeleteOutcome, Grade, Student};
use crate::infrastructure::traits::StudentStore;

pub struct StudentService {
    store: Arc<dyn StudentStore>,
    fetcher: Arc<TreeFetcher>,
}

impl StudentService {
    pub fn new(store: Arc<dyn StudentStore>, fetcher: Arc<TreeFetcher>) -> Self {
        Self { store, fetcher }
    }

    /// All stored students, ordered by id.
    pub fn list(&self) -> ApplicationResult<Vec<Student>> {
        let mut students = self.store.list()?;
        students.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(students)
    }

    /// Register a new student without a programme.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&self, student_id: &str, first_name: &str, last_name: &str) -> ApplicationResult<Student> {
        validate_student_id(student_id)?;
        validate_name(first_name)?;
        validate_name(last_name)?;
        if self.store.exists(student_id) {
            return Err(ApplicationError::StudentExists(student_id.to_string()));
        }

        let student = Student::new(student_id, first_name.trim(), last_name.trim());
        self.store.save(&student)?;
        Ok(student)
    }

    pub fn show(&self, student_id: &str) -> ApplicationResult<Student> {
        self.load(student_id)
    }

    /// Rename an existing student.
    #[instrument(level = "debug", skip(self))]
    pub fn edit(&self, student_id: &str, first_name: &str, last_name: &str) -> ApplicationResult<Student> {
        validate_name(first_name)?;
        validate_name(last_name)?;
        let mut student = self.load(student_id)?;

        student.first_name = first_name.trim().to_string();
        student.last_name = last_name.trim().to_string();
        self.store.save(&student)?;
        Ok(student)
    }

    pub fn delete(&self, student_id: &str) -> ApplicationResult<()> {
        debug!("delete: student_id={}", student_id);
        validate_student_id(student_id)?;
        if !self.store.delete(student_id)? {
            return Err(ApplicationError::StudentNotFound(student_id.to_string()));
        }
        Ok(())
    }

    /// Fetch the programme tree and attach it, replacing any previous one.
    #[instrument(level = "debug", skip(self))]
    pub fn assign_programme(&self, student_id: &str, programme_id: &str) -> ApplicationResult<Student> {
        let mut student = self.load(student_id)?;
        let tree = self.fetcher.try_fetch_tree(programme_id)?;
        debug!("assign_programme: nodes={}", tree.node_count());
        student.set_programme(tree);
        self.store.save(&student)?;
        Ok(student)
    }

    /// Set or clear the grade of a course in one module of the programme.
    #[instrument(level = "debug", skip(self))]
    pub fn set_grade(
        &self,
        student_id: &str,
        module_id: &str,
        course_id: &str,
        grade: Option<Grade>,
    ) -> ApplicationResult<Student> {
        let mut student = self.load_with_module(student_id, module_id)?;
        if !student.set_grade(module_id, course_id, grade) {
            return Err(course_not_in_module(course_id, module_id));
        }
        self.store.save(&student)?;
        Ok(student)
    }

    /// Mark a course chosen in a module.
    ///
    /// A course the module does not list yet is fetched from the catalog and
    /// added first.
    #[instrument(level = "debug", skip(self))]
    pub fn choose_course(&self, student_id: &str, module_id: &str, course_id: &str) -> ApplicationResult<Student> {
        let mut student = self.load_with_module(student_id, module_id)?;
        let listed = student
            .module(module_id)
            .is_some_and(|module| module.course(course_id).is_some());

        if listed {
            let mut chosen: BTreeSet<String> = student
                .module(module_id)
                .map(|module| module.chosen_courses().clone())
                .unwrap_or_default();
            chosen.insert(course_id.to_string());
            student.set_module_chosen_courses(module_id, chosen);
        } else {
            let course = self.fetcher.fetch_course(course_id)?;
            student.add_course(module_id, course);
        }
        self.store.save(&student)?;
        Ok(student)
    }

    /// Un-choose a course. Returns `false` when it was not chosen.
    pub fn unchoose_course(&self, student_id: &str, module_id: &str, course_id: &str) -> ApplicationResult<bool> {
        debug!(
            "unchoose_course: student_id={}, module_id={}, course_id={}",
            student_id, module_id, course_id
        );
        let mut student = self.load_with_module(student_id, module_id)?;
        let removed = student.remove_course(module_id, course_id);
        if removed {
            self.store.save(&student)?;
        }
        Ok(removed)
    }

    /// Delete a course from the programme, below `scope_id` or everywhere.
    ///
    /// Mandatory courses are protected within the scope. A course that is
    /// mandatory only outside the scope may still be removed from it.
    #[instrument(level = "debug", skip(self))]
    pub fn drop_course(
        &self,
        student_id: &str,
        course_id: &str,
        scope_id: Option<&str>,
    ) -> ApplicationResult<DeleteOutcome> {
        let mut student = self.load(student_id)?;
        let programme = student
            .programme_mut()
            .ok_or_else(|| ApplicationError::NoProgramme(student_id.to_string()))?;
        let scope = match scope_id {
            Some(id) => find_node_mut(programme, id).ok_or_else(|| ApplicationError::ModuleNotFound {
                student: student_id.to_string(),
                module: id.to_string(),
            })?,
            None => programme,
        };

        let outcome = delete_course(scope, course_id, &mut BTreeSet::new());
        self.store.save(&student)?;
        Ok(outcome)
    }

    pub fn completed_credits(&self, student_id: &str) -> ApplicationResult<u32> {
        Ok(self.load(student_id)?.total_completed_credits())
    }

    fn load(&self, student_id: &str) -> ApplicationResult<Student> {
        validate_student_id(student_id)?;
        self.store
            .load(student_id)?
            .ok_or_else(|| ApplicationError::StudentNotFound(student_id.to_string()))
    }

    fn load_with_module(&self, student_id: &str, module_id: &str) -> ApplicationResult<Student> {
        let student = self.load(student_id)?;
        if student.programme().is_none() {
            return Err(ApplicationError::NoProgramme(student_id.to_string()));
        }
        if student.module(module_id).is_none() {
            return Err(ApplicationError::ModuleNotFound {
                student: student_id.to_string(),
                module: module_id.to_string(),
            });
        }
        Ok(student)
    }
}

fn course_not_in_module(course_id: &str, module_id: &str) -> ApplicationError {
    ApplicationError::NotFound {
        kind: "course",
        id: format!("{course_id} in module {module_id}"),
    }
}
