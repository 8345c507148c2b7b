//! Student progress record: a programme tree plus grade and course choices.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::algorithms::{find_node, find_node_mut, total_completed_credits};
use crate::domain::course::{CourseRecord, Grade};
use crate::domain::node::Node;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub programme_group_id: Option<String>,
    pub programme_name: Option<String>,
    programme: Option<Node>,
}

impl Student {
    pub fn new(
        student_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    pub fn programme(&self) -> Option<&Node> {
        self.programme.as_ref()
    }

    pub fn programme_mut(&mut self) -> Option<&mut Node> {
        self.programme.as_mut()
    }

    /// Attach a programme tree, replacing any previous one.
    pub fn set_programme(&mut self, programme: Node) {
        self.programme_group_id = Some(programme.group_id.clone());
        self.programme_name = programme.name.clone();
        self.programme = Some(programme);
    }

    /// Set the grade of a course within a given module.
    ///
    /// The module is found first and the course looked up in its own mapping
    /// only. Returns `false` when either is missing.
    pub fn set_grade(&mut self, module_id: &str, course_id: &str, grade: Option<Grade>) -> bool {
        let Some(module) = self.module_mut(module_id) else {
            return false;
        };
        match module.course_mut(course_id) {
            Some(course) => {
                course.set_grade(grade);
                true
            }
            None => false,
        }
    }

    pub fn set_module_chosen_courses<I, S>(&mut self, module_id: &str, course_ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.module_mut(module_id) {
            Some(module) => {
                module.set_chosen_courses(course_ids);
                true
            }
            None => false,
        }
    }

    /// Add a course to a module and mark it chosen.
    pub fn add_course(&mut self, module_id: &str, course: CourseRecord) -> bool {
        let Some(module) = self.module_mut(module_id) else {
            return false;
        };
        // chosen marks require the course to be present first
        let id = course.group_id.clone();
        module.add_child_course(course);
        module.add_chosen_course(&id);
        true
    }

    /// Un-choose a course. The course itself stays in the module.
    pub fn remove_course(&mut self, module_id: &str, course_id: &str) -> bool {
        let Some(module) = self.module_mut(module_id) else {
            return false;
        };
        if module.course(course_id).is_none() {
            return false;
        }
        module.remove_chosen_course(course_id)
    }

    pub fn total_completed_credits(&self) -> u32 {
        self.programme.as_ref().map(total_completed_credits).unwrap_or(0)
    }

    pub fn module(&self, module_id: &str) -> Option<&Node> {
        self.programme.as_ref().and_then(|p| find_node(p, module_id))
    }

    fn module_mut(&mut self, module_id: &str) -> Option<&mut Node> {
        self.programme.as_mut().and_then(|p| find_node_mut(p, module_id))
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.first_name, self.last_name, self.student_id)?;
        if let Some(name) = &self.programme_name {
            write!(f, ": {name}")?;
        }
        Ok(())
    }
}
