//! Curriculum nodes: degree programmes, study modules and grouping modules.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::course::CourseRecord;

/// Uniform representation of any module-like catalog entity.
///
/// A node exclusively owns its child nodes and courses. There is no parent
/// pointer: parent lookups re-traverse the tree from the root.
///
/// The mandatory and chosen sets only ever contain ids present in the local
/// course mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    pub group_id: String,
    pub name: Option<String>,
    pub code: Option<String>,
    /// Minimum credits required to complete the module
    pub target_credits: u32,
    pub description: Option<String>,
    pub outcomes: Option<String>,
    pub prerequisites: Option<String>,
    children: Vec<Node>,
    /// Child modules referenced by the rule tree but not fetched yet
    #[serde(skip)]
    child_module_ids: Vec<String>,
    courses: BTreeMap<String, CourseRecord>,
    mandatory: BTreeSet<String>,
    chosen: BTreeSet<String>,
}

impl Node {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            ..Default::default()
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    pub fn add_child_module(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn add_child_modules(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.children.extend(nodes);
    }

    pub fn child_module_ids(&self) -> &[String] {
        &self.child_module_ids
    }

    pub fn add_child_module_id(&mut self, group_id: impl Into<String>) {
        self.child_module_ids.push(group_id.into());
    }

    /// Drain the pending child-module references, leaving none behind.
    pub fn take_child_module_ids(&mut self) -> Vec<String> {
        std::mem::take(&mut self.child_module_ids)
    }

    pub fn courses(&self) -> &BTreeMap<String, CourseRecord> {
        &self.courses
    }

    pub fn course_ids(&self) -> Vec<String> {
        self.courses.keys().cloned().collect()
    }

    pub fn course(&self, group_id: &str) -> Option<&CourseRecord> {
        self.courses.get(group_id)
    }

    pub fn course_mut(&mut self, group_id: &str) -> Option<&mut CourseRecord> {
        self.courses.get_mut(group_id)
    }

    /// Insert a course, replacing any course with the same group id.
    pub fn add_child_course(&mut self, course: CourseRecord) {
        self.courses.insert(course.group_id.clone(), course);
    }

    /// Overwrite an existing course in place.
    ///
    /// Returns `false` without inserting when the group id is not present,
    /// e.g. because the course was removed while its record was being fetched.
    pub fn update_child_course(&mut self, course: CourseRecord) -> bool {
        match self.courses.get_mut(&course.group_id) {
            Some(slot) => {
                *slot = course;
                true
            }
            None => false,
        }
    }

    pub fn update_child_courses(&mut self, courses: impl IntoIterator<Item = CourseRecord>) {
        for course in courses {
            self.update_child_course(course);
        }
    }

    /// Remove a course from the local mapping along with its mandatory and
    /// chosen marks. Removing an absent id is a no-op.
    pub fn remove_course(&mut self, group_id: &str) -> Option<CourseRecord> {
        self.mandatory.remove(group_id);
        self.chosen.remove(group_id);
        self.courses.remove(group_id)
    }

    pub fn mandatory_courses(&self) -> &BTreeSet<String> {
        &self.mandatory
    }

    /// Mark a local course mandatory. No-op for ids not in the course mapping.
    pub fn add_mandatory_course(&mut self, group_id: &str) -> bool {
        if !self.courses.contains_key(group_id) {
            return false;
        }
        self.mandatory.insert(group_id.to_string())
    }

    pub fn remove_mandatory_course(&mut self, group_id: &str) -> bool {
        self.mandatory.remove(group_id)
    }

    pub fn chosen_courses(&self) -> &BTreeSet<String> {
        &self.chosen
    }

    /// Mark a local course chosen. No-op for ids not in the course mapping.
    pub fn add_chosen_course(&mut self, group_id: &str) -> bool {
        if !self.courses.contains_key(group_id) {
            return false;
        }
        self.chosen.insert(group_id.to_string())
    }

    pub fn remove_chosen_course(&mut self, group_id: &str) -> bool {
        self.chosen.remove(group_id)
    }

    /// Replace the chosen set; ids without a local course are dropped.
    pub fn set_chosen_courses<I, S>(&mut self, group_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chosen = group_ids
            .into_iter()
            .map(Into::into)
            .filter(|id| self.courses.contains_key(id))
            .collect();
    }

    /// Number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Node::depth).max().unwrap_or(0)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.name) {
            (Some(code), Some(name)) => write!(f, "{code} {name} ({}op)", self.target_credits),
            (None, Some(name)) => write!(f, "{name} ({}op)", self.target_credits),
            _ => write!(f, "{}", self.group_id),
        }
    }
}
