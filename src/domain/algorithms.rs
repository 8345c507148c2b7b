//! Stateless operations over a materialized curriculum tree.
//!
//! All searches are pre-order depth-first: the current node is checked before
//! its children, and children are visited in stored order.

use std::collections::BTreeSet;

use tracing::{instrument, warn};

use crate::domain::course::CourseRecord;
use crate::domain::node::Node;

/// Result of a protected deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No visited node refused; the course is gone from every visited node.
    Completed,
    /// The course is mandatory within the visible subtree and was kept.
    Refused,
}

/// First node whose group id matches, or `None`.
pub fn find_node<'a>(tree: &'a Node, group_id: &str) -> Option<&'a Node> {
    if tree.group_id == group_id {
        return Some(tree);
    }
    tree.children()
        .iter()
        .find_map(|child| find_node(child, group_id))
}

pub fn find_node_mut<'a>(tree: &'a mut Node, group_id: &str) -> Option<&'a mut Node> {
    if tree.group_id == group_id {
        return Some(tree);
    }
    tree.children_mut()
        .iter_mut()
        .find_map(|child| find_node_mut(child, group_id))
}

/// Course from the node's own mapping only (single level).
pub fn find_course<'a>(node: &'a Node, group_id: &str) -> Option<&'a CourseRecord> {
    node.course(group_id)
}

pub fn find_course_mut<'a>(node: &'a mut Node, group_id: &str) -> Option<&'a mut CourseRecord> {
    node.course_mut(group_id)
}

/// Course anywhere in the tree; the local mapping wins over children.
pub fn find_course_in_tree<'a>(node: &'a Node, group_id: &str) -> Option<&'a CourseRecord> {
    if let Some(course) = node.course(group_id) {
        return Some(course);
    }
    node.children()
        .iter()
        .find_map(|child| find_course_in_tree(child, group_id))
}

pub fn find_course_in_tree_mut<'a>(
    node: &'a mut Node,
    group_id: &str,
) -> Option<&'a mut CourseRecord> {
    if node.courses().contains_key(group_id) {
        return node.course_mut(group_id);
    }
    node.children_mut()
        .iter_mut()
        .find_map(|child| find_course_in_tree_mut(child, group_id))
}

/// Group id of the first node owning the course.
pub fn find_course_parent<'a>(node: &'a Node, course_id: &str) -> Option<&'a str> {
    if node.courses().contains_key(course_id) {
        return Some(node.group_id.as_str());
    }
    node.children()
        .iter()
        .find_map(|child| find_course_parent(child, course_id))
}

/// Union of mandatory course ids over the whole subtree.
pub fn all_mandatory_courses(node: &Node) -> BTreeSet<String> {
    let mut set = node.mandatory_courses().clone();
    for child in node.children() {
        set.extend(all_mandatory_courses(child));
    }
    set
}

/// Remove a course from `node` and every descendant unless it is protected.
///
/// At each visited node `mandatory_so_far` grows by every mandatory id of that
/// node's whole subtree. If the target is then in the set, the node is left
/// untouched and not descended into.
///
/// Protection only covers what the call can see: started at the root, a course
/// mandatory anywhere is kept; started at an inner node, a course mandatory only
/// in a sibling subtree is removed. Callers wanting global protection must start
/// at the root or seed `mandatory_so_far` with `all_mandatory_courses(root)`.
#[instrument(level = "debug", skip(node, mandatory_so_far), fields(node = %node.group_id))]
pub fn delete_course(
    node: &mut Node,
    course_id: &str,
    mandatory_so_far: &mut BTreeSet<String>,
) -> DeleteOutcome {
    mandatory_so_far.extend(all_mandatory_courses(node));
    if mandatory_so_far.contains(course_id) {
        warn!(
            "delete_course: refusing to delete mandatory course {} in {}",
            course_id, node.group_id
        );
        return DeleteOutcome::Refused;
    }

    node.remove_course(course_id);

    let mut outcome = DeleteOutcome::Completed;
    for child in node.children_mut() {
        if delete_course(child, course_id, mandatory_so_far) == DeleteOutcome::Refused {
            outcome = DeleteOutcome::Refused;
        }
    }
    outcome
}

/// Credits of every course with a grade other than "fail", over the whole tree.
///
/// Chosen status is irrelevant: every graded course counts.
pub fn total_completed_credits(node: &Node) -> u32 {
    let local: u32 = node
        .courses()
        .values()
        .map(CourseRecord::completed_credits)
        .sum();
    local
        + node
            .children()
            .iter()
            .map(total_completed_credits)
            .sum::<u32>()
}

/// All courses in pre-order, paired with the owning node's group id.
pub fn iter_courses(node: &Node) -> Vec<(&str, &CourseRecord)> {
    let mut out: Vec<(&str, &CourseRecord)> = node
        .courses()
        .values()
        .map(|c| (node.group_id.as_str(), c))
        .collect();
    for child in node.children() {
        out.extend(iter_courses(child));
    }
    out
}
