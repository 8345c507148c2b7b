//! Rendering of curriculum trees with termtree.

use termtree::Tree;

use crate::domain::node::Node;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Node {
    fn to_tree_string(&self) -> Tree<String> {
        let mut tree = Tree::new(self.to_string());

        for course in self.courses().values() {
            let marker = if self.mandatory_courses().contains(&course.group_id) {
                "*"
            } else if self.chosen_courses().contains(&course.group_id) {
                "+"
            } else {
                "-"
            };
            let grade = course
                .grade
                .map(|g| format!(" [{g}]"))
                .unwrap_or_default();
            tree.push(Tree::new(format!("{marker} {course}{grade}")));
        }

        // Recursively construct the child modules
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();
        let mut tree = tree.with_leaves(leaves);

        for id in self.child_module_ids() {
            tree.push(Tree::new(format!("... {id}")));
        }
        tree
    }
}
