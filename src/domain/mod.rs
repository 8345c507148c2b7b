//! Domain layer: curriculum entities and tree algorithms
//!
//! This layer is independent of external concerns (no I/O, no HTTP, no config loading).

pub mod algorithms;
pub mod course;
pub mod error;
pub mod node;
pub mod student;
pub mod tree_display;
pub mod validate;

pub use algorithms::{
    all_mandatory_courses, delete_course, find_course, find_course_in_tree,
    find_course_in_tree_mut, find_course_mut, find_course_parent, find_node, find_node_mut,
    iter_courses, total_completed_credits, DeleteOutcome,
};
pub use course::{CourseRecord, Grade};
pub use error::{DomainError, DomainResult};
pub use node::Node;
pub use student::Student;
pub use tree_display::TreeNodeConvert;
