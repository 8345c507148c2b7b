//! Tests for tree algorithms: lookups, protected deletion and credit totals

use std::collections::BTreeSet;

use rstest::{fixture, rstest};

use degreetree::domain::{
    all_mandatory_courses, delete_course, find_course, find_course_in_tree,
    find_course_in_tree_mut, find_course_parent, find_node, find_node_mut, iter_courses,
    total_completed_credits, CourseRecord, DeleteOutcome, Grade, Node,
};

fn course(group_id: &str, name: &str, credits: u32) -> CourseRecord {
    CourseRecord {
        name: Some(name.to_string()),
        credits,
        ..CourseRecord::stub(group_id)
    }
}

/// ```text
/// root            courses: cu-intro (mandatory)
/// ├── otm-a       courses: cu-shared (mandatory), cu-a
/// │   └── otm-a1  courses: cu-deep
/// └── otm-b       courses: cu-shared, cu-b
/// ```
#[fixture]
fn tree() -> Node {
    let mut a1 = Node::new("otm-a1");
    a1.add_child_course(course("cu-deep", "Syventävä", 5));

    let mut a = Node::new("otm-a");
    a.add_child_course(course("cu-shared", "Yhteinen (A)", 5));
    a.add_child_course(course("cu-a", "A-kurssi", 5));
    a.add_mandatory_course("cu-shared");
    a.add_child_module(a1);

    let mut b = Node::new("otm-b");
    b.add_child_course(course("cu-shared", "Yhteinen (B)", 5));
    b.add_child_course(course("cu-b", "B-kurssi", 3));

    let mut root = Node::new("otm-root");
    root.add_child_course(course("cu-intro", "Johdanto", 1));
    root.add_mandatory_course("cu-intro");
    root.add_child_modules([a, b]);
    root
}

// ============================================================
// Lookups
// ============================================================

#[rstest]
fn given_tree_when_find_node_then_returns_pre_order_match(tree: Node) {
    assert_eq!(find_node(&tree, "otm-root").map(|n| n.group_id.as_str()), Some("otm-root"));
    assert_eq!(find_node(&tree, "otm-a1").map(|n| n.group_id.as_str()), Some("otm-a1"));
    assert!(find_node(&tree, "otm-unknown").is_none());
}

#[rstest]
fn given_course_in_child_when_find_course_then_searches_local_mapping_only(tree: Node) {
    assert!(find_course(&tree, "cu-intro").is_some());
    assert!(find_course(&tree, "cu-a").is_none());
}

#[rstest]
fn given_course_in_two_subtrees_when_find_course_in_tree_then_returns_first_pre_order(tree: Node) {
    let found = find_course_in_tree(&tree, "cu-shared").unwrap();

    assert_eq!(found.name.as_deref(), Some("Yhteinen (A)"));
    assert_eq!(find_course_in_tree(&tree, "cu-deep").map(|c| c.credits), Some(5));
    assert!(find_course_in_tree(&tree, "cu-unknown").is_none());
}

#[rstest]
fn given_course_when_find_course_parent_then_returns_owner_id(tree: Node) {
    assert_eq!(find_course_parent(&tree, "cu-b"), Some("otm-b"));
    assert_eq!(find_course_parent(&tree, "cu-shared"), Some("otm-a"));
    assert_eq!(find_course_parent(&tree, "cu-unknown"), None);
}

#[rstest]
fn given_tree_when_mutating_through_find_mut_then_changes_are_visible(mut tree: Node) {
    find_course_in_tree_mut(&mut tree, "cu-deep")
        .unwrap()
        .set_grade(Some(Grade::Numeric(4)));
    find_node_mut(&mut tree, "otm-b").unwrap().add_chosen_course("cu-b");

    assert_eq!(
        find_course_in_tree(&tree, "cu-deep").unwrap().grade,
        Some(Grade::Numeric(4))
    );
    assert!(find_node(&tree, "otm-b").unwrap().chosen_courses().contains("cu-b"));
}

#[rstest]
fn given_tree_when_iter_courses_then_pairs_courses_with_owner_in_pre_order(tree: Node) {
    let owners: Vec<_> = iter_courses(&tree).into_iter().map(|(owner, _)| owner).collect();

    assert_eq!(
        owners,
        ["otm-root", "otm-a", "otm-a", "otm-a1", "otm-b", "otm-b"]
    );
}

#[rstest]
fn given_tree_when_all_mandatory_courses_then_unions_subtree(tree: Node) {
    let expected: BTreeSet<String> = ["cu-intro", "cu-shared"].map(String::from).into();

    assert_eq!(all_mandatory_courses(&tree), expected);
    assert!(all_mandatory_courses(&tree.children()[1]).is_empty());
}

// ============================================================
// delete_course()
// ============================================================

#[rstest]
fn given_globally_mandatory_course_when_delete_at_root_then_refuses_everywhere(mut tree: Node) {
    // Act
    let outcome = delete_course(&mut tree, "cu-shared", &mut BTreeSet::new());

    // Assert
    assert_eq!(outcome, DeleteOutcome::Refused);
    assert!(find_node(&tree, "otm-a").unwrap().course("cu-shared").is_some());
    assert!(find_node(&tree, "otm-b").unwrap().course("cu-shared").is_some());
}

#[rstest]
fn given_course_mandatory_only_in_sibling_when_delete_at_subnode_then_removes_it(mut tree: Node) {
    // Deletion protects only what the starting node's subtree marks mandatory
    let b = find_node_mut(&mut tree, "otm-b").unwrap();

    let outcome = delete_course(b, "cu-shared", &mut BTreeSet::new());

    assert_eq!(outcome, DeleteOutcome::Completed);
    assert!(find_node(&tree, "otm-b").unwrap().course("cu-shared").is_none());
    assert!(find_node(&tree, "otm-a").unwrap().course("cu-shared").is_some());
}

#[rstest]
fn given_course_mandatory_in_own_node_when_delete_at_subnode_then_refuses(mut tree: Node) {
    // Arrange
    let a = find_node_mut(&mut tree, "otm-a").unwrap();

    // Act
    let outcome = delete_course(a, "cu-shared", &mut BTreeSet::new());

    // Assert
    assert_eq!(outcome, DeleteOutcome::Refused);
    assert!(find_node(&tree, "otm-a").unwrap().course("cu-shared").is_some());
}

#[rstest]
fn given_course_mandatory_in_grandchild_when_delete_at_subnode_then_refuses(mut tree: Node) {
    // Arrange
    let a1 = find_node_mut(&mut tree, "otm-a1").unwrap();
    a1.add_child_course(course("cu-a", "A-kurssi", 5));
    a1.add_mandatory_course("cu-a");
    let a = find_node_mut(&mut tree, "otm-a").unwrap();

    // Act
    let outcome = delete_course(a, "cu-a", &mut BTreeSet::new());

    // Assert
    assert_eq!(outcome, DeleteOutcome::Refused);
    assert!(find_node(&tree, "otm-a").unwrap().course("cu-a").is_some());
    assert!(find_node(&tree, "otm-a1").unwrap().course("cu-a").is_some());
}

#[rstest]
fn given_seeded_mandatory_set_when_delete_at_subnode_then_refuses(mut tree: Node) {
    let mut seed = all_mandatory_courses(&tree);
    let b = find_node_mut(&mut tree, "otm-b").unwrap();

    let outcome = delete_course(b, "cu-shared", &mut seed);

    assert_eq!(outcome, DeleteOutcome::Refused);
    assert!(find_node(&tree, "otm-b").unwrap().course("cu-shared").is_some());
}

#[rstest]
#[case::in_child("cu-b", "otm-b")]
#[case::in_grandchild("cu-deep", "otm-a1")]
fn given_optional_course_when_delete_at_root_then_removes_it(
    mut tree: Node,
    #[case] course_id: &str,
    #[case] owner: &str,
) {
    let outcome = delete_course(&mut tree, course_id, &mut BTreeSet::new());

    assert_eq!(outcome, DeleteOutcome::Completed);
    assert!(find_node(&tree, owner).unwrap().course(course_id).is_none());
    assert!(find_course_in_tree(&tree, course_id).is_none());
}

#[rstest]
fn given_unknown_course_when_delete_then_completes_without_changes(mut tree: Node) {
    let before = tree.clone();

    let outcome = delete_course(&mut tree, "cu-unknown", &mut BTreeSet::new());

    assert_eq!(outcome, DeleteOutcome::Completed);
    assert_eq!(tree, before);
}

#[rstest]
fn given_chosen_course_when_deleted_then_chosen_mark_is_dropped(mut tree: Node) {
    find_node_mut(&mut tree, "otm-b").unwrap().add_chosen_course("cu-b");

    delete_course(&mut tree, "cu-b", &mut BTreeSet::new());

    assert!(find_node(&tree, "otm-b").unwrap().chosen_courses().is_empty());
}

// ============================================================
// total_completed_credits()
// ============================================================

#[test]
fn given_failed_passed_and_ungraded_courses_when_totalling_then_counts_passed_only() {
    // Arrange
    let mut failed = course("cu-fail", "Hylätty", 5);
    failed.set_grade(Some(Grade::Fail));
    let mut passed = course("cu-three", "Kolmonen", 5);
    passed.set_grade(Some("3".parse().unwrap()));
    let ungraded = course("cu-none", "Kesken", 10);

    let mut child = Node::new("otm-child");
    child.add_child_course(passed);
    let mut root = Node::new("otm-root");
    root.add_child_course(failed);
    root.add_child_course(ungraded);
    root.add_child_module(child);

    // Act / Assert
    assert_eq!(total_completed_credits(&root), 5);
}

#[test]
fn given_pass_grade_on_unchosen_course_when_totalling_then_counts_it() {
    let mut pass = course("cu-pass", "Hyväksytty", 2);
    pass.set_grade(Some(Grade::Pass));
    let mut root = Node::new("otm-root");
    root.add_child_course(pass);

    assert_eq!(total_completed_credits(&root), 2);
}
