//! Tests for StudentService and JsonStudentStore

mod common;

use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use common::{composite, course_record, course_rule, module_record, module_rule, study_module, MockCatalog};
use degreetree::application::services::{StudentService, TreeFetcher};
use degreetree::application::ApplicationError;
use degreetree::domain::{DeleteOutcome, DomainError, Grade, Student};
use degreetree::infrastructure::traits::{RealFileSystem, StudentStore};
use degreetree::infrastructure::JsonStudentStore;
use degreetree::util::testing;

struct Fixture {
    _temp: TempDir,
    store: Arc<JsonStudentStore>,
    service: StudentService,
}

/// Programme `otm-dp` with a mandatory intro course and one optional module.
fn catalog() -> MockCatalog {
    MockCatalog::new()
        .with_module(
            "otm-dp",
            module_record(
                "DegreeProgramme",
                "otm-dp",
                "Kandidaattiohjelma",
                composite(true, vec![course_rule("cu-intro"), module_rule("otm-opt")]),
            ),
        )
        .with_module(
            "otm-opt",
            study_module("otm-opt", composite(false, vec![course_rule("cu-opt")])),
        )
        .with_course("cu-intro", course_record("cu-intro", "INTRO", "Johdanto", 5, true))
        .with_course("cu-opt", course_record("cu-opt", "OPT", "Valinnainen", 3, false))
        .with_course("cu-extra", course_record("cu-extra", "EXTRA", "Lisäkurssi", 2, true))
}

fn setup() -> Fixture {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    let store = Arc::new(JsonStudentStore::new(
        Arc::new(RealFileSystem),
        temp.path().join("students"),
    ));
    let fetcher = Arc::new(TreeFetcher::new(Arc::new(catalog())));
    let service = StudentService::new(store.clone(), fetcher);
    Fixture {
        _temp: temp,
        store,
        service,
    }
}

fn setup_with_programme() -> Fixture {
    let fx = setup();
    fx.service.add("abc123", "Maija", "Meikäläinen").unwrap();
    fx.service.assign_programme("abc123", "otm-dp").unwrap();
    fx
}

// ============================================================
// JsonStudentStore
// ============================================================

#[test]
fn given_saved_student_when_load_then_reads_back_same_record() {
    // Arrange
    let fx = setup();
    let student = Student::new("abc123", "Maija", "Meikäläinen");

    // Act
    fx.store.save(&student).unwrap();
    let loaded = fx.store.load("abc123").unwrap();

    // Assert
    assert_eq!(loaded, Some(student));
    assert!(fx.store.path_for("abc123").ends_with("students/student_abc123.json"));
    assert!(fx.store.path_for("abc123").exists());
}

#[test]
fn given_unknown_id_when_load_or_delete_then_reports_absence() {
    let fx = setup();

    assert_eq!(fx.store.load("nobody").unwrap(), None);
    assert!(!fx.store.delete("nobody").unwrap());
    assert!(!fx.store.exists("nobody"));
}

#[test]
fn given_corrupt_and_foreign_files_when_list_then_skips_them() {
    let fx = setup();
    fx.store.save(&Student::new("bbb222", "Matti", "Virtanen")).unwrap();
    fx.store.save(&Student::new("aaa111", "Liisa", "Korhonen")).unwrap();
    std::fs::write(fx.store.dir().join("student_broken.json"), "{ not json").unwrap();
    std::fs::write(fx.store.dir().join("notes.json"), "{}").unwrap();

    let ids: Vec<_> = fx
        .store
        .list()
        .unwrap()
        .into_iter()
        .map(|s| s.student_id)
        .collect();

    assert_eq!(ids, ["aaa111", "bbb222"]);
}

#[test]
fn given_corrupt_file_when_load_then_returns_serialization_error() {
    let fx = setup();
    std::fs::create_dir_all(fx.store.dir()).unwrap();
    std::fs::write(fx.store.path_for("abc123"), "{ \"studentId\": ").unwrap();

    assert!(fx.store.load("abc123").is_err());
}

// ============================================================
// add / show / delete
// ============================================================

#[test]
fn given_valid_input_when_add_then_persists_student() {
    let fx = setup();

    let student = fx.service.add("abc123", " Maija ", "Meikäläinen").unwrap();

    assert_eq!(student.first_name, "Maija");
    assert_eq!(fx.service.show("abc123").unwrap(), student);
    assert_eq!(fx.service.list().unwrap().len(), 1);
}

#[rstest]
#[case::too_short("ab", "Maija")]
#[case::too_long("abcdefghijklmnopq", "Maija")]
#[case::not_alphanumeric("abc-123", "Maija")]
#[case::short_name("abc123", "M")]
fn given_invalid_input_when_add_then_rejects_without_saving(#[case] id: &str, #[case] first: &str) {
    let fx = setup();

    let err = fx.service.add(id, first, "Meikäläinen").unwrap_err();

    assert!(matches!(err, ApplicationError::Domain(_)));
    assert!(fx.service.list().unwrap().is_empty());
}

#[test]
fn given_existing_id_when_add_then_errors() {
    let fx = setup();
    fx.service.add("abc123", "Maija", "Meikäläinen").unwrap();

    let err = fx.service.add("abc123", "Matti", "Virtanen").unwrap_err();

    assert!(matches!(err, ApplicationError::StudentExists(id) if id == "abc123"));
}

#[test]
fn given_student_when_delete_then_show_fails() {
    let fx = setup();
    fx.service.add("abc123", "Maija", "Meikäläinen").unwrap();

    fx.service.delete("abc123").unwrap();

    assert!(matches!(
        fx.service.show("abc123"),
        Err(ApplicationError::StudentNotFound(_))
    ));
    assert!(matches!(
        fx.service.delete("abc123"),
        Err(ApplicationError::StudentNotFound(_))
    ));
}

#[test]
fn given_student_when_edit_then_persists_trimmed_names_and_keeps_programme() {
    // Arrange
    let fx = setup_with_programme();

    // Act
    let edited = fx.service.edit("abc123", " Liisa ", "Korhonen").unwrap();

    // Assert
    assert_eq!(edited.first_name, "Liisa");
    assert_eq!(edited.last_name, "Korhonen");
    let stored = fx.service.show("abc123").unwrap();
    assert_eq!(stored, edited);
    assert!(stored.programme().is_some());
}

#[test]
fn given_bad_input_when_edit_then_rejects_without_saving() {
    let fx = setup();
    fx.service.add("abc123", "Maija", "Meikäläinen").unwrap();

    assert!(matches!(
        fx.service.edit("zzz999", "Liisa", "Korhonen"),
        Err(ApplicationError::StudentNotFound(_))
    ));
    assert!(matches!(
        fx.service.edit("abc123", "L", "Korhonen"),
        Err(ApplicationError::Domain(DomainError::InvalidName(_)))
    ));
    assert_eq!(fx.service.show("abc123").unwrap().first_name, "Maija");
}

#[rstest]
#[case::path_traversal("../abc123")]
#[case::too_short("ab")]
fn given_invalid_id_when_show_or_delete_then_rejects_before_store(#[case] id: &str) {
    let fx = setup();

    assert!(matches!(
        fx.service.show(id),
        Err(ApplicationError::Domain(DomainError::InvalidStudentId { .. }))
    ));
    assert!(matches!(
        fx.service.delete(id),
        Err(ApplicationError::Domain(DomainError::InvalidStudentId { .. }))
    ));
}

// ============================================================
// Programme edits
// ============================================================

#[test]
fn given_student_when_assign_programme_then_stores_fetched_tree() {
    let fx = setup_with_programme();

    let student = fx.service.show("abc123").unwrap();

    assert_eq!(student.programme_name.as_deref(), Some("Kandidaattiohjelma"));
    let programme = student.programme().unwrap();
    assert_eq!(programme.node_count(), 2);
    assert_eq!(
        programme.course("cu-intro").and_then(|c| c.code.as_deref()),
        Some("INTRO")
    );
}

#[test]
fn given_unknown_programme_when_assign_then_reports_not_found() {
    let fx = setup();
    fx.service.add("abc123", "Maija", "Meikäläinen").unwrap();

    let err = fx.service.assign_programme("abc123", "otm-nowhere").unwrap_err();

    assert!(err.is_not_found());
    assert!(fx.service.show("abc123").unwrap().programme().is_none());
}

#[test]
fn given_grades_when_completed_credits_then_sums_passed_courses() {
    let fx = setup_with_programme();

    fx.service
        .set_grade("abc123", "otm-dp", "cu-intro", Some(Grade::Numeric(4)))
        .unwrap();
    fx.service
        .set_grade("abc123", "otm-opt", "cu-opt", Some(Grade::Fail))
        .unwrap();

    assert_eq!(fx.service.completed_credits("abc123").unwrap(), 5);
}

#[test]
fn given_course_outside_module_when_set_grade_then_errors() {
    let fx = setup_with_programme();

    let err = fx
        .service
        .set_grade("abc123", "otm-dp", "cu-opt", Some(Grade::Pass))
        .unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn given_no_programme_when_set_grade_then_reports_no_programme() {
    let fx = setup();
    fx.service.add("abc123", "Maija", "Meikäläinen").unwrap();

    let err = fx
        .service
        .set_grade("abc123", "otm-dp", "cu-intro", Some(Grade::Pass))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::NoProgramme(_)));
}

#[test]
fn given_listed_and_unlisted_courses_when_choose_then_marks_both_chosen() {
    let fx = setup_with_programme();

    fx.service.choose_course("abc123", "otm-opt", "cu-opt").unwrap();
    let student = fx.service.choose_course("abc123", "otm-opt", "cu-extra").unwrap();

    let module = student.module("otm-opt").unwrap();
    assert_eq!(
        module.chosen_courses().iter().collect::<Vec<_>>(),
        ["cu-extra", "cu-opt"]
    );
    assert_eq!(module.course("cu-extra").map(|c| c.credits), Some(2));
}

#[test]
fn given_chosen_course_when_unchoose_then_reports_whether_it_was_chosen() {
    let fx = setup_with_programme();
    fx.service.choose_course("abc123", "otm-opt", "cu-opt").unwrap();

    assert!(fx.service.unchoose_course("abc123", "otm-opt", "cu-opt").unwrap());
    assert!(!fx.service.unchoose_course("abc123", "otm-opt", "cu-opt").unwrap());
    assert!(matches!(
        fx.service.unchoose_course("abc123", "otm-nowhere", "cu-opt"),
        Err(ApplicationError::ModuleNotFound { .. })
    ));
}

#[test]
fn given_mandatory_and_optional_courses_when_drop_course_then_protects_mandatory() {
    let fx = setup_with_programme();

    let refused = fx.service.drop_course("abc123", "cu-intro", None).unwrap();
    let removed = fx.service.drop_course("abc123", "cu-opt", Some("otm-opt")).unwrap();

    assert_eq!(refused, DeleteOutcome::Refused);
    assert_eq!(removed, DeleteOutcome::Completed);
    let student = fx.service.show("abc123").unwrap();
    assert!(student.programme().unwrap().course("cu-intro").is_some());
    assert!(student.module("otm-opt").unwrap().course("cu-opt").is_none());
}
