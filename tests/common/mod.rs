//! Shared fixtures: an in-memory catalog and Kori-shaped record builders
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};

use degreetree::infrastructure::traits::{CatalogClient, RecordType, TransportError};

// ============================================================
// MockCatalog
// ============================================================

/// Catalog answering from in-memory records.
///
/// Unknown ids are NotFound; ids registered with `with_failure` fail as
/// transport errors. Every call is counted and logged.
#[derive(Default)]
pub struct MockCatalog {
    modules: HashMap<String, String>,
    courses: HashMap<String, String>,
    failing: HashSet<String>,
    programme_list: Option<String>,
    search_response: Option<String>,
    calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, group_id: &str, record: Value) -> Self {
        self.modules.insert(group_id.to_string(), record.to_string());
        self
    }

    pub fn with_raw_module(mut self, group_id: &str, raw: &str) -> Self {
        self.modules.insert(group_id.to_string(), raw.to_string());
        self
    }

    pub fn with_course(mut self, group_id: &str, record: Value) -> Self {
        self.courses.insert(group_id.to_string(), record.to_string());
        self
    }

    pub fn with_failure(mut self, group_id: &str) -> Self {
        self.failing.insert(group_id.to_string());
        self
    }

    pub fn with_programme_list(mut self, response: Value) -> Self {
        self.programme_list = Some(response.to_string());
        self
    }

    pub fn with_search_response(mut self, response: Value) -> Self {
        self.search_response = Some(response.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests made so far, e.g. `"module:otm-1"` or `"search:ohjelm"`.
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(entry);
    }
}

impl CatalogClient for MockCatalog {
    fn get_record(
        &self,
        kind: RecordType,
        group_id: &str,
    ) -> Result<Option<String>, TransportError> {
        self.record(format!("{}:{}", kind.label(), group_id));
        if self.failing.contains(group_id) {
            return Err(TransportError::new(format!("connection reset: {group_id}")));
        }
        let records = match kind {
            RecordType::Module => &self.modules,
            RecordType::Course => &self.courses,
        };
        Ok(records.get(group_id).cloned())
    }

    fn get_degree_programme_list(&self) -> Result<Option<String>, TransportError> {
        self.record("programmes".to_string());
        Ok(self.programme_list.clone())
    }

    fn search_courses(&self, keyword: &str) -> Result<Option<String>, TransportError> {
        self.record(format!("search:{keyword}"));
        Ok(self.search_response.clone())
    }
}

// ============================================================
// Record builders
// ============================================================

pub fn fi(text: &str) -> Value {
    json!({ "fi": text })
}

pub fn module_rule(group_id: &str) -> Value {
    json!({ "type": "ModuleRule", "moduleGroupId": group_id })
}

pub fn course_rule(group_id: &str) -> Value {
    json!({ "type": "CourseUnitRule", "courseUnitGroupId": group_id })
}

pub fn composite(all_mandatory: bool, rules: Vec<Value>) -> Value {
    json!({ "type": "CompositeRule", "allMandatory": all_mandatory, "rules": rules })
}

pub fn credits_rule(inner: Value) -> Value {
    json!({ "type": "CreditsRule", "credits": { "min": 20, "max": null }, "rule": inner })
}

/// Module-like record of the given type, wrapped in an array like Kori does.
pub fn module_record(kind: &str, group_id: &str, name: &str, rule: Value) -> Value {
    json!([{
        "type": kind,
        "groupId": group_id,
        "code": format!("CODE-{group_id}"),
        "name": fi(name),
        "targetCredits": { "min": 120, "max": 180 },
        "contentDescription": fi(&format!("{name} description")),
        "learningOutcomes": { "en": format!("{name} outcomes") },
        "rule": rule,
    }])
}

pub fn study_module(group_id: &str, rule: Value) -> Value {
    module_record("StudyModule", group_id, group_id, rule)
}

pub fn course_record(group_id: &str, code: &str, name: &str, credits: u32, graded: bool) -> Value {
    json!([{
        "groupId": group_id,
        "code": code,
        "name": fi(name),
        "credits": { "min": credits, "max": credits },
        "gradeScaleId": if graded { "sis-0-5" } else { "sis-hyl-hyv" },
        "content": fi(&format!("{name} content")),
        "outcomes": fi(&format!("{name} outcomes")),
    }])
}
