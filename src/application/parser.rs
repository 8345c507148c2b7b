//! Kori catalog record parser.
//!
//! Turns raw JSON records into [`Node`]s and [`CourseRecord`]s. Module records
//! carry a nested rule tree describing their child modules and courses; the
//! parser decodes it into pending child-module ids, course stubs and mandatory
//! marks. Nothing is fetched here.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use crate::application::error::ParseError;
use crate::domain::{CourseRecord, Node};

/// Grade scale id of courses graded 0-5.
pub const NUMERIC_GRADE_SCALE: &str = "sis-0-5";

/// Language preference for descriptive fields, most preferred first.
pub const LANGUAGE_PREFERENCE: [&str; 2] = ["fi", "en"];

pub type ParseResult<T> = Result<T, ParseError>;

/// Module-like record kinds, dispatched on the record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    StudyModule,
    GroupingModule,
    DegreeProgramme,
}

impl FromStr for RecordKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "StudyModule" => Ok(RecordKind::StudyModule),
            "GroupingModule" => Ok(RecordKind::GroupingModule),
            "DegreeProgramme" => Ok(RecordKind::DegreeProgramme),
            other => Err(ParseError::UnknownRecordType(other.to_string())),
        }
    }
}

// ============================================================
// Raw record shapes
// ============================================================

/// Text that is either plain or keyed by language code.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Text {
    Plain(String),
    Localized(BTreeMap<String, Option<String>>),
}

impl Text {
    fn resolve(&self) -> Option<String> {
        match self {
            Text::Plain(s) => Some(s.clone()),
            Text::Localized(map) => resolve_language(map),
        }
    }
}

fn resolve_text(field: &Option<Text>) -> Option<String> {
    field.as_ref().and_then(Text::resolve)
}

/// Pick the "fi" text, else "en", else nothing.
pub fn resolve_language(texts: &BTreeMap<String, Option<String>>) -> Option<String> {
    LANGUAGE_PREFERENCE
        .iter()
        .find_map(|lang| texts.get(*lang).cloned().flatten())
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct CreditRange {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

fn to_credits(value: Option<f64>) -> Option<u32> {
    // saturating: negative values become 0
    value.map(|v| v as u32)
}

impl CreditRange {
    /// Module targets use the lower bound only.
    fn module_target(&self) -> u32 {
        to_credits(self.min).unwrap_or(0)
    }

    /// Full course records prefer the upper bound.
    fn course_target(&self) -> u32 {
        to_credits(self.max).or(to_credits(self.min)).unwrap_or(0)
    }

    /// Search results fall back to the lower bound when the upper is 0 or absent.
    fn search_result_target(&self) -> u32 {
        match to_credits(self.max) {
            Some(max) if max != 0 => max,
            _ => to_credits(self.min).unwrap_or(0),
        }
    }
}

/// Kori sends explicit nulls for some rule fields; read them as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One node of a record's rule tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum Rule {
    /// Credit-range wrapper without structural content.
    CreditsRule {
        #[serde(default)]
        rule: Option<Box<Rule>>,
    },
    CompositeRule {
        #[serde(rename = "allMandatory", default, deserialize_with = "null_as_default")]
        all_mandatory: bool,
        #[serde(default, deserialize_with = "null_as_default")]
        rules: Vec<Rule>,
    },
    ModuleRule {
        #[serde(rename = "moduleGroupId")]
        module_group_id: String,
    },
    CourseUnitRule {
        #[serde(rename = "courseUnitGroupId")]
        course_unit_group_id: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudyModuleRecord {
    group_id: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    name: Option<Text>,
    #[serde(default)]
    content_description: Option<Text>,
    #[serde(default)]
    learning_outcomes: Option<Text>,
    #[serde(default)]
    prerequisites: Option<Text>,
    #[serde(default)]
    target_credits: Option<CreditRange>,
    #[serde(default)]
    rule: Option<Rule>,
}

/// Degree programmes share the study module layout.
type DegreeProgrammeRecord = StudyModuleRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupingModuleRecord {
    group_id: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    name: Option<Text>,
    #[serde(default)]
    rule: Option<Rule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseUnitRecord {
    group_id: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    name: Option<Text>,
    #[serde(default)]
    credits: Option<CreditRange>,
    #[serde(default)]
    grade_scale_id: Option<String>,
    #[serde(default)]
    content: Option<Text>,
    #[serde(default)]
    content_description: Option<Text>,
    #[serde(default)]
    outcomes: Option<Text>,
    #[serde(default)]
    learning_outcomes: Option<Text>,
    #[serde(default)]
    prerequisites: Option<Text>,
}

/// Flat entry of a course search or programme listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchEntry {
    group_id: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    name: Option<Text>,
    #[serde(default)]
    credits: Option<CreditRange>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    search_results: Vec<Value>,
}

// ============================================================
// Parser
// ============================================================

/// Stateless parser for Kori catalog records.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleTreeParser;

impl RuleTreeParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a module-like record into a node with pending children.
    ///
    /// The node carries identity and descriptive fields, the child-module ids
    /// from the rule tree (in rule order), one stub per course rule and the
    /// mandatory marks. Child modules are not fetched.
    #[instrument(level = "trace", skip_all)]
    pub fn parse_node(&self, raw: &str) -> ParseResult<Node> {
        let root = record_root(raw)?;
        let kind: RecordKind = root
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ParseError::MissingField("type".into()))?
            .parse()?;

        let (mut node, rule) = match kind {
            RecordKind::StudyModule => parse_study_module(root)?,
            RecordKind::GroupingModule => parse_grouping_module(root)?,
            RecordKind::DegreeProgramme => parse_degree_programme(root)?,
        };
        debug!("parse_node: {:?} {}", kind, node.group_id);

        if let Some(rule) = rule {
            collect_rule_tree(&mut node, rule);
        }
        Ok(node)
    }

    /// Parse a full course-unit record.
    #[instrument(level = "trace", skip_all)]
    pub fn parse_course(&self, raw: &str) -> ParseResult<CourseRecord> {
        let record: CourseUnitRecord = serde_json::from_value(record_root(raw)?)?;
        let graded = record.grade_scale_id.as_deref() == Some(NUMERIC_GRADE_SCALE);

        Ok(CourseRecord {
            name: resolve_text(&record.name),
            code: record.code,
            credits: record.credits.unwrap_or_default().course_target(),
            graded,
            grade: None,
            description: resolve_text(&record.content)
                .or_else(|| resolve_text(&record.content_description)),
            outcomes: resolve_text(&record.outcomes)
                .or_else(|| resolve_text(&record.learning_outcomes)),
            prerequisites: resolve_text(&record.prerequisites),
            group_id: record.group_id,
        })
    }

    /// Parse a single course search entry (flat layout, no rule tree).
    pub fn parse_course_search_result(&self, raw: &str) -> ParseResult<CourseRecord> {
        course_from_search_entry(record_root(raw)?)
    }

    /// Parse a course search response.
    ///
    /// Entries that fail to parse are skipped.
    #[instrument(level = "trace", skip_all)]
    pub fn parse_course_search_results(&self, raw: &str) -> ParseResult<Vec<CourseRecord>> {
        let response: SearchResponse = serde_json::from_value(record_root(raw)?)?;
        Ok(response
            .search_results
            .into_iter()
            .filter_map(|entry| match course_from_search_entry(entry) {
                Ok(course) => Some(course),
                Err(e) => {
                    warn!("parse_course_search_results: skipping entry: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Parse the degree programme listing into identity-only nodes.
    ///
    /// Unlike single search entries, one broken programme fails the listing.
    #[instrument(level = "trace", skip_all)]
    pub fn parse_programme_list(&self, raw: &str) -> ParseResult<Vec<Node>> {
        let response: SearchResponse = serde_json::from_value(record_root(raw)?)?;
        response
            .search_results
            .into_iter()
            .map(|entry| {
                let entry: SearchEntry = serde_json::from_value(entry)?;
                let mut node = Node::new(entry.group_id);
                node.name = resolve_text(&entry.name);
                node.code = entry.code;
                node.target_credits = entry.credits.unwrap_or_default().module_target();
                Ok(node)
            })
            .collect()
    }
}

/// Decode raw text and unwrap a top-level array to its first element.
fn record_root(raw: &str) -> ParseResult<Value> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items.into_iter().next().ok_or(ParseError::Empty),
        Value::Null => Err(ParseError::Empty),
        other => Ok(other),
    }
}

fn course_from_search_entry(value: Value) -> ParseResult<CourseRecord> {
    let entry: SearchEntry = serde_json::from_value(value)?;
    Ok(CourseRecord {
        name: resolve_text(&entry.name),
        code: entry.code,
        credits: entry.credits.unwrap_or_default().search_result_target(),
        ..CourseRecord::stub(entry.group_id)
    })
}

fn parse_study_module(root: Value) -> ParseResult<(Node, Option<Rule>)> {
    let record: StudyModuleRecord = serde_json::from_value(root)?;
    Ok(module_node(record))
}

fn parse_degree_programme(root: Value) -> ParseResult<(Node, Option<Rule>)> {
    let record: DegreeProgrammeRecord = serde_json::from_value(root)?;
    Ok(module_node(record))
}

fn module_node(record: StudyModuleRecord) -> (Node, Option<Rule>) {
    let mut node = Node::new(record.group_id);
    node.name = resolve_text(&record.name);
    node.code = record.code;
    node.description = resolve_text(&record.content_description);
    node.outcomes = resolve_text(&record.learning_outcomes);
    node.prerequisites = resolve_text(&record.prerequisites);
    node.target_credits = record.target_credits.unwrap_or_default().module_target();
    (node, record.rule)
}

fn parse_grouping_module(root: Value) -> ParseResult<(Node, Option<Rule>)> {
    let record: GroupingModuleRecord = serde_json::from_value(root)?;
    let mut node = Node::new(record.group_id);
    node.name = resolve_text(&record.name);
    node.code = record.code;
    Ok((node, record.rule))
}

/// Decode the rule tree rooted at a record's top-level rule.
///
/// A leading CreditsRule is unwrapped once. Anything but a CompositeRule at
/// that point means the record has no structured children.
fn collect_rule_tree(node: &mut Node, rule: Rule) {
    let rule = match rule {
        Rule::CreditsRule { rule: Some(inner) } => *inner,
        other => other,
    };
    match rule {
        Rule::CompositeRule {
            all_mandatory,
            rules,
        } => collect_rules(node, &rules, all_mandatory),
        other => trace!("collect_rule_tree: no composite rule in {}: {:?}", node.group_id, other),
    }
}

/// Walk sibling rules in order. A nested CompositeRule applies its own
/// `all_mandatory` flag to its subtree only.
fn collect_rules(node: &mut Node, rules: &[Rule], all_mandatory: bool) {
    for rule in rules {
        match rule {
            Rule::CompositeRule {
                all_mandatory: inner,
                rules,
            } => collect_rules(node, rules, *inner),
            Rule::ModuleRule { module_group_id } => {
                node.add_child_module_id(module_group_id.clone());
            }
            Rule::CourseUnitRule {
                course_unit_group_id,
            } => {
                node.add_child_course(CourseRecord::stub(course_unit_group_id.clone()));
                if all_mandatory {
                    node.add_mandatory_course(course_unit_group_id);
                }
            }
            Rule::CreditsRule { .. } | Rule::Other => {
                trace!("collect_rules: ignoring rule in {}: {:?}", node.group_id, rule);
            }
        }
    }
}
