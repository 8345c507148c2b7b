//! Course records: the leaves of a curriculum tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Grade of a course.
///
/// Graded courses use the numeric 0-5 scale, ungraded ones pass/fail.
/// Persisted as the plain strings `"0"`..`"5"`, `"pass"` and `"fail"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Grade {
    Numeric(u8),
    Pass,
    Fail,
}

impl Grade {
    /// Whether the course counts towards completed credits.
    pub fn is_passing(&self) -> bool {
        !matches!(self, Grade::Fail)
    }
}

impl FromStr for Grade {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "pass" => Ok(Grade::Pass),
            "fail" => Ok(Grade::Fail),
            other => match other.parse::<u8>() {
                Ok(n) if n <= 5 => Ok(Grade::Numeric(n)),
                _ => Err(DomainError::InvalidGrade(s.to_string())),
            },
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Numeric(n) => write!(f, "{n}"),
            Grade::Pass => write!(f, "pass"),
            Grade::Fail => write!(f, "fail"),
        }
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.to_string()
    }
}

impl TryFrom<String> for Grade {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single course, keyed by its group id within a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseRecord {
    pub group_id: String,
    pub name: Option<String>,
    pub code: Option<String>,
    /// Credits awarded on completion
    pub credits: u32,
    /// `true` for the 0-5 scale, `false` for pass/fail
    pub graded: bool,
    pub grade: Option<Grade>,
    pub description: Option<String>,
    pub outcomes: Option<String>,
    pub prerequisites: Option<String>,
}

impl CourseRecord {
    /// Unresolved course known only by its group id.
    pub fn stub(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            ..Default::default()
        }
    }

    /// True until the full catalog record has been filled in.
    pub fn is_stub(&self) -> bool {
        self.name.is_none() && self.code.is_none()
    }

    pub fn set_grade(&mut self, grade: Option<Grade>) {
        self.grade = grade;
    }

    /// Credits this course contributes to the completed total.
    pub fn completed_credits(&self) -> u32 {
        match self.grade {
            Some(grade) if grade.is_passing() => self.credits,
            _ => 0,
        }
    }
}

impl fmt::Display for CourseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}op",
            self.code.as_deref().unwrap_or(&self.group_id),
            self.name.as_deref().unwrap_or("?"),
            self.credits
        )
    }
}
