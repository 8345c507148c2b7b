//! Input validation for caller-supplied identifiers and search keywords.
//!
//! Violations are rejected before any catalog request or store access.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::{DomainError, DomainResult};

pub const KEYWORD_MIN_LENGTH: usize = 3;
pub const STUDENT_ID_MIN_LENGTH: usize = 3;
pub const STUDENT_ID_MAX_LENGTH: usize = 16;
pub const STUDENT_NAME_MIN_LENGTH: usize = 2;

static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{3,}$").expect("keyword pattern compiles"));
static STUDENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]*$").expect("student id pattern compiles"));

/// Course search keywords: at least three ASCII letters or digits, nothing else.
pub fn validate_keyword(keyword: &str) -> DomainResult<()> {
    if keyword.len() < KEYWORD_MIN_LENGTH || !KEYWORD_RE.is_match(keyword) {
        return Err(DomainError::InvalidKeyword(keyword.to_string()));
    }
    Ok(())
}

pub fn validate_student_id(id: &str) -> DomainResult<()> {
    let invalid = |reason: &str| DomainError::InvalidStudentId {
        id: id.to_string(),
        reason: reason.to_string(),
    };
    if id.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if !(STUDENT_ID_MIN_LENGTH..=STUDENT_ID_MAX_LENGTH).contains(&id.len()) {
        return Err(invalid("must be between 3 and 16 characters"));
    }
    if !STUDENT_ID_RE.is_match(id) {
        return Err(invalid("only letters a-z, A-Z and digits 0-9 are allowed"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().chars().count() < STUDENT_NAME_MIN_LENGTH {
        return Err(DomainError::InvalidName(name.to_string()));
    }
    Ok(())
}
