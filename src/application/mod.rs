//! Application layer: catalog parsing, tree fetching and student use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod parser;
pub mod services;

pub use error::{ApplicationError, ApplicationResult, ParseError};
pub use parser::{RecordKind, RuleTreeParser};
