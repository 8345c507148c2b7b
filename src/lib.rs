//! degreetree: curriculum trees from the Kori study catalog.
//!
//! Degree programmes, study modules and grouping modules are fetched from the
//! catalog, their rule trees parsed into a uniform [`domain::Node`] tree, and
//! the tree used to track a student's chosen courses, grades and credits.
//!
//! Layers, innermost first:
//! - [`domain`]: nodes, courses, students and the tree algorithms
//! - [`application`]: record parser, tree fetcher and use-case services
//! - [`infrastructure`]: Kori HTTP client, JSON student store, DI container
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
