//! Catalog queries: programme listing, trees, single courses and search

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::error::ParseError;
use crate::application::parser::RuleTreeParser;
use crate::application::services::TreeFetcher;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::validate::validate_keyword;
use crate::domain::{CourseRecord, Node};
use crate::infrastructure::traits::{CatalogClient, TransportError};

/// How far below the root a tree is fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchDepth {
    /// Root plus its immediate child modules and courses
    One,
    #[default]
    Full,
}

/// Read-only catalog operations used by the CLI.
pub struct CatalogService {
    catalog: Arc<dyn CatalogClient>,
    fetcher: Arc<TreeFetcher>,
    parser: RuleTreeParser,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogClient>, fetcher: Arc<TreeFetcher>) -> Self {
        Self {
            catalog,
            fetcher,
            parser: RuleTreeParser::new(),
        }
    }

    /// All degree programmes of the configured curriculum period.
    #[instrument(level = "debug", skip(self))]
    pub fn list_programmes(&self) -> ApplicationResult<Vec<Node>> {
        let raw = self.catalog.get_degree_programme_list().map_err(|source| {
            transport("degree programme list", source)
        })?;
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        let programmes = self
            .parser
            .parse_programme_list(&raw)
            .map_err(|source| malformed("programme list", "-", source))?;
        debug!("list_programmes: count={}", programmes.len());
        Ok(programmes)
    }

    /// Programme (or any module) tree rooted at `group_id`.
    #[instrument(level = "debug", skip(self))]
    pub fn tree(&self, group_id: &str, depth: FetchDepth) -> ApplicationResult<Node> {
        match depth {
            FetchDepth::Full => self.fetcher.try_fetch_tree(group_id),
            FetchDepth::One => {
                let mut node = self.fetcher.fetch_node(group_id)?;
                self.fetcher.fetch_one_level(&mut node);
                Ok(node)
            }
        }
    }

    pub fn course(&self, group_id: &str) -> ApplicationResult<CourseRecord> {
        self.fetcher.fetch_course(group_id)
    }

    /// Full-text course search. The keyword is validated before any request.
    #[instrument(level = "debug", skip(self))]
    pub fn search_courses(&self, keyword: &str) -> ApplicationResult<Vec<CourseRecord>> {
        validate_keyword(keyword)?;
        let raw = self
            .catalog
            .search_courses(keyword)
            .map_err(|source| transport(&format!("search {keyword}"), source))?;
        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        let courses = self
            .parser
            .parse_course_search_results(&raw)
            .map_err(|source| malformed("search result", keyword, source))?;
        debug!("search_courses: keyword={}, hits={}", keyword, courses.len());
        Ok(courses)
    }
}

fn transport(context: &str, source: TransportError) -> ApplicationError {
    ApplicationError::Transport {
        context: context.to_string(),
        source,
    }
}

fn malformed(kind: &'static str, id: &str, source: ParseError) -> ApplicationError {
    ApplicationError::Malformed {
        kind,
        id: id.to_string(),
        source,
    }
}
