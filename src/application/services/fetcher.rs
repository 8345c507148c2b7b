//! Programme tree fetcher
//!
//! Walks the module hierarchy starting from a root group id: each module
//! record is parsed into a node with pending child-module ids and course
//! stubs, then child modules are fetched recursively while the course stubs
//! are replaced with full course records. Both fan-outs run on rayon and are
//! joined before the single-threaded attach step.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, instrument, warn};

use crate::application::parser::RuleTreeParser;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{CourseRecord, Node};
use crate::infrastructure::traits::{CatalogClient, RecordType};

/// Builds node trees from the catalog.
///
/// Branches share nothing but the catalog client. A child that cannot be
/// fetched or parsed is dropped from the tree and logged; there are no
/// retries.
pub struct TreeFetcher {
    catalog: Arc<dyn CatalogClient>,
    parser: RuleTreeParser,
    pool: Option<Arc<ThreadPool>>,
}

impl TreeFetcher {
    /// Fetcher running on the global rayon pool.
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self {
            catalog,
            parser: RuleTreeParser::new(),
            pool: None,
        }
    }

    /// Fetcher running on a dedicated pool of `threads` workers.
    ///
    /// `threads == 0` uses the global pool.
    pub fn with_threads(catalog: Arc<dyn CatalogClient>, threads: usize) -> ApplicationResult<Self> {
        let mut fetcher = Self::new(catalog);
        if threads > 0 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("fetch-{i}"))
                .build()
                .map_err(|e| ApplicationError::OperationFailed {
                    context: format!("build fetch pool with {threads} threads"),
                    source: Box::new(e),
                })?;
            fetcher.pool = Some(Arc::new(pool));
        }
        Ok(fetcher)
    }

    /// Fetch and parse a single module record, children left pending.
    pub fn fetch_node(&self, group_id: &str) -> ApplicationResult<Node> {
        let kind = RecordType::Module;
        let raw = self.fetch_raw(kind, group_id)?;
        self.parser
            .parse_node(&raw)
            .map_err(|source| ApplicationError::Malformed {
                kind: kind.label(),
                id: group_id.to_string(),
                source,
            })
    }

    /// Fetch and parse a single course record.
    pub fn fetch_course(&self, group_id: &str) -> ApplicationResult<CourseRecord> {
        let kind = RecordType::Course;
        let raw = self.fetch_raw(kind, group_id)?;
        self.parser
            .parse_course(&raw)
            .map_err(|source| ApplicationError::Malformed {
                kind: kind.label(),
                id: group_id.to_string(),
                source,
            })
    }

    fn fetch_raw(&self, kind: RecordType, group_id: &str) -> ApplicationResult<String> {
        self.catalog
            .get_record(kind, group_id)
            .map_err(|source| ApplicationError::Transport {
                context: format!("{} {}", kind.label(), group_id),
                source,
            })?
            .ok_or_else(|| ApplicationError::NotFound {
                kind: kind.label(),
                id: group_id.to_string(),
            })
    }

    /// Fetch the complete tree below `root_id`.
    ///
    /// Returns `None` only when the root itself cannot be fetched or parsed.
    /// Child modules keep the order of their rules in the parent record.
    pub fn fetch_tree(&self, root_id: &str) -> Option<Node> {
        self.try_fetch_tree(root_id)
            .inspect_err(|e| warn!("fetch_tree: root {} unavailable: {}", root_id, e))
            .ok()
    }

    /// Like [`fetch_tree`](Self::fetch_tree), but reports why the root failed.
    #[instrument(level = "debug", skip(self))]
    pub fn try_fetch_tree(&self, root_id: &str) -> ApplicationResult<Node> {
        let build = || -> ApplicationResult<Node> {
            let root = self.fetch_node(root_id)?;
            Ok(self.expand(root))
        };
        let tree = match &self.pool {
            Some(pool) => pool.install(build),
            None => build(),
        }?;
        debug!("fetch_tree: root={}, nodes={}", root_id, tree.node_count());
        Ok(tree)
    }

    fn fetch_subtree(&self, group_id: &str) -> Option<Node> {
        self.fetch_node_logged(group_id).map(|node| self.expand(node))
    }

    /// Recursively fetch the pending children of an already parsed node.
    fn expand(&self, mut node: Node) -> Node {
        let module_ids = node.take_child_module_ids();
        let course_ids = node.course_ids();

        let (children, courses): (Vec<Node>, Vec<CourseRecord>) = rayon::join(
            || {
                module_ids
                    .par_iter()
                    .filter_map(|id| self.fetch_subtree(id))
                    .collect()
            },
            || {
                course_ids
                    .par_iter()
                    .filter_map(|id| self.fetch_course_logged(id))
                    .collect()
            },
        );

        node.add_child_modules(children);
        node.update_child_courses(courses);
        node
    }

    /// Populate the immediate children of `node` without descending further.
    ///
    /// Pending child-module ids are fetched and attached as nodes that keep
    /// their own pending ids; course stubs are replaced with full records.
    #[instrument(level = "debug", skip_all, fields(group_id = %node.group_id))]
    pub fn fetch_one_level(&self, node: &mut Node) {
        let module_ids = node.take_child_module_ids();
        let course_ids = node.course_ids();

        let work = || {
            rayon::join(
                || {
                    module_ids
                        .par_iter()
                        .filter_map(|id| self.fetch_node_logged(id))
                        .collect::<Vec<_>>()
                },
                || {
                    course_ids
                        .par_iter()
                        .filter_map(|id| self.fetch_course_logged(id))
                        .collect::<Vec<_>>()
                },
            )
        };
        let (children, courses) = match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        };

        debug!(
            "fetch_one_level: modules={}/{}, courses={}/{}",
            children.len(),
            module_ids.len(),
            courses.len(),
            course_ids.len()
        );
        node.add_child_modules(children);
        node.update_child_courses(courses);
    }

    fn fetch_node_logged(&self, group_id: &str) -> Option<Node> {
        self.fetch_node(group_id)
            .inspect_err(|e| warn!("dropping module {}: {}", group_id, e))
            .ok()
    }

    fn fetch_course_logged(&self, group_id: &str) -> Option<CourseRecord> {
        self.fetch_course(group_id)
            .inspect_err(|e| warn!("keeping stub for course {}: {}", group_id, e))
            .ok()
    }
}
