//! Kori catalog client over blocking HTTP

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use tracing::{debug, instrument};

use crate::config::CatalogConfig;
use crate::infrastructure::traits::{CatalogClient, RecordType, TransportError};

const PROGRAMME_LIST_LIMIT: &str = "1000";
const SEARCH_LIMIT: &str = "10000";
const SEARCH_UI_LANGUAGE: &str = "fi";
const SEARCH_VALIDITY: &str = "ONGOING_AND_FUTURE";

/// HTTP client for the Kori curriculum API.
///
/// A group id the catalog does not know yields `Ok(None)`: Kori answers
/// `by-group-id` lookups with an empty array, and unknown paths with 404.
#[derive(Debug, Clone)]
pub struct KoriClient {
    client: Client,
    config: CatalogConfig,
}

impl KoriClient {
    pub fn new(config: CatalogConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TransportError::with_source("failed to build HTTP client", e))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, TransportError> {
        let base = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        Url::parse_with_params(&base, params)
            .map_err(|e| TransportError::with_source(format!("invalid catalog URL: {base}"), e))
    }

    /// `{base}/{modules|course-units}/by-group-id?groupId=..&universityId=..`
    pub fn record_url(&self, kind: RecordType, group_id: &str) -> Result<Url, TransportError> {
        self.endpoint(
            &format!("{}/by-group-id", kind.api_segment()),
            &[
                ("groupId", group_id),
                ("universityId", self.config.university_id.as_str()),
            ],
        )
    }

    pub fn programme_list_url(&self) -> Result<Url, TransportError> {
        self.endpoint(
            "module-search",
            &[
                ("curriculumPeriodId", self.config.curriculum_period.as_str()),
                ("universityId", self.config.university_id.as_str()),
                ("moduleType", "DegreeProgramme"),
                ("limit", PROGRAMME_LIST_LIMIT),
            ],
        )
    }

    pub fn search_url(&self, keyword: &str) -> Result<Url, TransportError> {
        self.endpoint(
            "course-unit-search",
            &[
                ("fullTextQuery", keyword),
                ("limit", SEARCH_LIMIT),
                ("orgRootId", self.config.university_id.as_str()),
                ("start", "0"),
                ("uiLang", SEARCH_UI_LANGUAGE),
                ("universityOrgId", self.config.university_id.as_str()),
                ("validity", SEARCH_VALIDITY),
            ],
        )
    }

    #[instrument(level = "debug", skip_all, fields(url = %url))]
    fn get(&self, url: Url) -> Result<Option<String>, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| TransportError::with_source(format!("GET {url}"), e))?;

        let status = response.status();
        debug!("get: status={}", status);
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(TransportError::new(format!("GET {url}: HTTP {status}")));
        }

        let body = response
            .text()
            .map_err(|e| TransportError::with_source(format!("read body of {url}"), e))?;
        if is_empty_listing(&body) {
            return Ok(None);
        }
        Ok(Some(body))
    }
}

/// Kori returns `[]` for group ids it does not know.
fn is_empty_listing(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.is_empty()
        || trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .is_some_and(|inner| inner.trim().is_empty())
}

impl CatalogClient for KoriClient {
    fn get_record(
        &self,
        kind: RecordType,
        group_id: &str,
    ) -> Result<Option<String>, TransportError> {
        debug!("get_record: kind={:?}, group_id={}", kind, group_id);
        self.get(self.record_url(kind, group_id)?)
    }

    fn get_degree_programme_list(&self) -> Result<Option<String>, TransportError> {
        self.get(self.programme_list_url()?)
    }

    fn search_courses(&self, keyword: &str) -> Result<Option<String>, TransportError> {
        debug!("search_courses: keyword={}", keyword);
        self.get(self.search_url(keyword)?)
    }
}
