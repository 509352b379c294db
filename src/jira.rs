//! Jira search API access.
//!
//! One blocking `GET /rest/api/2/search` per query. No authentication and no
//! pagination: the server is asked for up to `maxResults` issues in a single
//! page.

use thiserror::Error;
use tracing::{debug, info};

use crate::models::SearchResponse;

/// Path of the search endpoint relative to the Jira base URL.
const SEARCH_PATH: &str = "/rest/api/2/search";

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("epicgrid/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while querying Jira.
#[derive(Debug, Error)]
pub enum JiraError {
    /// Server answered with a non-success status
    #[error("Jira search failed: HTTP {code}: {body}")]
    HttpStatus { code: u16, body: String },

    /// Network, DNS or TLS failure
    #[error("Jira request failed: {0}")]
    Transport(String),

    /// Response body was not the expected JSON shape
    #[error("Failed to parse Jira response: {0}")]
    Parse(String),
}

/// Blocking client for a single Jira instance.
#[derive(Debug, Clone)]
pub struct JiraClient {
    base_url: String,
    agent: ureq::Agent,
}

impl JiraClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().user_agent(USER_AGENT).build();
        Self { base_url, agent }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the search endpoint.
    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_PATH)
    }

    /// Run a JQL search and return the first `max_results` issues.
    pub fn search(&self, jql: &str, max_results: u32) -> Result<SearchResponse, JiraError> {
        let url = self.search_url();
        debug!(%url, jql, max_results, "querying jira");

        let response = self
            .agent
            .get(&url)
            .query("maxResults", &max_results.to_string())
            .query("jql", jql)
            .set("Accept", "application/json")
            .call();

        match response {
            Ok(resp) => {
                let result: SearchResponse = resp
                    .into_json()
                    .map_err(|e| JiraError::Parse(e.to_string()))?;
                info!(
                    jql,
                    issues = result.issues.len(),
                    total = ?result.total,
                    "jira search complete"
                );
                Ok(result)
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(JiraError::HttpStatus { code, body })
            }
            Err(e) => Err(JiraError::Transport(e.to_string())),
        }
    }
}
