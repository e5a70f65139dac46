use super::auth::JiraAuth;
use super::query::rewrite_project_clause;
use super::types::{parse_search_body, Issue};
use super::IssueSearch;
use crate::config::{Credentials, JiraConfig, ProductSpec};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, warn};

const SEARCH_PATH: &str = "/rest/api/3/search/jql";

pub struct JiraRest {
    client: Client,
    auth: JiraAuth,
    base_url: String,
    max_results: u32,
    rewrite_project_names: bool,
}

impl JiraRest {
    pub fn new(config: &JiraConfig, credentials: &Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("release-board/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            auth: JiraAuth::new(&credentials.email, &credentials.api_token),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results(),
            rewrite_project_names: config.rewrite_project_names,
        })
    }

    /// The query actually sent for a product.
    pub fn effective_jql(&self, product: &ProductSpec) -> String {
        if self.rewrite_project_names {
            rewrite_project_clause(&product.jql, &product.key)
        } else {
            product.jql.clone()
        }
    }

    pub fn search_url(&self, jql: &str) -> String {
        format!(
            "{}{}?maxResults={}&jql={}",
            self.base_url,
            SEARCH_PATH,
            self.max_results,
            urlencoding::encode(jql),
        )
    }
}

#[async_trait]
impl IssueSearch for JiraRest {
    async fn search(&self, product: &ProductSpec) -> Result<Vec<Issue>> {
        let jql = self.effective_jql(product);
        let url = self.search_url(&jql);
        debug!(product = %product.key, %jql, "searching issues");

        let mut req = self.client.get(&url).header(ACCEPT, "application/json");
        for (k, v) in self.auth.headers() {
            req = req.header(k, v);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("search request for {} failed", product.key))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("search for {} failed ({}): {}", product.key, status, body);
        }

        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read search response for {}", product.key))?;
        match parse_search_body(&body) {
            Ok(issues) => Ok(issues),
            Err(e) => {
                warn!(product = %product.key, error = %e, "malformed search response, treating as empty");
                Ok(Vec::new())
            }
        }
    }
}
