pub mod auth;
pub mod query;
pub mod rest;
pub mod types;

use crate::config::ProductSpec;
use anyhow::Result;
use async_trait::async_trait;
use types::Issue;

/// A source of issues for one product's query.
#[async_trait]
pub trait IssueSearch: Send + Sync {
    async fn search(&self, product: &ProductSpec) -> Result<Vec<Issue>>;
}
