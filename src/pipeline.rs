use crate::config::Config;
use crate::jira::IssueSearch;
use crate::render::RowRenderer;
use crate::splice;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Where a run is. Used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Fetching(usize),
    Rendering(usize),
    Splicing(usize),
    Stamping,
    Done,
    /// Terminal; any fetch, splice or stamp error lands here.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Loaded => write!(f, "loaded"),
            Stage::Fetching(i) => write!(f, "fetching product #{}", i),
            Stage::Rendering(i) => write!(f, "rendering product #{}", i),
            Stage::Splicing(i) => write!(f, "splicing product #{}", i),
            Stage::Stamping => write!(f, "stamping"),
            Stage::Done => write!(f, "done"),
            Stage::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Updated,
    Unchanged,
    /// Content changed but the run was told not to write.
    WouldUpdate,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Updated => write!(f, "updated"),
            RunOutcome::Unchanged => write!(f, "no changes"),
            RunOutcome::WouldUpdate => write!(f, "changes found (dry run, not written)"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub dry_run: bool,
    pub now: DateTime<Utc>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            now: Utc::now(),
        }
    }
}

/// Fold every configured product into `document`, in order, then stamp.
/// The first failure aborts the rest.
pub async fn refresh(
    config: &Config,
    source: &dyn IssueSearch,
    document: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    refresh_with_stage(config, source, document, now).await.1
}

/// Like `refresh`, also returning the terminal stage (`Done` or `Failed`).
pub async fn refresh_with_stage(
    config: &Config,
    source: &dyn IssueSearch,
    document: &str,
    now: DateTime<Utc>,
) -> (Stage, Result<String>) {
    let mut stage = Stage::Loaded;
    debug!(%stage, products = config.products.len());

    let result = fold(config, source, document, now, &mut stage).await;
    if result.is_err() {
        warn!(at = %stage, "run aborted");
        stage = Stage::Failed;
    }
    debug!(%stage);
    (stage, result)
}

async fn fold(
    config: &Config,
    source: &dyn IssueSearch,
    document: &str,
    now: DateTime<Utc>,
    stage: &mut Stage,
) -> Result<String> {
    let renderer = RowRenderer::new(&config.render, &config.jira.base_url);
    let mut doc = document.to_string();

    for (i, product) in config.products.iter().enumerate() {
        *stage = Stage::Fetching(i);
        let at = *stage;
        let issues = source
            .search(product)
            .await
            .with_context(|| format!("{} ({}) failed", at, product.key))?;
        info!(product = %product.key, name = %product.name, issues = issues.len(), "fetched");

        *stage = Stage::Rendering(i);
        let rows = renderer.render(&issues);
        debug!(stage = %stage, bytes = rows.len(), "rendered");

        *stage = Stage::Splicing(i);
        let at = *stage;
        doc = splice::splice(&doc, &product.tbody_marker, &rows)
            .with_context(|| format!("{} ({}) failed", at, product.key))?;
        debug!(stage = %at, marker = %product.tbody_marker, "spliced");
    }

    if config.page.stamp_last_updated {
        *stage = Stage::Stamping;
        let offset = FixedOffset::east_opt(config.page.utc_offset_minutes * 60)
            .with_context(|| {
                format!(
                    "page.utc_offset_minutes out of range: {}",
                    config.page.utc_offset_minutes
                )
            })?;
        let stamp = splice::format_timestamp(now, offset, &config.page.timezone_label);
        doc = splice::stamp_last_updated(&doc, &stamp);
        debug!(stage = %stage, %stamp);
    }

    *stage = Stage::Done;
    Ok(doc)
}

/// Read the template at `path`, refresh it, and write it back if it changed.
/// Nothing is written when any step fails.
pub async fn run(
    config: &Config,
    source: &dyn IssueSearch,
    path: &Path,
    options: RunOptions,
) -> Result<RunOutcome> {
    let original = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template: {}", path.display()))?;

    let updated = refresh(config, source, &original, options.now).await?;

    if updated == original {
        info!(path = %path.display(), "no changes");
        return Ok(RunOutcome::Unchanged);
    }
    if options.dry_run {
        info!(path = %path.display(), "dry run, leaving file untouched");
        return Ok(RunOutcome::WouldUpdate);
    }

    std::fs::write(path, &updated)
        .with_context(|| format!("Failed to write template: {}", path.display()))?;
    info!(path = %path.display(), bytes = updated.len(), "template updated");
    Ok(RunOutcome::Updated)
}
