use crate::config::{RenderConfig, RenderProfile};
use crate::jira::types::Issue;

pub const PLACEHOLDER: &str = "\u{2014}";
const NO_ISSUES: &str = "No matching issues.";

/// Display badge derived from a status category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    Released,
    Upcoming,
    Planned,
}

impl StatusBadge {
    pub fn from_category(category: Option<&str>) -> Self {
        match category {
            Some("Done") => StatusBadge::Released,
            Some("In Progress") => StatusBadge::Upcoming,
            _ => StatusBadge::Planned,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusBadge::Released => "Released",
            StatusBadge::Upcoming => "Upcoming",
            StatusBadge::Planned => "Planned",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            StatusBadge::Released => "released",
            StatusBadge::Upcoming => "upcoming",
            StatusBadge::Planned => "planned",
        }
    }

    pub fn to_html(self) -> String {
        format!(
            "<span class=\"status {}\">{}</span>",
            self.css_class(),
            self.label()
        )
    }
}

/// Escape `& < > "` for embedding in markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// One issue projected to display strings. Unescaped until `to_html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub key: Option<String>,
    pub version: String,
    pub release_type: String,
    pub badge: StatusBadge,
    pub release_date: String,
    /// Browse link; present only in the generic layout.
    pub link: Option<String>,
}

impl RenderedRow {
    pub fn to_html(&self, profile: RenderProfile) -> String {
        let mut cells: Vec<String> = Vec::with_capacity(6);
        if profile == RenderProfile::Generic {
            cells.push(escape_html(self.key.as_deref().unwrap_or(PLACEHOLDER)));
        }
        cells.push(escape_html(&self.version));
        cells.push(escape_html(&self.release_type));
        cells.push(self.badge.to_html());
        cells.push(escape_html(&self.release_date));
        if profile == RenderProfile::Generic {
            cells.push(match &self.link {
                Some(href) => format!("<a href=\"{}\">View</a>", escape_html(href)),
                None => PLACEHOLDER.to_string(),
            });
        }

        let mut out = String::from("<tr>");
        for cell in cells {
            out.push_str("<td>");
            out.push_str(&cell);
            out.push_str("</td>");
        }
        out.push_str("</tr>");
        out
    }
}

pub struct RowRenderer<'a> {
    config: &'a RenderConfig,
    base_url: &'a str,
}

impl<'a> RowRenderer<'a> {
    pub fn new(config: &'a RenderConfig, base_url: &'a str) -> Self {
        Self {
            config,
            base_url: base_url.trim_end_matches('/'),
        }
    }

    pub fn columns(&self) -> usize {
        match self.config.profile {
            RenderProfile::Generic => 6,
            RenderProfile::Specialized => 4,
        }
    }

    pub fn row(&self, issue: &Issue) -> RenderedRow {
        let version = issue.first_fix_version().unwrap_or(PLACEHOLDER).to_string();

        let (release_type, release_date, link) = match self.config.profile {
            RenderProfile::Generic => (
                issue.issue_type().unwrap_or(PLACEHOLDER).to_string(),
                self.generic_date(issue),
                issue
                    .key
                    .as_deref()
                    .map(|k| format!("{}/browse/{}", self.base_url, k)),
            ),
            RenderProfile::Specialized => (
                self.config.release_type_label.clone(),
                self.config
                    .release_dates
                    .get(&version)
                    .cloned()
                    .unwrap_or_else(|| self.config.date_placeholder.clone()),
                None,
            ),
        };

        RenderedRow {
            key: issue.key.clone(),
            version,
            release_type,
            badge: StatusBadge::from_category(issue.status_category()),
            release_date,
            link,
        }
    }

    /// Due date, else the day of the last update, else the placeholder.
    fn generic_date(&self, issue: &Issue) -> String {
        let fields = &issue.fields;
        if let Some(due) = fields.duedate.as_deref().filter(|d| !d.is_empty()) {
            return due.to_string();
        }
        if let Some(updated) = fields.updated.as_deref().filter(|d| !d.is_empty()) {
            return updated_day(updated);
        }
        self.config.date_placeholder.clone()
    }

    /// Render the full block of rows for one product.
    pub fn render(&self, issues: &[Issue]) -> String {
        if issues.is_empty() {
            return format!(
                "<tr><td colspan=\"{}\">{}</td></tr>",
                self.columns(),
                NO_ISSUES
            );
        }
        issues
            .iter()
            .map(|issue| self.row(issue).to_html(self.config.profile))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Jira timestamps look like `2026-02-01T10:00:00.000+0000`.
fn updated_day(updated: &str) -> String {
    chrono::DateTime::parse_from_str(updated, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(updated))
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_else(|_| updated.to_string())
}
