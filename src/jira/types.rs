use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Jira sends `null` for empty fields as often as it omits them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of the `/rest/api/3/search/jql` `issues` list.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Issue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    #[serde(default)]
    pub issuetype: Option<IssueType>,
    #[serde(default)]
    pub status: Option<Status>,
    /// Some instances return the category as a top-level field.
    #[serde(default)]
    pub status_category: Option<StatusCategory>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fix_versions: Vec<FixVersion>,
    #[serde(default)]
    pub duedate: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueType {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status_category: Option<StatusCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusCategory {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixVersion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Issue {
    /// Status category name, e.g. "Done", "In Progress", "To Do".
    pub fn status_category(&self) -> Option<&str> {
        self.fields
            .status
            .as_ref()
            .and_then(|s| s.status_category.as_ref())
            .or(self.fields.status_category.as_ref())
            .and_then(|c| c.name.as_deref())
    }

    pub fn issue_type(&self) -> Option<&str> {
        self.fields.issuetype.as_ref().and_then(|t| t.name.as_deref())
    }

    /// Display name of the first fix version, or its id when unnamed.
    pub fn first_fix_version(&self) -> Option<&str> {
        let v = self.fields.fix_versions.first()?;
        v.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(v.id.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// Parse a search response body. A missing or null `issues` list is empty.
/// Entries are decoded one by one; an undecodable entry is skipped so the
/// rest still render.
pub fn parse_search_body(body: &str) -> Result<Vec<Issue>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let entries = match value.get("issues") {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(list) => Vec::<serde_json::Value>::deserialize(list)?,
    };

    let mut issues = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        match Issue::deserialize(&entry) {
            Ok(issue) => issues.push(issue),
            Err(e) => {
                let key = entry.get("key").and_then(|k| k.as_str()).unwrap_or("?");
                warn!(index = i, key, error = %e, "skipping undecodable issue");
            }
        }
    }
    Ok(issues)
}
