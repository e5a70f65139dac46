use crate::splice::LAST_UPDATED_MARKER;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";
const EMAIL_VAR: &str = "JIRA_EMAIL";
const TOKEN_VAR: &str = "JIRA_API_TOKEN";
const DEFAULT_MAX_RESULTS: u32 = 100;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub products: Vec<ProductSpec>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct JiraConfig {
    #[serde(default)]
    pub base_url: String,
    /// 0 or absent means the default page size.
    #[serde(default)]
    pub max_results: u32,
    /// Turn `project = "Name"` clauses into `project = KEY` before sending.
    #[serde(default)]
    pub rewrite_project_names: bool,
}

impl JiraConfig {
    pub fn max_results(&self) -> u32 {
        if self.max_results == 0 {
            DEFAULT_MAX_RESULTS
        } else {
            self.max_results
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default)]
    pub stamp_last_updated: bool,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_timezone_label")]
    pub timezone_label: String,
}

fn default_template() -> PathBuf {
    PathBuf::from("site/index.html")
}

fn default_timezone_label() -> String {
    "UTC".to_string()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            stamp_last_updated: false,
            utc_offset_minutes: 0,
            timezone_label: default_timezone_label(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderProfile {
    /// Six columns: key, version, issue type, status, date, action link.
    #[default]
    Generic,
    /// Four columns: version, fixed release type, status, looked-up date.
    Specialized,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default)]
    pub profile: RenderProfile,
    #[serde(default)]
    pub release_type_label: String,
    #[serde(default = "default_date_placeholder")]
    pub date_placeholder: String,
    /// Version string -> display date, used by the specialized profile.
    #[serde(default)]
    pub release_dates: HashMap<String, String>,
}

fn default_date_placeholder() -> String {
    "TBD".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            profile: RenderProfile::Generic,
            release_type_label: String::new(),
            date_placeholder: default_date_placeholder(),
            release_dates: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProductSpec {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tbody_marker: String,
    #[serde(default)]
    pub jql: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.jira.base_url.trim().is_empty() {
            anyhow::bail!("jira.base_url is missing or empty");
        }
        if self.products.is_empty() {
            anyhow::bail!("no products configured ([[products]] must not be empty)");
        }
        for (i, p) in self.products.iter().enumerate() {
            let label = if p.key.trim().is_empty() {
                format!("products[{}]", i)
            } else {
                format!("products[{}] ({})", i, p.key)
            };
            for (field, value) in [
                ("key", &p.key),
                ("name", &p.name),
                ("tbody_marker", &p.tbody_marker),
                ("jql", &p.jql),
            ] {
                if value.trim().is_empty() {
                    anyhow::bail!("{}: `{}` is missing or empty", label, field);
                }
            }
            if p.tbody_marker == LAST_UPDATED_MARKER {
                anyhow::bail!(
                    "{}: tbody_marker `{}` is reserved for the timestamp",
                    label,
                    LAST_UPDATED_MARKER
                );
            }
        }
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for p in &self.products {
            if let Some(first) = seen.insert(p.tbody_marker.as_str(), p.key.as_str()) {
                anyhow::bail!(
                    "products {} and {} share tbody_marker `{}`",
                    first,
                    p.key,
                    p.tbody_marker
                );
            }
        }
        if self.render.profile == RenderProfile::Specialized
            && self.render.release_type_label.trim().is_empty()
        {
            anyhow::bail!("render.release_type_label is required for the specialized profile");
        }
        Ok(())
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for (key, value) in parse_env_lines(content) {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}

fn parse_env_lines(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"').trim_matches('\'')))
        .collect()
}

/// Operator credentials for the search API.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub api_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            email: required_env(EMAIL_VAR)?,
            api_token: required_env(TOKEN_VAR)?,
        })
    }
}

fn required_env(name: &str) -> Result<String> {
    let value = std::env::var(name).map(|v| sanitize_key(&v)).unwrap_or_default();
    if value.is_empty() {
        anyhow::bail!("required environment variable {} is not set", name);
    }
    Ok(value)
}

/// Strip carriage returns, BOM, and other invisible chars from a secret value.
fn sanitize_key(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
